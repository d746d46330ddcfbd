//! Page service: runs the pipeline, persists the outcome and serves stored
//! pages back by identifier.

use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::engine::Orchestrator;
use crate::error::ServiceError;
use crate::llm::Generator;
use crate::store::{ArtifactStore, NewPage, StoredPage};
use crate::types::GenerationRequest;
use crate::verifier::ResourceProbe;

/// What the caller gets back after a page was generated and stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReceipt {
    pub id: Uuid,
    pub live_path: String,
    pub attempts: u32,
    pub verified: bool,
}

pub fn live_path(id: Uuid) -> String {
    format!("/p/{}/", id)
}

pub struct PageService<G, P, S> {
    orchestrator: Orchestrator<G, P>,
    store: S,
}

impl<G, P, S> PageService<G, P, S>
where
    G: Generator,
    P: ResourceProbe,
    S: ArtifactStore,
{
    pub fn new(orchestrator: Orchestrator<G, P>, store: S) -> Self {
        Self { orchestrator, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(skip(self, request), fields(requester = %request.requester))]
    pub async fn generate_page(&self, request: &GenerationRequest) -> Result<PageReceipt, ServiceError> {
        let result = self.orchestrator.run(request).await?;
        let (attempts, verified) = (result.attempts, result.verified);

        let id = self
            .store
            .store(NewPage {
                email: request.requester.clone(),
                prompt: result.prompt,
                category: request.category.clone(),
                style: request.style.clone(),
                html: result.html,
                provenance: result.provenance,
                is_public: true,
            })
            .await?;

        info!(%id, attempts, verified, "Page stored");
        Ok(PageReceipt {
            id,
            live_path: live_path(id),
            attempts,
            verified,
        })
    }

    /// Public HTML of a live page; counts as a view.
    pub async fn live_page(&self, id: Uuid) -> Result<String, ServiceError> {
        let page = match self.store.fetch(id).await? {
            Some(page) if page.is_public => page,
            _ => return Err(ServiceError::NotFound(id)),
        };
        self.store.record_view(id).await?;
        Ok(page.html)
    }

    pub async fn history(&self, email: &str) -> Result<Vec<StoredPage>, ServiceError> {
        Ok(self.store.history(email).await?)
    }

    pub async fn delete_page(&self, id: Uuid) -> Result<(), ServiceError> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(id))
        }
    }
}
