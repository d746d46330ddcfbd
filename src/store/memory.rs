use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{ArtifactStore, NewPage, StoreError, StoredPage};

/// In-process store; insertion order doubles as creation order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: RwLock<IndexMap<Uuid, StoredPage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages including soft-deleted ones.
    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pages.read().await.is_empty()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn store(&self, page: NewPage) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let stored = StoredPage::from_new(id, page);
        debug!(%id, email = %stored.email, bytes = stored.html.len(), "Storing page");
        self.pages.write().await.insert(id, stored);
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<StoredPage>, StoreError> {
        let pages = self.pages.read().await;
        Ok(pages.get(&id).filter(|p| !p.is_deleted()).cloned())
    }

    async fn history(&self, email: &str) -> Result<Vec<StoredPage>, StoreError> {
        let pages = self.pages.read().await;
        Ok(pages
            .values()
            .rev()
            .filter(|p| p.email == email && !p.is_deleted())
            .cloned()
            .collect())
    }

    async fn record_view(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut pages = self.pages.write().await;
        match pages.get_mut(&id) {
            Some(page) if !page.is_deleted() => {
                page.view_count += 1;
                Ok(page.view_count)
            }
            _ => Err(StoreError::NotFound(id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut pages = self.pages.write().await;
        match pages.get_mut(&id) {
            Some(page) if !page.is_deleted() => {
                page.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
