//! Persistence boundary for finished pages.
//!
//! Only sanitized markup can be stored: [`NewPage`] takes a
//! [`SanitizedArtifact`], which nothing outside the sanitizer can build.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{CompiledPrompt, Provenance, SanitizedArtifact};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Page {0} does not exist")]
    NotFound(Uuid),
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// A page ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewPage {
    pub email: String,
    pub prompt: CompiledPrompt,
    pub category: String,
    pub style: String,
    pub html: SanitizedArtifact,
    pub provenance: Provenance,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPage {
    pub id: Uuid,
    pub email: String,
    pub prompt: String,
    pub category: String,
    pub style: String,
    pub html: String,
    pub is_public: bool,
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
    pub provenance: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl StoredPage {
    pub fn from_new(id: Uuid, page: NewPage) -> Self {
        Self {
            id,
            email: page.email,
            prompt: page.prompt.into_string(),
            category: page.category,
            style: page.style,
            html: page.html.into_string(),
            is_public: page.is_public,
            view_count: 0,
            created_at: Utc::now(),
            provenance: page.provenance,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn store(&self, page: NewPage) -> Result<Uuid, StoreError>;

    /// Soft-deleted pages are not returned.
    async fn fetch(&self, id: Uuid) -> Result<Option<StoredPage>, StoreError>;

    /// Live pages of one requester, newest first.
    async fn history(&self, email: &str) -> Result<Vec<StoredPage>, StoreError>;

    /// Returns the new view count.
    async fn record_view(&self, id: Uuid) -> Result<u64, StoreError>;

    /// Soft delete. Returns `false` when the page was already gone.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
