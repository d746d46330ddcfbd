//! Errors that cross the pipeline boundary.
//!
//! Provider and sanitizer trouble is recovered inside an attempt and never
//! shows up here; only rejected input and wiring problems do.

use thiserror::Error;
use uuid::Uuid;

use crate::llm::ProviderError;
use crate::prompt::CompileError;
use crate::store::StoreError;
use crate::verifier::VerifierError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Raised before any provider call; never retried.
    #[error("Input rejected: {0}")]
    InputRejected(#[from] CompileError),
}

/// Failure to assemble the pipeline from configuration.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Provider client: {0}")]
    Provider(#[from] ProviderError),
    #[error("Resource verifier: {0}")]
    Verifier(#[from] VerifierError),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Page not found: {0}")]
    NotFound(Uuid),
}
