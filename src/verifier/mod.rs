//! # Resource verifier
//!
//! Advisory reachability check of the external resources a sanitized page
//! references. Its result only steers the retry loop; nothing here fails.

pub mod extract;
pub mod probe;

pub use extract::external_references;
pub use probe::HttpProbe;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::{SanitizerConfig, VerifierConfig};
use crate::types::{SanitizedArtifact, VerificationResult};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifierError {
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

/// What a single existence probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Final status after redirects.
    Responded(u16),
    /// Transport failure, timeout or redirect loop.
    Failed(String),
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Responded(status) if *status < 400)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceProbe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

pub struct ResourceVerifier<P> {
    probe: P,
    concurrency: usize,
    max_depth: usize,
}

impl<P: ResourceProbe> ResourceVerifier<P> {
    pub fn new(probe: P, concurrency: usize) -> Self {
        Self {
            probe,
            concurrency: concurrency.max(1),
            max_depth: SanitizerConfig::default().max_depth,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Probes every external reference, at most `concurrency` at a time.
    /// The unreachable list keeps document order.
    #[instrument(skip_all)]
    pub async fn verify(&self, document: &SanitizedArtifact) -> VerificationResult {
        let references = external_references(document.as_str(), self.max_depth);
        debug!(count = references.len(), "Probing external references");

        let probe = &self.probe;
        let outcomes: Vec<(String, ProbeOutcome)> = stream::iter(references)
            .map(|url| async move {
                let outcome = probe.probe(&url).await;
                (url, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let unreachable = outcomes
            .into_iter()
            .filter(|(_, outcome)| !outcome.is_reachable())
            .inspect(|(url, outcome)| warn!(url = %url, ?outcome, "Resource unreachable"))
            .map(|(url, _)| url)
            .collect();

        VerificationResult { unreachable }
    }
}

impl ResourceVerifier<HttpProbe> {
    pub fn from_config(config: &VerifierConfig) -> Result<Self, VerifierError> {
        Ok(Self::new(HttpProbe::new(config)?, config.concurrency))
    }
}
