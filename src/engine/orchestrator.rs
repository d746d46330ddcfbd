//! High-level coordinator: request → compiled prompt → bounded
//! generate/sanitize/verify attempts → result with provenance.

use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::state::{PipelineEvent, PipelineState};
use crate::config::Config;
use crate::error::{BuildError, PipelineError};
use crate::llm::{Generation, Generator, ProviderClient, ProviderError};
use crate::prompt::PromptCompiler;
use crate::sanitizer::Sanitizer;
use crate::types::{
    CompiledPrompt, GenerationRequest, PipelineResult, Provenance, SanitizedArtifact,
    VerificationResult,
};
use crate::verifier::{HttpProbe, ResourceProbe, ResourceVerifier};

pub const PROVENANCE_VERSION: &str = "1.1";

/// Everything one Generate → Sanitize → Verify cycle produced.
#[derive(Debug)]
struct AttemptOutcome {
    html: SanitizedArtifact,
    fallback_used: bool,
    degraded: bool,
    verification: VerificationResult,
    verification_skipped: bool,
}

pub struct Orchestrator<G, P> {
    compiler: PromptCompiler,
    generator: G,
    sanitizer: Sanitizer,
    verifier: Option<ResourceVerifier<P>>,
    max_attempts: u32,
    attempt_timeout: Duration,
    provider: String,
    model: String,
}

impl<G: Generator, P: ResourceProbe> Orchestrator<G, P> {
    /// `verifier: None` skips verification; every attempt then passes.
    pub fn new(config: &Config, generator: G, verifier: Option<ResourceVerifier<P>>) -> Self {
        Self {
            compiler: PromptCompiler::from_config(&config.pipeline),
            generator,
            sanitizer: Sanitizer::from_config(&config.sanitizer),
            verifier,
            max_attempts: config.pipeline.max_attempts.max(1),
            attempt_timeout: config.pipeline.attempt_timeout(),
            provider: config.provider.name.clone(),
            model: config.provider.model.clone(),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs one request to a terminal state.
    ///
    /// The only error is rejected input, returned before the generator is
    /// called. Dropping the future abandons any in-flight provider or probe
    /// call.
    #[instrument(skip(self, request), fields(requester = %request.requester, category = %request.category))]
    pub async fn run(&self, request: &GenerationRequest) -> Result<PipelineResult, PipelineError> {
        let prompt = self.compiler.compile(request).map_err(|e| {
            warn!(error = %e, "Request rejected at compile time");
            PipelineError::InputRejected(e)
        })?;
        let mut state = PipelineState::Compile.advance(PipelineEvent::Compiled, self.max_attempts);
        debug!(prompt_chars = prompt.char_len(), "Prompt compiled");

        let mut outcome = self.attempt(&prompt, request, 1).await;
        loop {
            let passed = outcome.verification.passed();
            state = state.advance(PipelineEvent::Verified { passed }, self.max_attempts);
            match state {
                PipelineState::Attempt { number } => {
                    warn!(
                        attempt = number - 1,
                        unreachable = ?outcome.verification.unreachable,
                        "Verification failed, retrying"
                    );
                    outcome = self.attempt(&prompt, request, number).await;
                }
                _ => break,
            }
        }

        let (attempts, verified) = match state {
            PipelineState::Success { attempts } => (attempts, true),
            PipelineState::Exhausted { attempts } => {
                warn!(attempts, "Retry budget exhausted, keeping last attempt");
                (attempts, false)
            }
            PipelineState::Attempt { number } => (number, false),
            PipelineState::Compile => (0, false),
        };

        let provenance = self.provenance(&outcome);
        info!(
            attempts,
            verified,
            fallback = outcome.fallback_used,
            degraded = outcome.degraded,
            "Pipeline finished"
        );

        Ok(PipelineResult {
            html: outcome.html,
            prompt,
            attempts,
            verified,
            provenance,
        })
    }

    #[instrument(skip(self, prompt, request))]
    async fn attempt(
        &self,
        prompt: &CompiledPrompt,
        request: &GenerationRequest,
        number: u32,
    ) -> AttemptOutcome {
        let generation = match tokio::time::timeout(
            self.attempt_timeout,
            self.generator.generate(prompt, &request.category, &request.style),
        )
        .await
        {
            Ok(generation) => generation,
            Err(_) => {
                warn!(timeout = ?self.attempt_timeout, "Attempt timed out, serving fallback page");
                Generation::fallback(
                    prompt,
                    &self.sanitizer.policy().framework_url,
                    ProviderError::Timeout,
                )
            }
        };

        if let Generation::Fallback { cause, .. } = &generation {
            warn!(error = %cause, "Provider unavailable for this attempt");
        }
        let fallback_used = generation.is_fallback();

        let sanitization = self.sanitizer.sanitize(generation.artifact());
        let degraded = sanitization.is_degraded();
        let html = sanitization.into_artifact();

        let (verification, verification_skipped) = match &self.verifier {
            Some(verifier) => (verifier.verify(&html).await, false),
            None => (VerificationResult::default(), true),
        };

        AttemptOutcome {
            html,
            fallback_used,
            degraded,
            verification,
            verification_skipped,
        }
    }

    fn provenance(&self, outcome: &AttemptOutcome) -> Provenance {
        Provenance {
            version: PROVENANCE_VERSION.to_string(),
            provider: self.provider.clone(),
            model: self.model.clone(),
            generated_at: Utc::now(),
            fallback_used: outcome.fallback_used,
            sanitization_degraded: outcome.degraded,
            verification_skipped: outcome.verification_skipped,
            unreachable_resources: outcome.verification.unreachable.clone(),
            content_digest: blake3::hash(outcome.html.as_str().as_bytes())
                .to_hex()
                .to_string(),
        }
    }
}

impl Orchestrator<ProviderClient, HttpProbe> {
    /// Production wiring: reqwest provider client and HTTP probe.
    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        let client = ProviderClient::new(config.provider.clone())?
            .with_framework_url(config.sanitizer.framework_url.clone());
        let verifier = if config.verifier.enabled {
            Some(
                ResourceVerifier::from_config(&config.verifier)?
                    .with_max_depth(config.sanitizer.max_depth),
            )
        } else {
            None
        };
        Ok(Self::new(config, client, verifier))
    }
}
