use thiserror::Error;
use tracing::warn;

use crate::config::PipelineConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Prompt exceeds maximum length: {length} > {max} characters")]
    PromptTooLong { length: usize, max: usize },
    #[error("Prompt too short: {length} < {min} characters")]
    PromptTooShort { length: usize, min: usize },
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Prompt contains potentially unsafe content: {pattern:?}")]
    UnsafeContent { pattern: String },
}

/// Length and content limits applied before any provider call.
#[derive(Debug, Clone)]
pub struct PromptGuard {
    max_length: usize,
    min_length: usize,
    dangerous_patterns: Vec<String>,
}

impl PromptGuard {
    pub fn new(max_length: usize, min_length: usize, dangerous_patterns: Vec<String>) -> Self {
        Self {
            max_length,
            min_length,
            dangerous_patterns: dangerous_patterns
                .into_iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.max_prompt_length,
            config.min_prompt_length,
            config.dangerous_patterns.clone(),
        )
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Ceiling on the final compiled text, counted in characters.
    pub fn check_length(&self, text: &str) -> Result<(), CompileError> {
        let length = text.chars().count();
        if length > self.max_length {
            warn!(length, max = self.max_length, "Prompt rejected: too long");
            return Err(CompileError::PromptTooLong {
                length,
                max: self.max_length,
            });
        }
        Ok(())
    }

    /// Floor on free-text prompts.
    pub fn check_min_length(&self, text: &str) -> Result<(), CompileError> {
        let length = text.trim().chars().count();
        if length < self.min_length {
            return Err(CompileError::PromptTooShort {
                length,
                min: self.min_length,
            });
        }
        Ok(())
    }

    /// Rejects user text carrying template or script injection markers.
    pub fn check_content(&self, text: &str) -> Result<(), CompileError> {
        let lowered = text.to_lowercase();
        if let Some(pattern) = self
            .dangerous_patterns
            .iter()
            .find(|pattern| !pattern.is_empty() && lowered.contains(pattern.as_str()))
        {
            warn!(pattern = pattern.as_str(), "Prompt rejected: suspicious pattern detected");
            return Err(CompileError::UnsafeContent {
                pattern: pattern.clone(),
            });
        }
        Ok(())
    }
}
