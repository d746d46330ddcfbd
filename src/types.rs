//! Data model shared by every pipeline stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::prompt::StructuredFieldSet;

/// Inbound request: who asked, what they asked for, and how it should look.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Opaque requester identity (an email address in practice).
    #[serde(alias = "email")]
    pub requester: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, alias = "structured")]
    pub fields: Option<StructuredFieldSet>,
    #[serde(default = "default_category", alias = "page_type")]
    pub category: String,
    #[serde(default = "default_style", alias = "theme")]
    pub style: String,
}

fn default_category() -> String {
    "other".to_string()
}

fn default_style() -> String {
    "modern".to_string()
}

impl GenerationRequest {
    pub fn from_prompt(requester: &str, prompt: &str, category: &str, style: &str) -> Self {
        Self {
            requester: requester.to_string(),
            prompt: Some(prompt.to_string()),
            fields: None,
            category: category.to_string(),
            style: style.to_string(),
        }
    }

    pub fn from_fields(
        requester: &str,
        fields: StructuredFieldSet,
        category: &str,
        style: &str,
    ) -> Self {
        Self {
            requester: requester.to_string(),
            prompt: None,
            fields: Some(fields),
            category: category.to_string(),
            style: style.to_string(),
        }
    }
}

/// Final instruction text handed to the generation provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompiledPrompt(String);

impl CompiledPrompt {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CompiledPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unmodified provider output, or the fallback document standing in for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArtifact(String);

impl RawArtifact {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Markup that went through the sanitizer. Only the sanitizer builds these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SanitizedArtifact(String);

impl SanitizedArtifact {
    pub(crate) fn new(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Outcome of probing every external reference of a sanitized document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub unreachable: Vec<String>,
}

impl VerificationResult {
    pub fn passed(&self) -> bool {
        self.unreachable.is_empty()
    }
}

/// Where a final artifact came from and what happened on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub version: String,
    pub provider: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
    pub fallback_used: bool,
    pub sanitization_degraded: bool,
    pub verification_skipped: bool,
    pub unreachable_resources: Vec<String>,
    /// BLAKE3 hex digest of the final HTML.
    pub content_digest: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub html: SanitizedArtifact,
    /// The prompt that drove generation; this is what gets persisted.
    pub prompt: CompiledPrompt,
    pub attempts: u32,
    pub verified: bool,
    pub provenance: Provenance,
}
