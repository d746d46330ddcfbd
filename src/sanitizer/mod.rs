//! # Sanitizer
//!
//! Enforces the structural and security contract on generated markup:
//!
//! 1. parse into an owned tree ([`dom`]) through html5ever ([`parse`]);
//! 2. drop inline scripts, scripts off the allow-list, `srcdoc` documents
//!    and untrusted `<object>`/`<embed>`;
//! 3. drop `on*` handler attributes and script-scheme URLs;
//! 4. drop `<style>` blocks;
//! 5. – 10. establish `html`, `head`, one framework inclusion, charset,
//!    viewport and `body` ([`rules`]);
//! 11. serialize with a single canonical doctype ([`serialize`]).
//!
//! Text content is never rewritten; only elements and attributes are.

pub mod dom;
pub mod parse;
pub mod policy;
pub mod rules;
pub mod serialize;

pub use dom::{Attribute, Document, Element, Node};
pub use policy::SanitizerPolicy;
pub use rules::FrameworkAction;
pub use serialize::{escape_text, serialize_document, DOCTYPE};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::config::SanitizerConfig;
use crate::types::{RawArtifact, SanitizedArtifact};

pub const DEGRADED_MARKER: &str = "<!-- Sanitization Failed -->";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("Document nesting exceeds {max_depth} levels")]
    TooDeep { max_depth: usize },
}

/// What the rules changed on one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    pub scripts_removed: usize,
    pub embeds_removed: usize,
    pub handlers_removed: usize,
    pub script_urls_removed: usize,
    pub styles_removed: usize,
    pub root_created: bool,
    pub head_created: bool,
    pub framework: FrameworkAction,
    pub framework_duplicates_removed: usize,
    pub charset_injected: bool,
    pub viewport_injected: bool,
    pub body_created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitization {
    Clean {
        artifact: SanitizedArtifact,
        report: SanitizeReport,
    },
    /// The parser gave up; the artifact is a marked, escaped stand-in.
    Degraded {
        artifact: SanitizedArtifact,
        error: SanitizeError,
    },
}

impl Sanitization {
    pub fn artifact(&self) -> &SanitizedArtifact {
        match self {
            Sanitization::Clean { artifact, .. } => artifact,
            Sanitization::Degraded { artifact, .. } => artifact,
        }
    }

    pub fn into_artifact(self) -> SanitizedArtifact {
        match self {
            Sanitization::Clean { artifact, .. } => artifact,
            Sanitization::Degraded { artifact, .. } => artifact,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Sanitization::Degraded { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    policy: SanitizerPolicy,
}

impl Sanitizer {
    pub fn new(policy: SanitizerPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &SanitizerConfig) -> Self {
        Self::new(SanitizerPolicy::from_config(config))
    }

    pub fn policy(&self) -> &SanitizerPolicy {
        &self.policy
    }

    /// Never fails: a parser failure yields [`Sanitization::Degraded`].
    #[instrument(skip_all, fields(raw_chars = raw.as_str().len()))]
    pub fn sanitize(&self, raw: &RawArtifact) -> Sanitization {
        match self.try_sanitize(raw.as_str()) {
            Ok((artifact, report)) => {
                debug!(?report, "Sanitization complete");
                Sanitization::Clean { artifact, report }
            }
            Err(err) => {
                error!(error = %err, "Sanitization failed, emitting degraded document");
                Sanitization::Degraded {
                    artifact: self.degraded_document(raw.as_str()),
                    error: err,
                }
            }
        }
    }

    pub fn try_sanitize(&self, raw: &str) -> Result<(SanitizedArtifact, SanitizeReport), SanitizeError> {
        let mut document = parse::parse_html(raw, self.policy.max_depth)?;
        let report = self.apply_rules(&mut document);
        let html = serialize_document(&document);
        Ok((SanitizedArtifact::new(html), report))
    }

    /// Steps 2–10 on an already parsed tree.
    pub fn apply_rules(&self, document: &mut Document) -> SanitizeReport {
        let scripts_removed = rules::strip_untrusted_scripts(document, &self.policy);
        let embeds_removed = rules::strip_embedded_documents(document, &self.policy);
        let handlers_removed = rules::strip_event_handlers(document);
        let script_urls_removed = rules::strip_script_urls(document);
        let styles_removed = rules::strip_style_blocks(document);
        let root_created = rules::ensure_root(document);
        let head_created = rules::ensure_head(document);
        let (framework, framework_duplicates_removed) =
            rules::ensure_framework(document, &self.policy);
        let charset_injected = rules::ensure_charset(document);
        let viewport_injected = rules::ensure_viewport(document);
        let body_created = rules::ensure_body(document);

        SanitizeReport {
            scripts_removed,
            embeds_removed,
            handlers_removed,
            script_urls_removed,
            styles_removed,
            root_created,
            head_created,
            framework,
            framework_duplicates_removed,
            charset_injected,
            viewport_injected,
            body_created,
        }
    }

    /// Minimal safe page showing the raw markup as escaped text.
    fn degraded_document(&self, raw: &str) -> SanitizedArtifact {
        SanitizedArtifact::new(format!(
            "{doctype}\n{marker}\n<html lang=\"en\"><head><meta charset=\"{charset}\"><meta name=\"viewport\" content=\"{viewport}\"><title>Sanitization Failed</title><script src=\"{framework}\"></script></head><body class=\"bg-slate-50 p-6\"><pre class=\"whitespace-pre-wrap break-words text-sm\">{raw}</pre></body></html>",
            doctype = DOCTYPE,
            marker = DEGRADED_MARKER,
            charset = policy::CHARSET,
            viewport = policy::VIEWPORT,
            framework = serialize::escape_attr(&self.policy.framework_url),
            raw = escape_text(raw),
        ))
    }
}

#[cfg(test)]
mod tests;
