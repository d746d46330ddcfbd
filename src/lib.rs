//! Turns page requests into sanitized, self-contained HTML documents:
//! compile a prompt, ask a generation provider, sanitize what comes back,
//! probe the external resources it references, retry within a budget.

pub mod config;
pub mod engine;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod sanitizer;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod verifier;

pub use config::Config;
pub use engine::Orchestrator;
pub use error::{BuildError, PipelineError, ServiceError};
pub use service::{PageReceipt, PageService};
pub use types::{GenerationRequest, PipelineResult};
