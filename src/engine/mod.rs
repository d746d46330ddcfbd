//! Public façade for the engine layer.

pub mod orchestrator;
pub mod state;

pub use orchestrator::{Orchestrator, PROVENANCE_VERSION};
pub use state::{PipelineEvent, PipelineState};
