//! Prompt compilation: request in, instruction text out.

pub mod compiler;
pub mod fields;
pub mod guard;

pub use compiler::PromptCompiler;
pub use fields::StructuredFieldSet;
pub use guard::{CompileError, PromptGuard};
