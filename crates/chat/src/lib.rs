//! # DocChat Chat
//!
//! The question-answer pipeline over uploaded documents:
//!
//! ```text
//! upload ──► ContextAssembler ──► document context ─┐
//!                                                   ├─► PromptBuilder ──► ChatResponder ──► Provider
//! question + recent history ────────────────────────┘
//! ```
//!
//! [`Session`] ties the pieces together for one user: it holds the upload
//! set, its context and the conversation, and receives the assembler and
//! responder from its caller.

pub mod context;
pub mod prompt;
pub mod responder;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{AssembledContext, ContextAssembler};
pub use prompt::{BuiltPrompt, PromptBuilder};
pub use responder::ChatResponder;
pub use session::{LoadReport, Session, UploadOutcome};
