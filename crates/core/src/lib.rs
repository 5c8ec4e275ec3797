//! # DocChat Core
//!
//! Domain types, traits, and error definitions shared by every DocChat crate.
//! This crate has **no framework dependencies**: it defines the document,
//! conversation and provider model that the extractor, the chat pipeline and
//! the CLI are written against.
//!
//! ## Layout
//!
//! - [`document`]: uploaded documents, format detection, upload-set fingerprints
//! - [`message`]: role-tagged messages and the bounded-view conversation history
//! - [`provider`]: the `Provider` trait over text-completion services
//! - [`error`]: the closed error enums every operation reports through

pub mod document;
pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use document::{Document, DocumentFormat, UploadSet};
pub use error::{Error, ExtractionError, ModelOperation, ProviderError, Result};
pub use message::{ConversationHistory, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
