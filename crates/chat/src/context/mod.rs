//! Document context: assembly from an upload and bounded truncation.
//!
//! | Step | Module | Output |
//! |------|--------|--------|
//! | 1. Extract + join | [`assembler`] | the full document context |
//! | 2. Bound | [`truncate`] | a prefix cut at a sentence or line boundary |

pub mod assembler;
pub mod truncate;

pub use assembler::{AssembledContext, ContextAssembler};
pub use truncate::{truncate_content, TRUNCATION_NOTE};
