//! Batch extraction of an upload into one document context string.
//!
//! Every document is extracted in upload order. A document that fails is
//! logged and skipped; the batch only fails when nothing contributed.

use docchat_core::document::Document;
use docchat_core::error::{Error, ExtractionError};
use docchat_extract::Extractor;
use tracing::{info, warn};

/// Result of assembling one upload.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    /// Concatenated per-document blocks, in upload order.
    pub context: String,
    /// Names of the documents whose text made it into `context`.
    pub processed: Vec<String>,
    /// Documents skipped, with the reason.
    pub failures: Vec<(String, ExtractionError)>,
}

impl AssembledContext {
    /// Length of the context in characters.
    pub fn char_len(&self) -> usize {
        self.context.chars().count()
    }
}

/// Builds the document context from an upload.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    extractor: Extractor,
}

impl ContextAssembler {
    pub fn new(extractor: Extractor) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Extract every document and join the successes.
    ///
    /// Each contributing document becomes a block
    /// `--- Content from {name} ---\n{text}\n`; blocks are separated by a
    /// blank line.
    pub fn assemble(&self, documents: &[Document]) -> Result<AssembledContext, Error> {
        let mut blocks = Vec::with_capacity(documents.len());
        let mut processed = Vec::new();
        let mut failures = Vec::new();

        for document in documents {
            match self.extractor.extract(document) {
                Ok(text) => {
                    blocks.push(content_block(document.name(), &text));
                    processed.push(document.name().to_string());
                }
                Err(e) => {
                    warn!(document = %document.name(), error = %e, "Skipping document");
                    failures.push((document.name().to_string(), e));
                }
            }
        }

        if blocks.is_empty() {
            return Err(Error::AllDocumentsFailed {
                attempted: documents.len(),
                failures,
            });
        }

        let context = blocks.join("\n");
        info!(
            documents = processed.len(),
            failed = failures.len(),
            chars = context.chars().count(),
            "Assembled document context"
        );

        Ok(AssembledContext {
            context,
            processed,
            failures,
        })
    }
}

fn content_block(name: &str, text: &str) -> String {
    format!("--- Content from {name} ---\n{text}\n")
}
