//! Uploaded documents and upload-set identity.
//!
//! A [`Document`] is an immutable named blob. Its [`DocumentFormat`] is
//! inferred from the lowercase file-name suffix. An [`UploadSet`] records the
//! ordered fingerprints of the documents in one upload so a session can tell
//! whether re-extraction is needed.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ExtractionError;

/// The document families the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Word,
    Excel,
}

impl DocumentFormat {
    /// Map a lowercase file extension to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "docx" | "doc" => Some(Self::Word),
            "xlsx" | "xls" | "xlsm" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Detect the format from a file name.
    pub fn from_file_name(name: &str) -> Result<Self, ExtractionError> {
        let ext = extension_of(name);
        Self::from_extension(&ext).ok_or(ExtractionError::UnsupportedFormat { extension: ext })
    }

    /// Human-readable label used in processing error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Word => "Word document",
            Self::Excel => "Excel",
        }
    }

    pub fn no_content_message(&self) -> &'static str {
        match self {
            Self::Pdf => "No text could be extracted from PDF",
            Self::Word => "No text could be extracted from Word document",
            Self::Excel => "No data could be extracted from Excel file",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Word => write!(f, "word"),
            Self::Excel => write!(f, "excel"),
        }
    }
}

/// Lowercase text after the last `.`; the whole lowercase name if there is none.
pub fn extension_of(name: &str) -> String {
    name.rsplit('.').next().unwrap_or("").to_lowercase()
}

/// An uploaded binary blob with its declared name.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a document from disk, naming it after the file name component.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn extension(&self) -> String {
        extension_of(&self.name)
    }

    /// The declared format, or `UnsupportedFormat` naming the extension.
    pub fn format(&self) -> Result<DocumentFormat, ExtractionError> {
        DocumentFormat::from_file_name(&self.name)
    }

    pub fn fingerprint(&self) -> DocumentFingerprint {
        DocumentFingerprint {
            name: self.name.clone(),
            size: self.bytes.len(),
            sha256: hex::encode(Sha256::digest(&self.bytes)),
        }
    }
}

/// Identity of one uploaded document: name, size and content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentFingerprint {
    pub name: String,
    pub size: usize,
    pub sha256: String,
}

/// The ordered identity of an upload.
///
/// Equality is element-wise and order-sensitive: reordering the same files
/// is a new upload set, re-submitting identical files in the same order is not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSet {
    entries: Vec<DocumentFingerprint>,
}

impl UploadSet {
    pub fn from_documents(documents: &[Document]) -> Self {
        Self {
            entries: documents.iter().map(Document::fingerprint).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DocumentFingerprint] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}
