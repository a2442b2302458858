//! Document loading
//!
//! Walks a folder of .docx files and keeps only their bulleted and numbered
//! paragraphs, each with a coarse indentation level. The collection can be
//! written to (and read back from) a single JSON file.

mod classifier;
mod docx;
mod error;
mod loader;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use classifier::{ListStyleClassifier, ParagraphClassifier, indent_level};
pub use docx::{Paragraph, read_paragraphs};
pub use error::DocumentError;
pub use loader::{DocumentLoader, FailurePolicy};

/// One bullet or numbered item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletLine {
    pub text: String,
    pub indent: u32,
}

/// The bullets of one file, in paragraph order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub path: String,
    pub content: Vec<BulletLine>,
}

/// Write the collection as one JSON array, replacing any existing file
pub fn write_dump(path: &Path, records: &[DocumentRecord]) -> Result<(), DocumentError> {
    debug!(path = %path.display(), count = records.len(), "write_dump: called");
    let json = serde_json::to_string(records).map_err(|source| DocumentError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    std::fs::write(path, json).map_err(|source| DocumentError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), documents = records.len(), "Wrote document dump");
    Ok(())
}

/// Read a collection previously written by [`write_dump`]
pub fn read_dump(path: &Path) -> Result<Vec<DocumentRecord>, DocumentError> {
    debug!(path = %path.display(), "read_dump: called");
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| DocumentError::Json {
        path: path.to_path_buf(),
        source,
    })
}
