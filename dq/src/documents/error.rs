//! Document loading error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading documents or their JSON dump
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Cannot access {path}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a readable .docx package")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Malformed {part} in {path}")]
    Xml {
        path: PathBuf,
        part: &'static str,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Cannot walk {path}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Document dump {path} is not valid JSON")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DocumentError {
    /// The file or directory the error is about
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::FileAccess { path, .. }
            | Self::Archive { path, .. }
            | Self::Xml { path, .. }
            | Self::Walk { path, .. }
            | Self::Json { path, .. } => path,
        }
    }
}
