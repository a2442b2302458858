//! Instruction selection error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or selecting instructions
#[derive(Debug, Error)]
pub enum InstructionError {
    #[error("Cannot read {path}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Volume metadata is missing '{field}' (required for the {stage} stage)")]
    Lookup { field: &'static str, stage: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_message_names_field_and_stage() {
        let err = InstructionError::Lookup {
            field: "fields.country",
            stage: "transcription".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("fields.country"));
        assert!(msg.contains("transcription"));
    }

    #[test]
    fn test_file_access_keeps_source() {
        let err = InstructionError::FileAccess {
            path: PathBuf::from("instructions.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };

        assert!(err.to_string().contains("instructions.json"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
