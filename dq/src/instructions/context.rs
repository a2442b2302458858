//! Selection context: which pipeline stage, language and record type an
//! instruction set is being selected for

use std::convert::Infallible;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::InstructionError;

/// Pipeline stage the instructions are selected for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    Transcription,
    Normalization,
    Extraction,
    Research,
    /// Any other caller-defined tag
    Custom(String),
}

impl Stage {
    /// The keyword this stage contributes to matching
    pub fn as_str(&self) -> &str {
        match self {
            Self::Transcription => "transcription",
            Self::Normalization => "normalization",
            Self::Extraction => "extraction",
            Self::Research => "research",
            Self::Custom(tag) => tag,
        }
    }
}

impl From<&str> for Stage {
    fn from(s: &str) -> Self {
        match s {
            "transcription" => Self::Transcription,
            "normalization" => Self::Normalization,
            "extraction" => Self::Extraction,
            "research" => Self::Research,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl FromStr for Stage {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source language of a volume, derived from its country
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Portuguese,
    Spanish,
}

impl Language {
    /// Brazilian volumes are Portuguese, everything else Spanish
    pub fn from_country(country: &str) -> Self {
        if country == "Brazil" { Self::Portuguese } else { Self::Spanish }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portuguese => "Portuguese",
            Self::Spanish => "Spanish",
        }
    }
}

/// Basic metadata describing the volume being transcribed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetadata {
    /// Free-form catalogue fields; `country` is the one consulted
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,

    /// Record type of the volume (e.g. "baptism")
    #[serde(rename = "type", default)]
    pub record_type: Option<String>,
}

impl VolumeMetadata {
    /// Read volume metadata from a JSON file
    pub fn load(path: &Path) -> Result<Self, InstructionError> {
        debug!(path = %path.display(), "VolumeMetadata::load: called");
        let content = std::fs::read_to_string(path).map_err(|source| InstructionError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| InstructionError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Everything an instruction's `cases` can be matched against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionContext {
    pub stage: Stage,
    pub language: Option<Language>,
    pub record_type: Option<String>,
}

impl SelectionContext {
    /// Build the context for a stage
    ///
    /// Only the transcription stage consults volume metadata; it needs both
    /// `fields.country` and `type`. Every other stage ignores `metadata`.
    pub fn for_stage(stage: Stage, metadata: Option<&VolumeMetadata>) -> Result<Self, InstructionError> {
        debug!(%stage, has_metadata = metadata.is_some(), "SelectionContext::for_stage: called");

        if stage != Stage::Transcription {
            return Ok(Self {
                stage,
                language: None,
                record_type: None,
            });
        }

        let lookup = |field| InstructionError::Lookup {
            field,
            stage: stage.to_string(),
        };

        let metadata = metadata.ok_or_else(|| lookup("metadata"))?;
        let country = metadata.fields.get("country").ok_or_else(|| lookup("fields.country"))?;
        let record_type = metadata.record_type.clone().ok_or_else(|| lookup("type"))?;

        // A non-string country is not "Brazil"
        let language = Language::from_country(country.as_str().unwrap_or_default());
        debug!(?language, %record_type, "SelectionContext::for_stage: transcription context");

        Ok(Self {
            stage,
            language: Some(language),
            record_type: Some(record_type),
        })
    }

    /// The active keyword set, in stage / language / record type order
    pub fn keywords(&self) -> Vec<&str> {
        let mut keywords = vec![self.stage.as_str()];
        if let Some(language) = self.language {
            keywords.push(language.as_str());
        }
        if let Some(record_type) = &self.record_type {
            keywords.push(record_type);
        }
        keywords
    }

    /// An instruction applies when every one of its cases is an active keyword
    pub fn matches<S: AsRef<str>>(&self, cases: &[S]) -> bool {
        let keywords = self.keywords();
        cases.iter().all(|case| keywords.contains(&case.as_ref()))
    }
}
