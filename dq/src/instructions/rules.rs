//! Rules file: the full collection of conditional instructions

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{InstructionError, SelectionContext};

/// A natural-language directive, included when all of its cases are active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub text: String,
    pub cases: Vec<String>,
    pub sequence: i64,
}

/// Parsed rules file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSet {
    pub instructions: Vec<Instruction>,
}

impl InstructionSet {
    /// Read and parse a rules file
    pub fn load(path: &Path) -> Result<Self, InstructionError> {
        debug!(path = %path.display(), "InstructionSet::load: called");
        let content = std::fs::read_to_string(path).map_err(|source| InstructionError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let set: Self = serde_json::from_str(&content).map_err(|source| InstructionError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), count = set.instructions.len(), "Loaded instructions");
        Ok(set)
    }

    /// Instructions applicable to `ctx`, ascending by sequence
    ///
    /// Ties keep their file order.
    pub fn select(&self, ctx: &SelectionContext) -> Vec<Instruction> {
        let mut selected: Vec<Instruction> = self
            .instructions
            .iter()
            .filter(|instruction| ctx.matches(&instruction.cases))
            .cloned()
            .collect();

        // sort_by_key is stable
        selected.sort_by_key(|instruction| instruction.sequence);

        debug!(
            stage = %ctx.stage,
            total = self.instructions.len(),
            selected = selected.len(),
            "InstructionSet::select: done"
        );
        selected
    }
}
