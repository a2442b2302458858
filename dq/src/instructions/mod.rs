//! Instruction selection
//!
//! Picks the natural-language instructions that apply to a pipeline stage
//! out of a JSON rules file and orders them by their `sequence`.

mod context;
mod error;
mod rules;

use std::path::Path;

use tracing::debug;

pub use context::{Language, SelectionContext, Stage, VolumeMetadata};
pub use error::InstructionError;
pub use rules::{Instruction, InstructionSet};

/// Load `rules_path` fresh and return the instructions for `stage`
///
/// `metadata` is only consulted for the transcription stage.
pub fn select_instructions(
    rules_path: &Path,
    stage: Stage,
    metadata: Option<&VolumeMetadata>,
) -> Result<Vec<Instruction>, InstructionError> {
    debug!(rules_path = %rules_path.display(), %stage, "select_instructions: called");
    let set = InstructionSet::load(rules_path)?;
    let ctx = SelectionContext::for_stage(stage, metadata)?;
    Ok(set.select(&ctx))
}
