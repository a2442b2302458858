//! Interactive question/answer over the loaded documents
//!
//! Seeds a conversation with the research instructions and the document
//! collection, then hands it to a [`ChatSession`].

mod conversation;
mod session;

pub use conversation::{Conversation, RESEARCH_DATA_PREFIX, render_research_data};
pub use session::{ChatSession, PROMPT, QUIT_COMMAND, SessionState, Turn};

use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::documents::{DocumentLoader, write_dump};
use crate::instructions::{Stage, select_instructions};
use crate::llm::create_client;

/// Build the opening conversation: research instructions, then the documents
pub fn prepare_conversation(config: &Config) -> Result<Conversation> {
    debug!(data_dir = %config.data_dir.display(), "prepare_conversation: called");

    let loader = DocumentLoader::new(config.documents.on_error);
    let records = loader
        .load(&config.data_dir)
        .context(format!("Failed to load documents from {}", config.data_dir.display()))?;
    info!(documents = records.len(), "Documents loaded");

    if config.documents.dump {
        debug!("prepare_conversation: dump enabled");
        write_dump(&config.documents.dump_path, &records).context("Failed to write document dump")?;
    }

    let instructions = select_instructions(&config.instructions_path, Stage::Research, None).context(format!(
        "Failed to select instructions from {}",
        config.instructions_path.display()
    ))?;
    info!(instructions = instructions.len(), "Research instructions selected");

    Conversation::seeded(&instructions, &records).context("Failed to render research data")
}

/// Run the interactive session
///
/// This is the main entry point for `dq chat`.
pub async fn run_interactive(config: &Config) -> Result<()> {
    // Validate API key early
    config.validate()?;

    let llm = create_client(&config.llm).map_err(|e| eyre::eyre!("Failed to create LLM client: {}", e))?;
    let conversation = prepare_conversation(config)?;

    let (instructions, _, _) = conversation.role_counts();
    println!();
    println!("{}", "docquery".bright_cyan().bold());
    println!("Documents: {}", config.data_dir.display());
    println!("Instructions: {}", instructions);
    println!("Type {} for help, {} to quit", "/help".yellow(), QUIT_COMMAND.yellow());
    println!();

    let mut session = ChatSession::new(llm, conversation, config.llm.max_tokens);
    session.run().await
}
