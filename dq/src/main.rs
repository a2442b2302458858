//! docquery - ask an LLM about a folder of Word documents
//!
//! CLI entry point for the chat session, document loading and instruction
//! selection.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, FromArgMatches};
use eyre::{Context, Result};
use tracing::{debug, info};

use docquery::chat;
use docquery::cli::{Cli, Command, generate_after_help};
use docquery::config::Config;
use docquery::documents::{DocumentLoader, write_dump};
use docquery::instructions::{Stage, VolumeMetadata, select_instructions};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docquery")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("docquery.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Global flags win over the config file
    if let Some(data_dir) = cli.data_dir {
        debug!(data_dir = %data_dir.display(), "main: overriding data-dir");
        config.data_dir = data_dir;
    }
    if let Some(instructions) = cli.instructions {
        debug!(instructions = %instructions.display(), "main: overriding instructions-path");
        config.instructions_path = instructions;
    }

    info!(
        data_dir = %config.data_dir.display(),
        model = %config.llm.model,
        "docquery loaded config"
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Chat) | None => {
            debug!("main: matched Chat command");
            cmd_chat(&config).await
        }
        Some(Command::Load { dump }) => {
            debug!(?dump, "main: matched Load command");
            cmd_load(&config, dump.as_deref())
        }
        Some(Command::Instructions { stage, metadata }) => {
            debug!(%stage, ?metadata, "main: matched Instructions command");
            cmd_instructions(&config, stage, metadata.as_deref())
        }
    }
}

/// Run the interactive chat session
async fn cmd_chat(config: &Config) -> Result<()> {
    debug!("cmd_chat: called");
    chat::run_interactive(config).await
}

/// Load the documents and print one line per file
fn cmd_load(config: &Config, dump: Option<&Path>) -> Result<()> {
    debug!(?dump, "cmd_load: called");
    let loader = DocumentLoader::new(config.documents.on_error);
    let records = loader
        .load(&config.data_dir)
        .context(format!("Failed to load documents from {}", config.data_dir.display()))?;

    for record in &records {
        println!("{}: {} bullets", record.path, record.content.len());
    }
    println!("{} documents loaded", records.len());

    if let Some(path) = dump {
        debug!(path = %path.display(), "cmd_load: writing dump");
        write_dump(path, &records).context("Failed to write document dump")?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Print the instructions selected for a stage
fn cmd_instructions(config: &Config, stage: Stage, metadata: Option<&Path>) -> Result<()> {
    debug!(%stage, ?metadata, "cmd_instructions: called");
    let metadata = match metadata {
        Some(path) => Some(VolumeMetadata::load(path).context("Failed to load volume metadata")?),
        None => None,
    };

    let instructions = select_instructions(&config.instructions_path, stage, metadata.as_ref()).context(format!(
        "Failed to select instructions from {}",
        config.instructions_path.display()
    ))?;

    for instruction in &instructions {
        println!("{}: {}", instruction.sequence, instruction.text);
    }

    Ok(())
}
