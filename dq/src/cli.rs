//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::instructions::Stage;

/// docquery - ask questions about a folder of Word documents
#[derive(Parser)]
#[command(
    name = "dq",
    about = "Ask an LLM questions about the bullet points in a folder of Word documents",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Directory of .docx files (overrides data-dir)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Instructions rules file (overrides instructions-path)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub instructions: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chat with the model about the documents (default)
    Chat,

    /// Load the documents and summarise what was found
    Load {
        /// Also write the collection to this JSON file
        #[arg(long, value_name = "PATH")]
        dump: Option<PathBuf>,
    },

    /// Print the instructions selected for a stage
    Instructions {
        /// Pipeline stage (transcription, normalization, extraction, research, ...)
        #[arg(short, long)]
        stage: Stage,

        /// Volume metadata JSON (required for transcription)
        #[arg(short, long, value_name = "FILE")]
        metadata: Option<PathBuf>,
    },
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docquery")
        .join("logs")
        .join("docquery.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let mut help = String::new();
    help.push_str("Config is read from --config, ./.docquery.yml, then ~/.config/docquery/docquery.yml\n");
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}
