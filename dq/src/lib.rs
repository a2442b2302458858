//! docquery - ask an LLM about the bullet points in a folder of Word documents
//!
//! Walks a directory of .docx files, keeps their list paragraphs with a coarse
//! indentation level, and seeds a chat with them plus the research
//! instructions picked out of a JSON rules file.
//!
//! # Modules
//!
//! - [`instructions`] - Rules file loading and per-stage selection
//! - [`documents`] - Docx reading, bullet classification, directory loading
//! - [`llm`] - LLM client trait and OpenAI implementation
//! - [`chat`] - Conversation state and the interactive session
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod chat;
pub mod cli;
pub mod config;
pub mod documents;
pub mod instructions;
pub mod llm;

// Re-export commonly used types
pub use chat::{ChatSession, Conversation, Turn};
pub use config::{Config, DocumentsConfig, LlmConfig};
pub use documents::{BulletLine, DocumentError, DocumentLoader, DocumentRecord, FailurePolicy};
pub use instructions::{Instruction, InstructionError, SelectionContext, Stage, select_instructions};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, create_client};
