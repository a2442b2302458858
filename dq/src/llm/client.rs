//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Chat completion endpoint
///
/// Stateless: the caller sends the full conversation on every call.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the conversation and wait for the assistant's reply
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
