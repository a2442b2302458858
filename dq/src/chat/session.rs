//! Chat session management

use std::sync::Arc;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info, warn};

use super::Conversation;
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message, Role, StopReason};

/// Prompt shown before every question
pub const PROMPT: &str = "What would you like to ask? If you're done, type 'quit'. ";

/// Input that ends the session, compared trimmed and ignoring ASCII case
pub const QUIT_COMMAND: &str = "quit";

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Terminated,
}

/// Outcome of one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// The operator quit; nothing was sent
    Quit,
    /// Handled locally (blank line or slash command); nothing was sent
    Local,
    /// The model answered
    Reply { text: String, stop_reason: StopReason },
}

/// Interactive question/answer session over a seeded conversation
pub struct ChatSession {
    llm: Arc<dyn LlmClient>,
    conversation: Conversation,
    max_tokens: Option<u32>,
    state: SessionState,
}

impl ChatSession {
    pub fn new(llm: Arc<dyn LlmClient>, conversation: Conversation, max_tokens: Option<u32>) -> Self {
        Self {
            llm,
            conversation,
            max_tokens,
            state: SessionState::AwaitingInput,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Process one line of operator input
    ///
    /// On a failed call the question is taken back out of the history, so the
    /// conversation is exactly what it was before the turn.
    pub async fn handle_input(&mut self, input: &str) -> Result<Turn, LlmError> {
        if self.state == SessionState::Terminated {
            return Ok(Turn::Quit);
        }

        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case(QUIT_COMMAND) {
            debug!("handle_input: quit");
            self.state = SessionState::Terminated;
            return Ok(Turn::Quit);
        }

        if trimmed.is_empty() {
            return Ok(Turn::Local);
        }

        match trimmed {
            "/help" => {
                self.print_help();
                return Ok(Turn::Local);
            }
            "/history" => {
                self.print_history();
                return Ok(Turn::Local);
            }
            _ => {}
        }

        let before = self.conversation.len();
        self.conversation.push(Message::user(input));

        match self.ask().await {
            Ok(turn) => Ok(turn),
            Err(e) => {
                warn!(error = %e, "handle_input: call failed, rolling back question");
                self.conversation.truncate(before);
                Err(e)
            }
        }
    }

    /// Send the whole history and record the reply
    async fn ask(&mut self) -> Result<Turn, LlmError> {
        let request = CompletionRequest {
            messages: self.conversation.messages().to_vec(),
            max_tokens: self.max_tokens,
        };
        debug!(messages = request.messages.len(), "ask: sending conversation");

        let response = self.llm.complete(request).await?;
        let text = response
            .content
            .ok_or_else(|| LlmError::InvalidResponse("reply had no content".to_string()))?;

        self.conversation.push(Message::assistant(&text));
        info!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Answer received"
        );

        Ok(Turn::Reply {
            text,
            stop_reason: response.stop_reason,
        })
    }

    /// Run the read/send/print loop until the operator quits
    pub async fn run(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        while self.state == SessionState::AwaitingInput {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.as_str());
                    }

                    match self.handle_input(&line).await {
                        Ok(Turn::Quit) | Ok(Turn::Local) => {}
                        Ok(Turn::Reply { text, stop_reason }) => {
                            println!("{}", text);
                            if stop_reason == StopReason::MaxTokens {
                                println!("{}", "[Response truncated - max tokens reached]".yellow());
                            }
                            println!();
                        }
                        Err(e) => {
                            eprintln!("{} {}", "Error:".red(), e);
                            eprintln!("{}", "The question was not kept. Ask again, or type 'quit'.".dimmed());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D - same as quit
                    println!();
                    self.state = SessionState::Terminated;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Print help message
    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} End the session", QUIT_COMMAND.yellow());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} Show conversation history", "/history".yellow());
        println!("Anything else is sent to the model as a question.");
        println!();
    }

    /// Print conversation history
    fn print_history(&self) {
        println!();
        println!("{}", "Conversation History:".bright_cyan());
        for (i, msg) in self.conversation.messages().iter().enumerate() {
            let role = match msg.role {
                Role::System => "System".bright_magenta(),
                Role::User => "User".bright_green(),
                Role::Assistant => "Assistant".bright_blue(),
            };
            let preview: String = msg.content.chars().take(50).collect();
            let preview = if msg.content.chars().count() > 50 {
                format!("{}...", preview)
            } else {
                preview
            };
            println!("  {}. {}: {}", i + 1, role, preview);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::{MockLlmClient, reply};
    use crate::llm::{CompletionResponse, TokenUsage};

    fn seeded() -> Conversation {
        let mut conversation = Conversation::new();
        conversation.push(Message::system("Answer from the data only."));
        conversation.push(Message::user("Here is my research data: []"));
        conversation
    }

    fn session(llm: Arc<MockLlmClient>) -> ChatSession {
        ChatSession::new(llm, seeded(), None)
    }

    #[tokio::test]
    async fn test_quit_first_makes_no_calls() {
        for input in ["quit", "Quit", " quit ", "QUIT\n"] {
            let llm = Arc::new(MockLlmClient::replying(&[]));
            let mut session = session(llm.clone());

            assert_eq!(session.handle_input(input).await.unwrap(), Turn::Quit);
            assert_eq!(session.state(), SessionState::Terminated);
            assert_eq!(llm.call_count(), 0);
            assert_eq!(session.conversation(), &seeded());
        }
    }

    #[tokio::test]
    async fn test_input_after_quit_is_ignored() {
        let llm = Arc::new(MockLlmClient::replying(&["never"]));
        let mut session = session(llm.clone());

        session.handle_input("quit").await.unwrap();
        assert_eq!(session.handle_input("one more?").await.unwrap(), Turn::Quit);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_question_sends_full_history_and_records_reply() {
        let llm = Arc::new(MockLlmClient::replying(&["Mostly 1850.", "Folio 12."]));
        let mut session = session(llm.clone());

        let turn = session.handle_input("When were the baptisms?").await.unwrap();
        assert_eq!(
            turn,
            Turn::Reply {
                text: "Mostly 1850.".to_string(),
                stop_reason: StopReason::EndTurn
            }
        );

        session.handle_input("Where is it cited?").await.unwrap();

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].messages.len(), 3);
        assert_eq!(requests[0].messages[2], Message::user("When were the baptisms?"));
        // Second request carries the first exchange too
        assert_eq!(requests[1].messages.len(), 5);
        assert_eq!(requests[1].messages[3], Message::assistant("Mostly 1850."));

        assert_eq!(session.conversation().len(), 6);
        assert_eq!(session.conversation().role_counts(), (1, 3, 2));
        assert_eq!(session.state(), SessionState::AwaitingInput);
    }

    #[tokio::test]
    async fn test_question_is_recorded_as_typed() {
        let llm = Arc::new(MockLlmClient::replying(&["1850."]));
        let mut session = session(llm.clone());

        session.handle_input("  which year?\t").await.unwrap();

        assert_eq!(session.conversation().messages()[2], Message::user("  which year?\t"));
        assert_eq!(llm.requests()[0].messages[2].content, "  which year?\t");
    }

    #[tokio::test]
    async fn test_quit_is_not_a_substring_match() {
        let llm = Arc::new(MockLlmClient::replying(&["sure"]));
        let mut session = session(llm.clone());

        let turn = session.handle_input("quit smoking?").await.unwrap();
        assert!(matches!(turn, Turn::Reply { .. }));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_and_slash_commands_stay_local() {
        let llm = Arc::new(MockLlmClient::replying(&[]));
        let mut session = session(llm.clone());

        assert_eq!(session.handle_input("   ").await.unwrap(), Turn::Local);
        assert_eq!(session.handle_input("/history").await.unwrap(), Turn::Local);
        assert_eq!(session.handle_input("/help").await.unwrap(), Turn::Local);

        assert_eq!(llm.call_count(), 0);
        assert_eq!(session.conversation(), &seeded());
    }

    #[tokio::test]
    async fn test_failed_call_keeps_history_and_allows_retry() {
        let llm = Arc::new(MockLlmClient::new(vec![
            Err(LlmError::ApiError {
                status: 401,
                message: "bad key".to_string(),
            }),
            Ok(reply("Second time lucky.")),
        ]));
        let mut session = session(llm.clone());

        let err = session.handle_input("Anything?").await.unwrap_err();
        assert!(matches!(err, LlmError::ApiError { status: 401, .. }));
        assert_eq!(session.conversation(), &seeded());
        assert_eq!(session.state(), SessionState::AwaitingInput);

        let turn = session.handle_input("Anything?").await.unwrap();
        assert!(matches!(turn, Turn::Reply { text, .. } if text == "Second time lucky."));
        assert_eq!(session.conversation().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let llm = Arc::new(MockLlmClient::new(vec![Ok(CompletionResponse {
            content: None,
            stop_reason: StopReason::ContentFilter,
            usage: TokenUsage::default(),
        })]));
        let mut session = session(llm);

        let err = session.handle_input("Hmm?").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
        assert_eq!(session.conversation(), &seeded());
    }

    #[tokio::test]
    async fn test_max_tokens_is_forwarded() {
        let llm = Arc::new(MockLlmClient::replying(&["ok"]));
        let mut session = ChatSession::new(llm.clone(), seeded(), Some(256));

        session.handle_input("short answer please").await.unwrap();
        assert_eq!(llm.requests()[0].max_tokens, Some(256));
    }
}
