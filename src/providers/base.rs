//! Base provider trait and common types for Jarvis
//!
//! This module defines the [`ChatProvider`] trait that every LLM backend
//! implements, along with the prompt structure handed to it.

use crate::credentials::Credential;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message structure sent to a chat completion API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use jarvis::providers::ChatMessage;
    ///
    /// let msg = ChatMessage::user("Hello, assistant!");
    /// assert_eq!(msg.role, "user");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A fully assembled prompt
///
/// The system message already carries personality, time, search results
/// and retrieved context. `history` holds prior (user, assistant) turns in
/// the order they happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    /// System message
    pub system: String,
    /// Prior conversation turns as (user, assistant) pairs
    pub history: Vec<(String, String)>,
    /// The new question
    pub question: String,
}

impl Prompt {
    /// Create a prompt
    pub fn new(
        system: impl Into<String>,
        history: Vec<(String, String)>,
        question: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            history,
            question: question.into(),
        }
    }

    /// Flatten into the wire message sequence
    ///
    /// Order is system message, then each history pair as user/assistant,
    /// then the question.
    ///
    /// # Examples
    ///
    /// ```
    /// use jarvis::providers::Prompt;
    ///
    /// let prompt = Prompt::new(
    ///     "You are Jarvis",
    ///     vec![("Hi".to_string(), "Hello.".to_string())],
    ///     "How are you?",
    /// );
    /// let messages = prompt.to_messages();
    /// assert_eq!(messages.len(), 4);
    /// assert_eq!(messages[0].role, "system");
    /// assert_eq!(messages[3].content, "How are you?");
    /// ```
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() * 2 + 2);
        messages.push(ChatMessage::system(self.system.clone()));
        for (user, assistant) in &self.history {
            messages.push(ChatMessage::user(user.clone()));
            messages.push(ChatMessage::assistant(assistant.clone()));
        }
        messages.push(ChatMessage::user(self.question.clone()));
        messages
    }
}

/// Chat completion provider
///
/// Implementations perform exactly one remote call per `complete`
/// invocation. Retries and credential rotation live in
/// [`crate::invoker::LlmInvoker`]. A quota or rate-limit response must be
/// reported as [`crate::error::JarvisError::RateLimited`] so it can be told
/// apart from other failures.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Generate a reply for `prompt` using `credential`
    async fn complete(&self, credential: &Credential, prompt: &Prompt) -> Result<String>;
}
