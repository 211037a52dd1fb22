//! Request orchestration for the plain and realtime chat paths
//!
//! Each request runs: resolve session, load it, append the user turn,
//! retrieve context, optionally search, build the system message, invoke
//! the model with the bounded history window, append the reply and
//! persist. Both paths share one session store and one invoker, so a
//! caller can alternate between them inside a single session.

use crate::config::Config;
use crate::error::{JarvisError, Result};
use crate::invoker::LlmInvoker;
use crate::prompts::{build_system_message, time_information};
use crate::retrieval::ContextRetriever;
use crate::search::SearchAugmenter;
use crate::session::{Role, Session, SessionStore};

use std::sync::Arc;

/// Reply to one chat request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Assistant reply text
    pub response: String,
    /// Session the exchange was recorded in
    pub session_id: String,
}

/// Per-request limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatSettings {
    /// Context chunks retrieved per request
    pub retrieval_k: usize,
    /// History pairs sent to the model
    pub max_history_turns: usize,
    /// Maximum message length in characters
    pub max_message_length: usize,
    /// Search hits folded into a realtime prompt
    pub search_max_results: usize,
}

impl ChatSettings {
    /// Extract the request limits from the configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            retrieval_k: config.retrieval.k,
            max_history_turns: config.chat.max_history_turns,
            max_message_length: config.chat.max_message_length,
            search_max_results: config.search.max_results,
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatPath {
    Plain,
    Realtime,
}

/// Composes session storage, retrieval, search and invocation
pub struct ChatService {
    sessions: Arc<SessionStore>,
    retriever: ContextRetriever,
    search: SearchAugmenter,
    invoker: Arc<LlmInvoker>,
    persona: String,
    settings: ChatSettings,
}

impl ChatService {
    /// Creates a new chat service
    pub fn new(
        sessions: Arc<SessionStore>,
        retriever: ContextRetriever,
        search: SearchAugmenter,
        invoker: Arc<LlmInvoker>,
        persona: impl Into<String>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            sessions,
            retriever,
            search,
            invoker,
            persona: persona.into(),
            settings,
        }
    }

    /// The shared session store
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// The shared invoker
    pub fn invoker(&self) -> &Arc<LlmInvoker> {
        &self.invoker
    }

    /// Whether realtime requests will include live search results
    pub fn search_enabled(&self) -> bool {
        self.search.is_enabled()
    }

    /// Check a message against the accepted length bounds
    ///
    /// # Errors
    ///
    /// Returns `JarvisError::InvalidMessage` for an empty or oversized message
    pub fn validate_message(&self, message: &str) -> Result<()> {
        let length = message.chars().count();
        if length == 0 {
            return Err(JarvisError::InvalidMessage("message must not be empty".to_string()).into());
        }
        if length > self.settings.max_message_length {
            return Err(JarvisError::InvalidMessage(format!(
                "message must be at most {} characters (got {})",
                self.settings.max_message_length, length
            ))
            .into());
        }
        Ok(())
    }

    /// Plain chat: retrieved context only, no web search
    ///
    /// # Errors
    ///
    /// Returns an input error for a bad session id or message, or the
    /// invoker's error when no credential produced a reply
    pub async fn chat(&self, session_id: Option<&str>, message: &str) -> Result<ChatReply> {
        self.respond(session_id, message, ChatPath::Plain).await
    }

    /// Realtime chat: web search results are added ahead of the context
    ///
    /// # Errors
    ///
    /// Same as [`ChatService::chat`]; search failures are never reported
    pub async fn chat_realtime(&self, session_id: Option<&str>, message: &str) -> Result<ChatReply> {
        self.respond(session_id, message, ChatPath::Realtime).await
    }

    async fn respond(
        &self,
        session_id: Option<&str>,
        message: &str,
        path: ChatPath,
    ) -> Result<ChatReply> {
        self.validate_message(message)?;
        let session_id = self.sessions.resolve(session_id)?;
        self.sessions.load(&session_id).await?;
        self.sessions.append(&session_id, Role::User, message);

        let context = self.retrieve_context(message).await;
        let search_results = match path {
            ChatPath::Plain => String::new(),
            ChatPath::Realtime => {
                self.search
                    .augment(message, self.settings.search_max_results)
                    .await
            }
        };

        let system = build_system_message(
            &self.persona,
            &time_information(),
            &search_results,
            &context,
        );
        let history = self
            .sessions
            .history_window(&session_id, self.settings.max_history_turns);

        tracing::info!(
            "Processing {} message for session {} ({} history turns, search {})",
            match path {
                ChatPath::Plain => "plain",
                ChatPath::Realtime => "realtime",
            },
            session_id,
            history.len(),
            if search_results.is_empty() { "empty" } else { "included" }
        );

        let response = self.invoker.invoke(&system, history, message).await?;
        self.sessions
            .append(&session_id, Role::Assistant, response.clone());

        if let Err(e) = self.sessions.persist(&session_id).await {
            tracing::error!("Failed to save session {}: {}", session_id, e);
        }

        Ok(ChatReply {
            response,
            session_id,
        })
    }

    async fn retrieve_context(&self, query: &str) -> String {
        match self.retriever.retrieve(query, self.settings.retrieval_k).await {
            Ok(chunks) => chunks.join("\n"),
            Err(e) => {
                tracing::warn!("Vector store retrieval failed, using empty context: {}", e);
                String::new()
            }
        }
    }

    /// Full history of a session, without creating it
    ///
    /// # Errors
    ///
    /// Returns `JarvisError::InvalidSessionId` for an unsafe identifier
    pub async fn history(&self, session_id: &str) -> Result<Session> {
        self.sessions.snapshot(session_id).await
    }

    /// Persist every resident session; returns how many were written
    pub async fn save_all(&self) -> usize {
        self.sessions.persist_all().await
    }
}
