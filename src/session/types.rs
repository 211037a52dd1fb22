//! Session data types and identifier validation

use crate::error::{JarvisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum accepted length of a session identifier, in bytes
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Author of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human operator
    User,
    /// The assistant
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in a session
///
/// Messages carry no timestamp: their position in the session is the order
/// in which they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// Creates a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A conversation thread, also the on-disk record format
///
/// # Examples
///
/// ```
/// use jarvis::session::{Message, Session};
///
/// let session = Session {
///     session_id: "demo".to_string(),
///     messages: vec![Message::user("Hello"), Message::assistant("Good day.")],
/// };
/// let json = serde_json::to_string(&session).unwrap();
/// assert!(json.contains(r#""role":"user""#));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier
    pub session_id: String,
    /// Messages in the order they were appended
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Session {
    /// Create an empty session
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
        }
    }

    /// The most recent `max_turns` (user, assistant) pairs, oldest first
    ///
    /// A user message immediately followed by an assistant message forms a
    /// pair. Anything else (a trailing question, a user message whose reply
    /// failed) is skipped.
    pub fn history_window(&self, max_turns: usize) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut i = 0;
        while i + 1 < self.messages.len() {
            let (first, second) = (&self.messages[i], &self.messages[i + 1]);
            if first.role == Role::User && second.role == Role::Assistant {
                pairs.push((first.content.clone(), second.content.clone()));
                i += 2;
            } else {
                i += 1;
            }
        }

        let skip = pairs.len().saturating_sub(max_turns);
        pairs.split_off(skip)
    }
}

/// Validate a caller-supplied session identifier
///
/// The identifier becomes a file name, so it must be non-empty, no longer
/// than [`MAX_SESSION_ID_LEN`], and free of path separators, `..`
/// sequences and control characters.
///
/// # Examples
///
/// ```
/// use jarvis::session::validate_session_id;
///
/// assert!(validate_session_id("a1b2-c3").is_ok());
/// assert!(validate_session_id("../etc/passwd").is_err());
/// ```
///
/// # Errors
///
/// Returns `JarvisError::InvalidSessionId` describing the violation
pub fn validate_session_id(id: &str) -> Result<()> {
    let reason = if id.trim().is_empty() {
        Some("must not be empty".to_string())
    } else if id.len() > MAX_SESSION_ID_LEN {
        Some(format!("must be at most {} bytes", MAX_SESSION_ID_LEN))
    } else if id.contains("..") {
        Some("must not contain '..'".to_string())
    } else if id.contains('/') || id.contains('\\') {
        Some("must not contain path separators".to_string())
    } else if id.chars().any(|c| c.is_control()) {
        Some("must not contain control characters".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(JarvisError::InvalidSessionId(reason).into()),
        None => Ok(()),
    }
}
