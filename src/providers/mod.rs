//! Provider module for Jarvis
//!
//! This module contains the LLM provider abstraction and the Groq
//! implementation used by the invoker.

pub mod base;
pub mod groq;

pub use base::{ChatMessage, ChatProvider, Prompt};
pub use groq::GroqProvider;

use crate::config::LlmConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the chat provider described by the configuration
///
/// # Errors
///
/// Returns error if provider initialization fails
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn ChatProvider>> {
    Ok(Arc::new(GroqProvider::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_default() {
        let provider = create_provider(&LlmConfig::default()).unwrap();
        assert_eq!(provider.name(), "groq");
    }
}
