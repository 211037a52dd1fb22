//! Credential rotation and LLM invocation
//!
//! [`LlmInvoker`] owns the credential pool and the single process-wide
//! rotation cursor. Both the plain and the realtime chat paths call the same
//! invoker, so their requests interleave through one rotation sequence.
//!
//! Each credential gets a full retry sequence (see [`crate::retry`]). When
//! that sequence fails the invoker moves to the next credential, until every
//! credential in the pool has been tried once.

use crate::credentials::CredentialPool;
use crate::error::{is_rate_limit_error, JarvisError, Result};
use crate::providers::{ChatProvider, Prompt};
use crate::retry::{with_retry, RetryPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Multi-credential LLM invoker
pub struct LlmInvoker {
    provider: Arc<dyn ChatProvider>,
    pool: CredentialPool,
    cursor: AtomicUsize,
    retry: RetryPolicy,
}

impl LlmInvoker {
    /// Create an invoker with the cursor at the first credential
    pub fn new(provider: Arc<dyn ChatProvider>, pool: CredentialPool, retry: RetryPolicy) -> Self {
        tracing::info!(
            "LLM invoker ready: provider={}, credentials={}",
            provider.name(),
            pool.len()
        );
        Self {
            provider,
            pool,
            cursor: AtomicUsize::new(0),
            retry,
        }
    }

    /// Current cursor position, always below the pool size
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Number of credentials in the pool
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Advance the cursor by one (mod pool size) and return the prior value
    fn advance_cursor(&self) -> usize {
        let size = self.pool.len();
        self.cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| Some((c + 1) % size))
            .unwrap_or_else(|prev| prev)
    }

    /// Generate a reply, rotating through the credential pool on failure
    ///
    /// # Arguments
    ///
    /// * `system` - Fully assembled system message
    /// * `history` - Prior (user, assistant) turns, oldest first
    /// * `question` - The new user message
    ///
    /// # Errors
    ///
    /// Returns `JarvisError::CapacityExceeded` when every credential failed
    pub async fn invoke(
        &self,
        system: &str,
        history: Vec<(String, String)>,
        question: &str,
    ) -> Result<String> {
        let prompt = Prompt::new(system, history, question);
        let size = self.pool.len();
        let start = self.advance_cursor();

        let mut rate_limited = false;
        let mut last_error: Option<anyhow::Error> = None;

        for attempt in 0..size {
            if attempt > 0 {
                self.advance_cursor();
            }
            let index = (start + attempt) % size;
            let credential = self.pool.get(index);

            tracing::info!(
                "Using {} API key #{}/{} ({})",
                self.provider.name(),
                index + 1,
                size,
                credential.masked()
            );

            let label = format!("{} key #{}", self.provider.name(), index + 1);
            let result = with_retry(&self.retry, &label, || {
                self.provider.complete(credential, &prompt)
            })
            .await;

            match result {
                Ok(text) => return Ok(text),
                Err(err) => {
                    let limited = is_rate_limit_error(&err);
                    rate_limited |= limited;
                    tracing::warn!(
                        "{} API key #{} ({}) failed{}: {}",
                        self.provider.name(),
                        index + 1,
                        credential.masked(),
                        if limited { " (rate limited)" } else { "" },
                        err
                    );
                    last_error = Some(err);
                }
            }
        }

        let last_error = last_error.map(|e| e.to_string()).unwrap_or_default();
        tracing::error!(
            "All {} {} API keys failed; last error: {}",
            size,
            self.provider.name(),
            last_error
        );
        Err(JarvisError::CapacityExceeded {
            attempts: size,
            rate_limited,
            last_error,
        }
        .into())
    }
}
