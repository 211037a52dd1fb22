//! Jarvis - personal assistant backend library
//!
//! Accepts user messages, augments them with context retrieved from a local
//! vector index and (on the realtime path) live web search results, and
//! forwards them to a hosted LLM through a rotating pool of API keys.
//!
//! # Architecture
//!
//! - `session`: per-session history, persisted as one JSON file per session
//! - `retrieval`: corpus loading, chunking, embedding and the vector index
//! - `credentials` / `invoker`: the key pool and the shared rotation cursor
//! - `retry`: bounded exponential backoff for every remote call
//! - `search`: best-effort web search for realtime requests
//! - `orchestrator`: the per-request pipeline for both chat paths
//! - `server`: the axum HTTP surface
//! - `config` / `error` / `cli`: configuration, error types, command line
//!
//! # Example
//!
//! ```no_run
//! use jarvis::{AppContext, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     let ctx = AppContext::startup(config).await?;
//!     let reply = ctx.chat.chat(None, "Good morning").await?;
//!     println!("{} ({})", reply.response, reply.session_id);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod invoker;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod retrieval;
pub mod retry;
pub mod search;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use context::AppContext;
pub use error::{JarvisError, Result};
pub use orchestrator::{ChatReply, ChatService, ChatSettings};
