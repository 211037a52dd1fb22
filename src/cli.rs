//! Command-line interface definition for Jarvis
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands to run the API server and inspect stored sessions.

use clap::{Parser, Subcommand};

/// Jarvis - personal assistant backend
///
/// Serves retrieval-augmented chat over HTTP, rotating through a pool of
/// LLM API keys, with optional realtime web search.
#[derive(Parser, Debug, Clone)]
#[command(name = "jarvis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Jarvis
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show stored chat sessions
    ///
    /// Without a session id, lists every persisted session.
    History {
        /// Session to print in full
        session_id: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Serve {
                host: None,
                port: None,
            },
        }
    }
}
