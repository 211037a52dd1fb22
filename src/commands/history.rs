use crate::config::Config;
use crate::error::Result;
use crate::retrieval::loader::matching_files;
use crate::session::{Role, Session, SessionStore};
use colored::Colorize;
use prettytable::{format, Table};
use std::path::Path;

/// One row of the session listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Session identifier
    pub session_id: String,
    /// Number of stored messages
    pub message_count: usize,
    /// Single-line preview of the newest message
    pub last_message: String,
}

fn preview(text: &str, max_chars: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() > max_chars {
        let cut: String = single_line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        single_line
    }
}

/// Summaries of every readable session record in `chats_dir`
pub fn session_summaries(chats_dir: &Path) -> Vec<SessionSummary> {
    matching_files(chats_dir, "json")
        .into_iter()
        .filter_map(|path| {
            let raw = std::fs::read_to_string(&path).ok()?;
            match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(SessionSummary {
                    last_message: session
                        .messages
                        .last()
                        .map(|m| preview(&m.content, 50))
                        .unwrap_or_default(),
                    message_count: session.messages.len(),
                    session_id: session.session_id,
                }),
                Err(e) => {
                    tracing::warn!("Skipping unreadable session {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect()
}

fn print_listing(chats_dir: &Path) {
    let summaries = session_summaries(chats_dir);
    if summaries.is_empty() {
        println!("{}", "No conversation history found.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "Session".bold(),
        "Messages".bold(),
        "Last Message".bold()
    ]);
    for summary in summaries {
        table.add_row(prettytable::row![
            summary.session_id.cyan(),
            summary.message_count,
            summary.last_message
        ]);
    }

    println!("\nConversation History:");
    table.printstd();
    println!();
    println!(
        "Use {} to print a session.",
        "jarvis history <SESSION_ID>".cyan()
    );
    println!();
}

fn print_session(session: &Session, assistant_name: &str) {
    if session.messages.is_empty() {
        println!(
            "{}",
            format!("No messages found for session {}.", session.session_id).yellow()
        );
        return;
    }

    println!("\nSession {}\n", session.session_id.cyan());
    for message in &session.messages {
        let speaker = match message.role {
            Role::User => "You".bold().cyan(),
            Role::Assistant => assistant_name.bold().green(),
        };
        println!("{}: {}\n", speaker, message.content);
    }
}

/// Handle the history command
///
/// # Errors
///
/// Returns `JarvisError::InvalidSessionId` for an unsafe session id
pub async fn handle_history(config: &Config, session_id: Option<String>) -> Result<()> {
    let chats_dir = config.storage.chats_data_dir();
    match session_id {
        None => print_listing(&chats_dir),
        Some(id) => {
            let store = SessionStore::new(&chats_dir);
            let session = store.snapshot(&id).await?;
            print_session(&session, &config.assistant.name);
        }
    }
    Ok(())
}
