//! Corpus loading for the vector index
//!
//! Two sources feed the index: plain-text notes under `learning_data/`
//! and persisted chat sessions under `chats_data/`. Files that cannot be
//! read or parsed are logged and skipped; loading itself never fails.

use crate::retrieval::index::Document;
use crate::session::{Role, Session};

use std::path::{Path, PathBuf};

/// Files in `dir` with the given extension, sorted by path
///
/// `dir` is escaped, so glob metacharacters in the data directory name are
/// matched literally.
pub(crate) fn matching_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped).join(format!("*.{}", extension));
    let pattern = pattern.to_string_lossy();
    match glob::glob(&pattern) {
        Ok(paths) => {
            let mut files: Vec<PathBuf> = paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable path: {}", e);
                        None
                    }
                })
                .filter(|path| path.is_file())
                .collect();
            files.sort();
            files
        }
        Err(e) => {
            tracing::warn!("Invalid corpus pattern {}: {}", pattern, e);
            Vec::new()
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Load every non-empty `*.txt` file in `dir`, one document per file
pub fn load_learning_documents(dir: &Path) -> Vec<Document> {
    let mut documents = Vec::new();
    for path in matching_files(dir, "txt") {
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let content = content.trim();
                if !content.is_empty() {
                    documents.push(Document::new(content, file_label(&path)));
                }
            }
            Err(e) => {
                tracing::warn!("Could not load learning data file {}: {}", path.display(), e);
            }
        }
    }
    documents
}

/// Render a session as `User: ...` / `Assistant: ...` lines
pub fn render_session(session: &Session) -> String {
    session
        .messages
        .iter()
        .map(|m| match m.role {
            Role::User => format!("User: {}", m.content),
            Role::Assistant => format!("Assistant: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Load every persisted session in `dir`, one document per session
pub fn load_chat_documents(dir: &Path) -> Vec<Document> {
    let mut documents = Vec::new();
    for path in matching_files(dir, "json") {
        let parsed = std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str::<Session>(&raw).map_err(anyhow::Error::from));

        match parsed {
            Ok(session) => {
                let content = render_session(&session);
                if !content.trim().is_empty() {
                    let stem = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    documents.push(Document::new(content, format!("chat_{}", stem)));
                }
            }
            Err(e) => {
                tracing::warn!("Could not load chat history file {}: {}", path.display(), e);
            }
        }
    }
    documents
}

/// Load learning data followed by chat history
pub fn load_corpus(learning_dir: &Path, chats_dir: &Path) -> Vec<Document> {
    let mut documents = load_learning_documents(learning_dir);
    let learning = documents.len();
    documents.extend(load_chat_documents(chats_dir));
    tracing::info!(
        "Loaded corpus: {} learning files, {} chat sessions",
        learning,
        documents.len() - learning
    );
    documents
}
