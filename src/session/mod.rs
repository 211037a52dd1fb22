//! Chat session storage
//!
//! Sessions live in memory for the life of the process and are mirrored to
//! one JSON file per session under the chats directory. A session that is
//! not resident is loaded lazily from disk the first time it is referenced.
//!
//! The in-memory map sits behind a single mutex that is never held across
//! an `.await`. Disk reads and writes work on snapshots.

pub mod types;

pub use types::{validate_session_id, Message, Role, Session, MAX_SESSION_ID_LEN};

use crate::error::{JarvisError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Session store backed by a directory of JSON records
pub struct SessionStore {
    dir: PathBuf,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    /// Create a store persisting into `dir`
    ///
    /// The directory is created on first write.
    ///
    /// # Examples
    ///
    /// ```
    /// use jarvis::session::SessionStore;
    ///
    /// let store = SessionStore::new("/tmp/jarvis-chats");
    /// assert_eq!(store.resident_count(), 0);
    /// ```
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Directory holding persisted records
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Return a usable session identifier
    ///
    /// A supplied identifier is validated and returned unchanged; otherwise
    /// a fresh UUID v4 is generated.
    ///
    /// # Errors
    ///
    /// Returns `JarvisError::InvalidSessionId` for an unsafe identifier
    pub fn resolve(&self, id: Option<&str>) -> Result<String> {
        match id {
            Some(id) => {
                validate_session_id(id)?;
                Ok(id.to_string())
            }
            None => Ok(Uuid::new_v4().to_string()),
        }
    }

    /// Load a session, from memory, then disk, else empty
    ///
    /// The session becomes resident. An unreadable or corrupt record is
    /// logged and treated as an empty session.
    ///
    /// # Errors
    ///
    /// Fails only when `id` is not a valid session identifier
    pub async fn load(&self, id: &str) -> Result<Session> {
        validate_session_id(id)?;

        if let Some(session) = self.sessions().get(id) {
            return Ok(session.clone());
        }

        let from_disk = self.read_record(id).await;
        let mut sessions = self.sessions();
        let session = sessions
            .entry(id.to_string())
            .or_insert_with(|| from_disk.unwrap_or_else(|| Session::new(id)));
        Ok(session.clone())
    }

    /// Read a session without making it resident
    ///
    /// Used by history lookups, which must not create sessions as a side
    /// effect. Unknown sessions come back empty.
    ///
    /// # Errors
    ///
    /// Fails only when `id` is not a valid session identifier
    pub async fn snapshot(&self, id: &str) -> Result<Session> {
        validate_session_id(id)?;

        if let Some(session) = self.sessions().get(id) {
            return Ok(session.clone());
        }
        Ok(self
            .read_record(id)
            .await
            .unwrap_or_else(|| Session::new(id)))
    }

    async fn read_record(&self, id: &str) -> Option<Session> {
        let path = self.record_path(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Could not read session file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice::<Session>(&bytes) {
            Ok(mut session) => {
                tracing::debug!(
                    "Loaded session {} from disk ({} messages)",
                    id,
                    session.messages.len()
                );
                session.session_id = id.to_string();
                Some(session)
            }
            Err(e) => {
                tracing::warn!("Could not parse session file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Append one message to a session
    ///
    /// Call [`SessionStore::load`] first so that a persisted history is not
    /// shadowed by a fresh empty session.
    pub fn append(&self, id: &str, role: Role, content: impl Into<String>) {
        self.sessions()
            .entry(id.to_string())
            .or_insert_with(|| Session::new(id))
            .messages
            .push(Message {
                role,
                content: content.into(),
            });
    }

    /// All resident messages for a session (empty if unknown)
    pub fn messages(&self, id: &str) -> Vec<Message> {
        self.sessions()
            .get(id)
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    /// The most recent `max_turns` (user, assistant) pairs of a session
    pub fn history_window(&self, id: &str, max_turns: usize) -> Vec<(String, String)> {
        self.sessions()
            .get(id)
            .map(|s| s.history_window(max_turns))
            .unwrap_or_default()
    }

    /// Number of sessions held in memory
    pub fn resident_count(&self) -> usize {
        self.sessions().len()
    }

    /// Write the full session to disk, replacing any earlier record
    ///
    /// The record is written to a temporary file and renamed into place,
    /// so concurrent writers never leave a torn file; the last rename wins.
    /// Persisting a session that is not resident is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `JarvisError::Storage` when the directory, file or rename fails
    pub async fn persist(&self, id: &str) -> Result<()> {
        let snapshot = match self.sessions().get(id) {
            Some(session) => session.clone(),
            None => return Ok(()),
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            JarvisError::Storage(format!(
                "Failed to create chats directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| JarvisError::Storage(format!("Serialization failed: {}", e)))?;

        let path = self.record_path(id);
        let tmp = self
            .dir
            .join(format!("{}.json.{}.tmp", id, Uuid::new_v4().simple()));

        tokio::fs::write(&tmp, &json).await.map_err(|e| {
            JarvisError::Storage(format!("Failed to write {}: {}", tmp.display(), e))
        })?;

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(JarvisError::Storage(format!(
                "Failed to replace {}: {}",
                path.display(),
                e
            ))
            .into());
        }

        tracing::debug!(
            "Persisted session {} ({} messages)",
            id,
            snapshot.messages.len()
        );
        Ok(())
    }

    /// Persist every resident session
    ///
    /// Failures are logged per session; the count of successful writes is
    /// returned.
    pub async fn persist_all(&self) -> usize {
        let ids: Vec<String> = self.sessions().keys().cloned().collect();
        let mut saved = 0;
        for id in ids {
            match self.persist(&id).await {
                Ok(()) => saved += 1,
                Err(e) => tracing::error!("Failed to persist session {}: {}", id, e),
            }
        }
        saved
    }
}
