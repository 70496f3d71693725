//! Session state persistence
//!
//! One JSON file per session under the state directory. A session owns the
//! form state being edited, its cache of catalog lookups, and the undo
//! history; nothing in it is shared with any other session.

use crate::config::ConfigManager;
use crate::error::{ForgeError, ForgeResult};
use crate::session::cache::SessionCache;
use crate::workflow::history::History;
use crate::workflow::FormState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

/// Session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session ID
    pub id: Uuid,

    /// Session name (doubles as the file stem)
    pub name: String,

    /// When session was created
    pub created_at: DateTime<Utc>,

    /// When session was last updated
    pub updated_at: DateTime<Utc>,

    /// Field values accumulated across the form pages
    #[serde(default)]
    pub form: FormState,

    /// Session-scoped lookup cache
    #[serde(default)]
    pub cache: SessionCache,

    /// Undo/redo history of document snapshots
    #[serde(default)]
    pub history: History,
}

impl Session {
    /// Create a new session with default form state
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            form: FormState::default(),
            cache: SessionCache::new(),
            history: History::default(),
        }
    }

    /// Get session file path
    pub fn file_path(&self) -> PathBuf {
        ConfigManager::sessions_dir().join(format!("{}.json", self.name))
    }

    /// Record the current document in history before a change is applied
    pub fn snapshot(&mut self) {
        let doc = self.form.to_doc();
        self.history.record(doc);
    }

    /// Load session from file
    pub async fn load(name: &str) -> ForgeResult<Option<Self>> {
        let path = ConfigManager::sessions_dir().join(format!("{}.json", name));

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| ForgeError::io(format!("reading session file {}", path.display()), e))?;

        let session: Session = serde_json::from_str(&content)
            .map_err(|e| ForgeError::SessionPersist(format!("{}: {}", path.display(), e)))?;
        Ok(Some(session))
    }

    /// Save session to file
    pub async fn save(&mut self) -> ForgeResult<()> {
        self.updated_at = Utc::now();
        let path = self.file_path();

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ForgeError::io("creating sessions directory", e))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)
            .await
            .map_err(|e| ForgeError::io(format!("writing session file {}", path.display()), e))?;

        Ok(())
    }

    /// Delete session file
    pub async fn delete(&self) -> ForgeResult<()> {
        let path = self.file_path();
        if path.exists() {
            fs::remove_file(&path).await.map_err(|e| {
                ForgeError::io(format!("deleting session file {}", path.display()), e)
            })?;
        }
        Ok(())
    }

    /// List all sessions
    pub async fn list_all() -> ForgeResult<Vec<Session>> {
        let sessions_dir = ConfigManager::sessions_dir();

        if !sessions_dir.exists() {
            return Ok(vec![]);
        }

        let mut sessions = vec![];
        let mut entries = fs::read_dir(&sessions_dir)
            .await
            .map_err(|e| ForgeError::io("reading sessions directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ForgeError::io("reading session entry", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let content = fs::read_to_string(&path).await.ok();
                if let Some(content) = content {
                    if let Ok(session) = serde_json::from_str::<Session>(&content) {
                        sessions.push(session);
                    }
                }
            }
        }

        // Sort by creation time, newest first
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(sessions)
    }
}
