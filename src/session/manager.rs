//! Session lifecycle management

use crate::config::ConfigManager;
use crate::error::{ForgeError, ForgeResult};
use crate::session::state::Session;
use chrono::{Duration, Utc};
use tracing::{debug, info};

/// Session manager handles session CRUD and cleanup
pub struct SessionManager;

impl SessionManager {
    /// Create a new session manager
    pub async fn new() -> ForgeResult<Self> {
        // Ensure state directories exist
        ConfigManager::ensure_state_dirs().await?;
        Ok(Self)
    }

    /// Load a session by name, creating a fresh one if none exists
    pub async fn open_or_create(&self, name: &str) -> ForgeResult<Session> {
        if let Some(session) = Session::load(name).await? {
            debug!("Loaded session: {}", name);
            return Ok(session);
        }

        let mut session = Session::new(name);
        session.save().await?;
        info!("Created session: {}", name);
        Ok(session)
    }

    /// Get a session by name
    pub async fn get(&self, name: &str) -> ForgeResult<Option<Session>> {
        Session::load(name).await
    }

    /// List all sessions
    pub async fn list(&self) -> ForgeResult<Vec<Session>> {
        Session::list_all().await
    }

    /// Clear every cached lookup for a session
    ///
    /// The page-refresh analog: form state and history survive, cached
    /// catalog lookups do not.
    pub async fn refresh(&self, name: &str) -> ForgeResult<usize> {
        let mut session = self
            .get(name)
            .await?
            .ok_or_else(|| ForgeError::SessionNotFound(name.to_string()))?;

        let dropped = session.cache.len();
        session.cache.clear();
        session.save().await?;

        info!("Refreshed session {} ({} cache entries dropped)", name, dropped);
        Ok(dropped)
    }

    /// Delete a session
    pub async fn delete(&self, name: &str) -> ForgeResult<()> {
        let session = self
            .get(name)
            .await?
            .ok_or_else(|| ForgeError::SessionNotFound(name.to_string()))?;

        session.delete().await?;
        info!("Deleted session: {}", name);
        Ok(())
    }

    /// Clean up sessions untouched for longer than the given age
    pub async fn cleanup(&self, max_age_hours: u32) -> ForgeResult<u32> {
        if max_age_hours == 0 {
            return Ok(0);
        }

        let cutoff = Utc::now() - Duration::hours(max_age_hours as i64);
        let sessions = self.list().await?;
        let mut cleaned = 0;

        for session in sessions {
            if session.updated_at < cutoff {
                session.delete().await?;
                cleaned += 1;
                info!("Cleaned up old session: {}", session.name);
            }
        }

        Ok(cleaned)
    }
}
