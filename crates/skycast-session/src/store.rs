//! File-based storage for the persisted session record.
//!
//! One JSON file under the config directory; this type is the only reader
//! and writer of that file.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use skycast_api::UserSession;

const SESSION_FILE: &str = "session.json";

/// Storage for the `{sessionId, city}` record.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(SESSION_FILE),
        }
    }

    /// Read the stored session record.
    ///
    /// A missing file means no session yet. A corrupted or unparsable record
    /// is treated the same way: the caller re-bootstraps instead of crashing.
    pub fn load(&self) -> Option<UserSession> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read session record: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("Discarding corrupted session record: {}", e);
                None
            }
        }
    }

    /// Persist the session record. Called once per device lifetime, at
    /// bootstrap.
    pub fn save(&self, session: &UserSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let json = serde_json::to_string_pretty(session)
            .context("Failed to serialize session record")?;

        fs::write(&self.path, &json).context("Failed to write session record")?;

        tracing::info!("Stored session record at {:?}", self.path);
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session() -> UserSession {
        UserSession {
            session_id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            city: "Coimbatore".to_string(),
        }
    }

    #[test]
    fn test_missing_record_is_none() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        assert!(store.load().is_none());
        assert!(!store.exists());
    }

    #[test]
    fn test_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());

        store.save(&session()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, session());
        assert!(store.exists());
    }

    #[test]
    fn test_corrupted_record_is_treated_as_absent() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());

        std::fs::write(dir.path().join("session.json"), "{not json").unwrap();

        assert!(store.load().is_none());
    }

    #[test]
    fn test_record_uses_wire_field_names() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());

        store.save(&session()).unwrap();
        let raw = std::fs::read_to_string(dir.path().join("session.json")).unwrap();

        assert!(raw.contains("sessionId"));
        assert!(raw.contains("city"));
    }
}
