use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted login state, written to ~/.xdial/session.json after a
/// successful login and cleared on logout or auth failure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    pub username: String,
    pub role: String,
}

/// Path to the session file: ~/.xdial/session.json
pub fn session_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".xdial").join("session.json"))
}

impl Session {
    /// Load the saved session, if any. A missing file is not an error.
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&session_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session: {}", path.display()))?;
        let session: Session =
            serde_json::from_str(&content).with_context(|| "Failed to parse session.json")?;
        Ok(Some(session))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&session_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write session: {}", path.display()))?;
        Ok(())
    }
}

/// Delete the session file. Returns false if there was nothing to clear.
pub fn clear() -> Result<bool> {
    clear_at(&session_path()?)
}

pub fn clear_at(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)
        .with_context(|| format!("Failed to remove session: {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Session {
        Session {
            access_token: "tok-123".into(),
            user_id: "42".into(),
            username: "agent".into(),
            role: "client".into(),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".xdial").join("session.json");
        sample().save_to(&path).unwrap();
        let loaded = Session::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded.access_token, "tok-123");
        assert_eq!(loaded.username, "agent");
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        assert!(Session::load_from(&path).unwrap().is_none());
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        sample().save_to(&path).unwrap();
        assert!(clear_at(&path).unwrap());
        assert!(!clear_at(&path).unwrap());
        assert!(Session::load_from(&path).unwrap().is_none());
    }

    #[test]
    fn malformed_session_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Session::load_from(&path).is_err());
    }
}
