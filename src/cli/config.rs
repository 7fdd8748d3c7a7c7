use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::list_state::ListState;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api";

const STATE_FILE: &str = "state.json";

/// Everything `towerctl` remembers between invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CliState {
    pub server_url: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub list: ListState,
}

impl Default for CliState {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            username: None,
            list: ListState::default(),
        }
    }
}

impl CliState {
    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let file = dir.join(STATE_FILE);
        if !file.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(file)?;
        let state: CliState = serde_json::from_str(&content)?;
        Ok(state)
    }

    pub fn save_to(&self, dir: &Path) -> anyhow::Result<()> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(STATE_FILE), content)?;
        Ok(())
    }

    /// Forget the session token; list state and server URL are kept.
    pub fn clear_session(&mut self) {
        self.token = None;
        self.username = None;
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(custom_dir) = std::env::var("TOWERCTL_CONFIG_DIR") {
        return Ok(PathBuf::from(custom_dir));
    }
    let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
    Ok(PathBuf::from(home).join(".config").join("towerctl"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let state = CliState::load_from(dir.path()).unwrap();
        assert_eq!(state, CliState::default());
        assert_eq!(state.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn saves_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");

        let mut state = CliState::default();
        state.token = Some("abc".to_string());
        state.list.toggle(Uuid::new_v4());
        state.save_to(&nested).unwrap();

        let loaded = CliState::load_from(&nested).unwrap();
        assert_eq!(loaded, state);

        let mut cleared = loaded;
        cleared.clear_session();
        assert!(cleared.token.is_none());
        assert_eq!(cleared.list.selected.len(), 1);
    }
}
