use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const DEFAULT_PLAYER_COMMAND: &str = "mpv";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub backend_url: Option<String>,
    pub player_command: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            backend_url: None,
            player_command: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Not called anywhere yet; the file is hand-edited for now.
    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Backend origin: `LECTURE_CHAT_URL` env var first, then the config
    /// file, then the development default.
    pub fn resolved_backend_url(&self) -> String {
        std::env::var("LECTURE_CHAT_URL")
            .ok()
            .or_else(|| self.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    /// Command used for timestamp jumps into the local video file.
    pub fn resolved_player_command(&self) -> String {
        self.player_command
            .clone()
            .unwrap_or_else(|| DEFAULT_PLAYER_COMMAND.to_string())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("lecture-chat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.backend_url.is_none());
        assert_eq!(config.resolved_player_command(), "mpv");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.backend_url = Some("http://example.com:9000".to_string());
        config.player_command = Some("vlc".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.backend_url.as_deref(), Some("http://example.com:9000"));
        assert_eq!(loaded.resolved_player_command(), "vlc");
    }

    // Single test so the env var mutation cannot race a parallel assertion.
    #[test]
    fn test_backend_url_resolution_order() {
        let mut config = Config::new();
        config.backend_url = Some("http://lectures.internal:8000".to_string());
        assert_eq!(config.resolved_backend_url(), "http://lectures.internal:8000");

        std::env::set_var("LECTURE_CHAT_URL", "http://override.internal:9000");
        assert_eq!(config.resolved_backend_url(), "http://override.internal:9000");
        std::env::remove_var("LECTURE_CHAT_URL");

        assert_eq!(Config::new().resolved_backend_url(), DEFAULT_BACKEND_URL);
    }
}
