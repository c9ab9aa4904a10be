//! Configuration management for studyhub

pub mod tutor;

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::theme::Theme;
pub use tutor::TutorSettings;

/// Session id used when none is given
pub const DEFAULT_SESSION: &str = "default";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Selected theme name
    pub theme: String,

    /// Question bank file (defaults to `questions.json` in the data directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_path: Option<PathBuf>,

    /// Quiz session id used when none is given on the command line
    #[serde(default = "default_session")]
    pub default_session: String,

    /// AI tutor connection settings
    #[serde(default)]
    pub tutor: TutorSettings,
}

fn default_session() -> String {
    DEFAULT_SESSION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "Tokyo Night".to_string(),
            bank_path: None,
            default_session: default_session(),
            tutor: TutorSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    ///
    /// Environment overrides for the tutor are applied after loading and are
    /// never written back.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            serde_json::from_str::<Self>(&contents)
                .with_context(|| "Failed to parse config.json")?
        } else {
            let config = Self::default();
            config.save()?;
            config
        };

        config.tutor.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "studyhub").context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "studyhub").context("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Question bank location, explicit or default
    pub fn bank_path(&self) -> Result<PathBuf> {
        match &self.bank_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("questions.json")),
        }
    }

    /// Get the active theme
    pub fn active_theme(&self) -> Theme {
        Theme::by_name(&self.theme).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_tokyo_night_theme() {
        let config = Config::default();
        assert_eq!(config.theme, "Tokyo Night");
    }

    #[test]
    fn default_session_id() {
        assert_eq!(Config::default().default_session, "default");
    }

    #[test]
    fn explicit_bank_path_wins() {
        let config = Config { bank_path: Some(PathBuf::from("/tmp/bank.json")), ..Config::default() };
        assert_eq!(config.bank_path().unwrap(), PathBuf::from("/tmp/bank.json"));
    }

    #[test]
    fn config_serializes_to_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("Tokyo Night"));
        assert!(!json.contains("bank_path"));
    }

    #[test]
    fn minimal_config_deserializes() {
        let json = r#"{"theme":"Custom"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.theme, "Custom");
        assert_eq!(config.default_session, "default");
        assert!(config.tutor.endpoint.is_none());
    }

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let config = Config { theme: "Solarized".into(), ..Config::default() };
        assert_eq!(config.active_theme().name, "Tokyo Night");
    }
}
