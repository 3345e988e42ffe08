use anyhow::{Context, Result};
use dirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ThemeColors {
    pub accent: String,
    pub open: String,
    pub comment: String,
    pub ip: String,
    pub host: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            accent: "green".to_string(),
            open: "lightgreen".to_string(),
            comment: "darkgray".to_string(),
            ip: "cyan".to_string(),
            host: "yellow".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the zhost server.
    pub server_url: String,
    pub new_host_name: String,
    pub new_host_content: String,
    pub log_dir: String,
    pub theme: ThemeColors,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".to_string(),
            new_host_name: "new host".to_string(),
            new_host_content: "www.demo.com 127.0.0.1".to_string(),
            log_dir: "logs".to_string(),
            theme: ThemeColors::default(),
        }
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("zhost");
        Self::with_dir(config_dir)
    }

    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        }

        let config_file = config_dir.join("zhost.toml");

        Ok(Self {
            config_dir,
            config_file,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        // If config file doesn't exist, create it with default values
        if !self.config_file.exists() {
            let default_config = AppConfig::default();
            self.save_config(&default_config)?;
        }

        let content: String =
            fs::read_to_string(&self.config_file).context("Failed to read config file")?;

        let mut config: AppConfig =
            toml::from_str(&content).context("Failed to parse config file")?;

        if config.server_url.trim().is_empty() {
            tracing::warn!("Empty server_url in config, using the default");
            config.server_url = AppConfig::default().server_url;
        }
        config.server_url = config.server_url.trim_end_matches('/').to_string();

        Ok(config)
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_file, toml).context("Failed to write config file")?;
        Ok(())
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path().join("zhost")).unwrap();
        assert!(manager.config_dir().exists());

        let config = manager.load_config().unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(manager.get_config_path().exists());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path()).unwrap();
        fs::write(
            manager.get_config_path(),
            "server_url = \"http://10.0.0.2:3000/\"\n[theme]\nip = \"magenta\"\n",
        )
        .unwrap();

        let config = manager.load_config().unwrap();
        assert_eq!(config.server_url, "http://10.0.0.2:3000");
        assert_eq!(config.theme.ip, "magenta");
        assert_eq!(config.theme.host, "yellow");
        assert_eq!(config.new_host_content, "www.demo.com 127.0.0.1");
    }

    #[test]
    fn blank_server_url_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path()).unwrap();
        fs::write(manager.get_config_path(), "server_url = \"  \"\n").unwrap();
        assert_eq!(manager.load_config().unwrap().server_url, "http://localhost:3000");
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path()).unwrap();
        fs::write(manager.get_config_path(), "server_url = [").unwrap();
        assert!(manager.load_config().is_err());
    }
}
