//! Configuration management

use crate::speech::TargetLanguage;
use crate::{LitroError, Result};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration for the TTS client
///
/// Persists the backend location and the target language the voice
/// heuristics are tuned for.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.litro.cfg)
    path: PathBuf,
}

impl Config {
    /// Load configuration from disk or create default
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| LitroError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| LitroError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| LitroError::Config(format!("Failed to save config: {}", e)))
    }

    /// Get config file path (~/.litro.cfg)
    fn config_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".litro.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("server"))
            .set("url", "http://127.0.0.1:5000")
            .set("timeout", "0");

        ini.with_section(Some("language"))
            .set("code", "ta")
            .set("name", "Tamil")
            .set("tag", "ta-IN");

        ini
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    // Client-specific configuration getters

    /// Base URL of the TTS backend
    pub fn server_url(&self) -> String {
        self.get_string("server", "url", "http://127.0.0.1:5000")
    }

    /// Request timeout; zero or unset means wait indefinitely
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.get_int("server", "timeout", 0) {
            secs if secs > 0 => Some(Duration::from_secs(secs as u64)),
            _ => None,
        }
    }

    /// Language the voice-matching heuristics are tuned for
    pub fn language(&self) -> TargetLanguage {
        let default = TargetLanguage::default();
        TargetLanguage {
            code: self.get_string("language", "code", &default.code),
            name: self.get_string("language", "name", &default.name),
            tag: self.get_string("language", "tag", &default.tag),
        }
    }
}
