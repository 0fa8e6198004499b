//! Configuration module for plugup.
//!
//! Handles loading and parsing the .pluguprc configuration file.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::logging::LogConfig;
use crate::update::{UpdateOptions, megabytes_to_bytes};

/// Default .pluguprc file content with all settings documented.
const DEFAULT_PLUGUPRC: &str = r#"# plugup Configuration File
# =========================
# This file is read on every invocation.
# Lines starting with '#' are comments.

# Plugin Identity
# ---------------
# Version string of the installed plugin. Compared for exact equality
# against the latest release tag; any difference means an update.
# version = 0.1.4
version =

# GitHub repository publishing the releases, in owner/repo form.
# repository = asfris/myplugin
repository =

# Install Location
# ----------------
# Path to the plugin's entry file. The containing folder names the
# install directory under plugins_root.
# plugin_file = /var/www/plugins/myplugin/myplugin.php
plugin_file =

# Directory holding all plugin install directories.
# plugins_root = /var/www/plugins
plugins_root =

# Update Engine
# -------------
# Maximum release asset size in megabytes (decimal: 1 MB = 1,000,000 bytes).
# An asset over this limit stops the upgrade before any download.
# size_limit_mb = 2

# User-Agent sent on every request. The GitHub API rejects requests
# without one.
# user_agent = plugup-updater

# HTTP request deadline in seconds.
# timeout_secs = 30

# Logging Configuration
# ---------------------
# Logs are stored in ~/.plugup/logs/ with automatic cleanup.
#
# log_enabled = true       # Enable/disable file logging (true/false)
# log_level = info         # Log level: trace, debug, info, warn, error, off
# log_retention = 24       # Hours to keep log files (default: 24)
"#;

/// Default User-Agent for API and asset requests.
pub const DEFAULT_USER_AGENT: &str = "plugup-updater";

/// Default HTTP deadline in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Installed plugin version.
    pub version: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Path to the plugin's entry file.
    pub plugin_file: PathBuf,
    /// Directory holding all plugin install directories.
    pub plugins_root: PathBuf,
    /// Asset size ceiling in megabytes.
    pub size_limit_mb: u64,
    /// User-Agent for HTTP requests.
    pub user_agent: String,
    /// HTTP request deadline in seconds.
    pub timeout_secs: u64,
    /// Path to config file.
    pub config_path: PathBuf,
    /// Logging configuration.
    pub log_config: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: String::new(),
            owner: String::new(),
            repo: String::new(),
            plugin_file: PathBuf::new(),
            plugins_root: PathBuf::new(),
            size_limit_mb: crate::update::DEFAULT_SIZE_LIMIT_MB,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            config_path: Self::default_config_path(),
            log_config: LogConfig::default(),
        }
    }
}

impl Config {
    /// Returns the default config file path (~/.pluguprc).
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pluguprc")
    }

    /// Loads configuration from the default path, creating it if it
    /// doesn't exist.
    ///
    /// # Errors
    /// Returns error if config cannot be read.
    pub fn load() -> io::Result<Self> {
        let path = Self::default_config_path();
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    ///
    /// # Errors
    /// Returns error if config cannot be read.
    pub fn load_from(path: &PathBuf) -> io::Result<Self> {
        // Create default config if it doesn't exist
        if !path.exists() {
            Self::create_default_config(path)?;
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self {
            config_path: path.clone(),
            ..Self::default()
        };
        config.parse(&content);

        Ok(config)
    }

    /// Creates the default config file.
    fn create_default_config(path: &PathBuf) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_PLUGUPRC.as_bytes())?;
        Ok(())
    }

    /// Parses the config file content.
    fn parse(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Parse key = value
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                // Remove inline comments
                let value = value.split('#').next().unwrap_or(value).trim();

                self.apply_setting(key, value);
            }
        }
    }

    /// Applies a single setting.
    fn apply_setting(&mut self, key: &str, value: &str) {
        match key {
            "version" => {
                self.version = value.to_string();
            }
            "repository" => {
                if let Some((owner, repo)) = parse_repository(value) {
                    self.owner = owner;
                    self.repo = repo;
                }
            }
            "plugin_file" => {
                self.plugin_file = PathBuf::from(value);
            }
            "plugins_root" => {
                self.plugins_root = PathBuf::from(value);
            }
            "size_limit_mb" => {
                self.size_limit_mb = value
                    .parse()
                    .unwrap_or(crate::update::DEFAULT_SIZE_LIMIT_MB);
            }
            "user_agent" => {
                if !value.is_empty() {
                    self.user_agent = value.to_string();
                }
            }
            "timeout_secs" => {
                self.timeout_secs = value.parse().unwrap_or(DEFAULT_TIMEOUT_SECS);
            }
            "log_enabled" => {
                self.log_config.enabled =
                    matches!(value.to_lowercase().as_str(), "true" | "yes" | "1" | "on");
            }
            "log_level" => {
                self.log_config.level = LogConfig::parse_level(value);
            }
            "log_retention" => {
                self.log_config.retention_hours = LogConfig::parse_retention(value);
            }
            _ => {
                // Unknown keys are ignored so older config files keep working
            }
        }
    }

    /// Returns the HTTP deadline as a duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the update engine's options from this configuration.
    #[must_use]
    pub fn update_options(&self) -> UpdateOptions {
        UpdateOptions {
            installed_version: self.version.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            plugin_file: self.plugin_file.clone(),
            plugins_root: self.plugins_root.clone(),
            size_limit_bytes: megabytes_to_bytes(self.size_limit_mb),
        }
    }
}

/// Parses an `owner/repo` reference.
#[must_use]
pub fn parse_repository(input: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = input.split('/').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }

    Some((parts[0].to_string(), parts[1].to_string()))
}
