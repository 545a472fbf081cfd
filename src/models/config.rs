//! Configuration model.
//!
//! Layers, lowest first: defaults, TOML file, environment variables. A `.env`
//! file in the working directory is read into the environment beforehand.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Windows folder the device script copies videos into (e.g. `D:\Videos`).
    pub destination_folder: Option<String>,
    /// PowerShell script driving the device.
    pub script_path: PathBuf,
    /// PowerShell executable.
    pub powershell: String,
    /// S3 configuration.
    pub s3: S3Config,
    /// Nextcloud configuration.
    pub nextcloud: NextcloudConfig,
    /// Telegram configuration.
    pub telegram: TelegramConfig,
    /// Network timeouts and retries.
    pub network: NetworkConfig,
}

/// S3 configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub bucket: Option<String>,
    /// Key prefix prepended to every object, without trailing slash.
    pub key_prefix: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Custom endpoint for S3-compatible providers.
    pub endpoint: Option<String>,
}

/// Nextcloud configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NextcloudConfig {
    /// Server base URL (e.g. `https://cloud.example.org`).
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Telegram configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    /// User ID (private conversation with the bot) or group chat ID.
    pub chat_id: Option<String>,
    /// Bot API base URL.
    pub api_url: String,
}

/// Network timeouts and retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Timeout for small requests, in seconds.
    pub timeout_secs: u64,
    /// Timeout for file uploads, in seconds.
    pub upload_timeout_secs: u64,
    /// Extra attempts after a transport failure.
    pub retries: u32,
    /// Pause before a retry, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination_folder: None,
            script_path: PathBuf::from("../timeframe_archivist.ps1"),
            powershell: "powershell.exe".to_string(),
            s3: S3Config::default(),
            nextcloud: NextcloudConfig::default(),
            telegram: TelegramConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_url: "https://api.telegram.org".to_string(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            upload_timeout_secs: 3600,
            retries: 1,
            retry_delay_ms: 2000,
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Config {
    /// Override fields from environment-style variables.
    ///
    /// `lookup` returns the value of a variable, if set and non-empty.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(v) = get("WINDOWS_DESTINATION_FOLDER") {
            self.destination_folder = Some(v);
        }
        if let Some(v) = get("ARCHIVIST_SCRIPT_PATH") {
            self.script_path = PathBuf::from(v);
        }
        if let Some(v) = get("ARCHIVIST_POWERSHELL") {
            self.powershell = v;
        }

        let s3 = &mut self.s3;
        for (name, slot) in [
            ("S3_BUCKET", &mut s3.bucket),
            ("S3_KEY_PREFIX", &mut s3.key_prefix),
            ("AWS_REGION", &mut s3.region),
            ("AWS_KEY_ID", &mut s3.access_key_id),
            ("AWS_SECRET_KEY", &mut s3.secret_access_key),
            ("S3_ENDPOINT", &mut s3.endpoint),
        ] {
            if let Some(v) = get(name) {
                *slot = Some(v);
            }
        }

        let nc = &mut self.nextcloud;
        for (name, slot) in [
            ("NEXTCLOUD_URL", &mut nc.url),
            ("NEXTCLOUD_USERNAME", &mut nc.username),
            ("NEXTCLOUD_PASSWORD", &mut nc.password),
        ] {
            if let Some(v) = get(name) {
                *slot = Some(v);
            }
        }

        if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(v);
        }
        if let Some(v) = get("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(v);
        }
        if let Some(v) = get("TELEGRAM_API_URL") {
            self.telegram.api_url = v;
        }
    }

    /// Destination folder, which every run needs.
    pub fn destination_folder(&self) -> Result<&str> {
        self.destination_folder.as_deref().ok_or_else(|| {
            crate::Error::Config(
                "destination folder not configured. Set WINDOWS_DESTINATION_FOLDER".to_string(),
            )
        })
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timeframe_archivist")
}

/// Load configuration.
///
/// An explicit `path` must exist; the default location is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Could not read .env file: {}", e);
        }
    }

    let config_path = match path {
        Some(p) if !p.exists() => {
            return Err(crate::Error::Config(format!(
                "config file not found: {}",
                p.display()
            )));
        }
        Some(p) => Some(p.to_path_buf()),
        None => Some(dirs_config_path().join("config.toml")).filter(|p| p.exists()),
    };

    let mut config = match config_path {
        Some(p) => {
            tracing::debug!("Loading config from {}", p.display());
            let content = std::fs::read_to_string(&p)?;
            toml::from_str(&content).map_err(|e| {
                crate::Error::Config(format!("invalid config file {}: {}", p.display(), e))
            })?
        }
        None => Config::default(),
    };

    config.apply_env(|name| std::env::var(name).ok());
    Ok(config)
}
