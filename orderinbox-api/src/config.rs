use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub server: Option<ServerConfig>,
    pub cors: Option<CorsConfig>,
    pub imap: Option<ImapConfig>,
    pub alerts: Option<AlertsConfig>,
    pub monitor: Option<MonitorConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server: Some(ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            }),
            cors: Some(CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            }),
            imap: Some(ImapConfig::default()),
            alerts: None,
            monitor: Some(MonitorConfig::default()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ImapConfig {
    pub host: String,
    pub port: u16,
    pub folder: String,
}

impl Default for ImapConfig {
    fn default() -> Self {
        Self {
            host: "imap.gmail.com".to_string(),
            port: 993,
            folder: "INBOX".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AlertsConfig {
    /// Webhook receiving budget alert payloads.
    pub webhook_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MonitorConfig {
    /// Seconds between background budget refreshes.
    pub interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { interval_secs: 300 }
    }
}

impl ApiConfig {
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        // Create default config file if it doesn't exist
        if !config_path.exists() {
            let default_config = r#"
[server]
host = "127.0.0.1"
port = 8080

[cors]
allowed_origins = ["http://localhost:3000"]

[imap]
host = "imap.gmail.com"
port = 993
folder = "INBOX"

[monitor]
# Seconds between background budget refreshes
interval_secs = 300

# [alerts]
# webhook_url = "https://hooks.example.com/orderinbox"
"#;
            std::fs::write(&config_path, default_config).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .build()?;

        let config: ApiConfig = builder.try_deserialize()?;

        Ok((config, config_path))
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("orderinbox").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}
