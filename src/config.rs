use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::webhook::DEFAULT_EMERGENCY_KEYWORDS;

/// Default endpoint of the email-delivery API
pub const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, one event per line
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Configuration for the Switchboard service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server listens on
    pub bind_address: String,
    /// Words and phrases that mark a call as an emergency
    pub emergency_keywords: Vec<String>,
    /// Workspace assigned to requests whose call did not name one
    pub default_workspace_id: Option<String>,
    /// Endpoint of the email-delivery API
    pub email_api_url: String,
    /// API key for the email-delivery API; alerts are disabled without one
    pub email_api_key: Option<String>,
    /// Sender address for emergency alerts
    pub email_from: String,
    /// Who receives emergency alerts
    pub emergency_recipients: Vec<String>,
    /// Log line format
    pub log_format: LogFormat,
    /// Directory for daily-rolling log files, if any
    pub log_dir: Option<PathBuf>,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub bind_address: Option<String>,
    #[serde(default)]
    pub emergency_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub default_workspace_id: Option<String>,
    #[serde(default)]
    pub email_api_url: Option<String>,
    #[serde(default)]
    pub email_api_key: Option<String>,
    #[serde(default)]
    pub email_from: Option<String>,
    #[serde(default)]
    pub emergency_recipients: Option<Vec<String>>,
    #[serde(default)]
    pub log_format: Option<LogFormat>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Server URL the CLI talks to; the server ignores it
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "switchboard", about = "Voice-agent maintenance intake service")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on, e.g. 0.0.0.0:3000
    #[clap(long, env = "SWITCHBOARD_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Comma-separated emergency keywords
    #[clap(long, env = "SWITCHBOARD_EMERGENCY_KEYWORDS", value_delimiter = ',')]
    pub emergency_keywords: Option<Vec<String>>,

    /// Workspace for calls that do not name one
    #[clap(long, env = "SWITCHBOARD_DEFAULT_WORKSPACE_ID")]
    pub default_workspace_id: Option<String>,

    /// Email API endpoint
    #[clap(long, env = "SWITCHBOARD_EMAIL_API_URL")]
    pub email_api_url: Option<String>,

    /// Email API key
    #[clap(long, env = "SWITCHBOARD_EMAIL_API_KEY", hide_env_values = true)]
    pub email_api_key: Option<String>,

    /// Sender address for alerts
    #[clap(long, env = "SWITCHBOARD_EMAIL_FROM")]
    pub email_from: Option<String>,

    /// Comma-separated alert recipients
    #[clap(long, env = "SWITCHBOARD_EMERGENCY_RECIPIENTS", value_delimiter = ',')]
    pub emergency_recipients: Option<Vec<String>>,

    /// Log format
    #[clap(long, value_enum, env = "SWITCHBOARD_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Directory for rolling log files
    #[clap(long, env = "SWITCHBOARD_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Debug mode
    #[clap(long, env = "SWITCHBOARD_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            emergency_keywords: update.emergency_keywords.unwrap_or(self.emergency_keywords),
            default_workspace_id: update.default_workspace_id.or(self.default_workspace_id),
            email_api_url: update.email_api_url.unwrap_or(self.email_api_url),
            email_api_key: update.email_api_key.or(self.email_api_key),
            email_from: update.email_from.unwrap_or(self.email_from),
            emergency_recipients: update.emergency_recipients.unwrap_or(self.emergency_recipients),
            log_format: update.log_format.unwrap_or(self.log_format),
            log_dir: update.log_dir.or(self.log_dir),
        }
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or("switchboard.db".to_string(), |path| {
        path.join("switchboard.db").to_string_lossy().to_string()
    });

    Config {
        database_url,
        bind_address: "127.0.0.1:3000".to_string(),
        emergency_keywords: DEFAULT_EMERGENCY_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        default_workspace_id: None,
        email_api_url: DEFAULT_EMAIL_API_URL.to_string(),
        email_api_key: None,
        email_from: "Switchboard <alerts@switchboard.local>".to_string(),
        emergency_recipients: Vec::new(),
        log_format: LogFormat::Pretty,
        log_dir: None,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        bind_address: args.bind_address,
        emergency_keywords: args.emergency_keywords,
        default_workspace_id: args.default_workspace_id,
        email_api_url: args.email_api_url,
        email_api_key: args.email_api_key,
        email_from: args.email_from,
        emergency_recipients: args.emergency_recipients,
        log_format: args.log_format,
        log_dir: args.log_dir,
        server_url: None,
    }
}

/// The XDG config directory, if the platform has one
pub fn get_config_dir_path() -> Option<PathBuf> {
    match ProjectDirs::from("com", "switchboard", "switchboard") {
        Some(proj_dirs) => Some(proj_dirs.config_dir().to_path_buf()),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let config_dir = get_config_dir_path().and_then(|path| {
        if !path.exists() {
            info!("Config path not found at {:?}, using defaults", path);
            None
        } else {
            Some(path)
        }
    });

    let base = base_config(config_dir.clone());
    let file_update = config_from_file(config_dir.map(|dir| dir.join("config.toml"))).unwrap_or_default();

    let config = base.apply_update(file_update).apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, bind_address={}, keywords={}, alerts={}",
        config.database_url,
        config.bind_address,
        config.emergency_keywords.len(),
        if config.email_api_key.is_some() && !config.emergency_recipients.is_empty() {
            "enabled"
        } else {
            "disabled"
        }
    );

    config
}
