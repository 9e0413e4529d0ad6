use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pushplus: PushPlusConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub owners: OwnersConfig,
    #[serde(default)]
    pub config_page: ConfigPageConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushPlusConfig {
    /// PushPlus send endpoint
    #[serde(default = "default_pushplus_endpoint")]
    pub endpoint: String,
    /// Account token injected into every outbound request
    #[serde(default)]
    pub token: String,
    /// Group topic; overrides the payload's topic when set
    #[serde(default)]
    pub topic: String,
    /// Outbound request timeout in seconds
    #[serde(default = "default_pushplus_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// PushPlus template used when the payload names none
    #[serde(default = "default_template")]
    pub default_template: String,
    /// Text prepended to every rendered body
    #[serde(default = "default_alert_prefix")]
    pub alert_prefix: String,
    /// Optional content template, e.g. `[{{.level}}] {{.subject}} | {{index .detail "host"}}`.
    /// Empty disables the template path.
    #[serde(default)]
    pub content_template: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnersConfig {
    /// Snapshot file holding the machine ID -> owner mapping
    #[serde(default = "default_owners_file")]
    pub file_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigPageConfig {
    #[serde(default = "default_config_page_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    18080
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_pushplus_endpoint() -> String {
    "https://www.pushplus.plus/send".to_string()
}

fn default_pushplus_timeout() -> u64 {
    10
}

fn default_template() -> String {
    "markdown".to_string()
}

fn default_alert_prefix() -> String {
    "【警告】".to_string()
}

fn default_owners_file() -> String {
    "owners.json".to_string()
}

fn default_config_page_path() -> String {
    "static/config.html".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("pushplus.endpoint", default_pushplus_endpoint())?
            .set_default("pushplus.timeout_seconds", default_pushplus_timeout() as i64)?
            .set_default("notification.default_template", default_template())?
            .set_default("notification.alert_prefix", default_alert_prefix())?
            .set_default("owners.file_path", default_owners_file())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // RELAY__PUSHPLUS__TOKEN, RELAY__SERVER__PORT, RELAY__OWNERS__FILE_PATH, ...
            // Values stay strings so tokens and topics like "0042" are not coerced
            .add_source(
                Environment::with_prefix("RELAY")
                    .prefix_separator("__")
                    .separator("__"),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for PushPlusConfig {
    fn default() -> Self {
        Self {
            endpoint: default_pushplus_endpoint(),
            token: String::new(),
            topic: String::new(),
            timeout_seconds: default_pushplus_timeout(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_template: default_template(),
            alert_prefix: default_alert_prefix(),
            content_template: String::new(),
        }
    }
}

impl Default for OwnersConfig {
    fn default() -> Self {
        Self {
            file_path: default_owners_file(),
        }
    }
}

impl Default for ConfigPageConfig {
    fn default() -> Self {
        Self {
            path: default_config_page_path(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}
