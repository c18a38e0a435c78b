use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub directory: DirectoryConfig,
    pub activity: ActivityConfig,
    pub announcements: AnnouncementsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins; empty allows any origin (development).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Start with the demo fleet instead of an empty directory.
    #[serde(default)]
    pub seed_demo_data: bool,

    /// Capacity of the change-event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityConfig {
    /// Number of activity entries retained for the logs page.
    #[serde(default = "default_activity_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementsConfig {
    #[serde(default = "default_per_page")]
    pub default_per_page: usize,

    #[serde(default = "default_max_per_page")]
    pub max_per_page: usize,

    /// Interval of the publish/expiry sweep in seconds.
    #[serde(default = "default_schedule_sweep_secs")]
    pub schedule_sweep_secs: u64,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    1_048_576
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_event_buffer() -> usize {
    domain::services::DEFAULT_EVENT_BUFFER
}
fn default_activity_capacity() -> usize {
    domain::services::DEFAULT_ACTIVITY_CAPACITY
}
fn default_per_page() -> usize {
    shared::pagination::DEFAULT_PER_PAGE
}
fn default_max_per_page() -> usize {
    shared::pagination::MAX_PER_PAGE
}
fn default_schedule_sweep_secs() -> u64 {
    60
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with SIGNAGE__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("SIGNAGE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests don't depend on the working directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30
            max_body_size = 1048576

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []

            [directory]
            seed_demo_data = false
            event_buffer = 256

            [activity]
            capacity = 500

            [announcements]
            default_per_page = 10
            max_per_page = 100
            schedule_sweep_secs = 60
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SIGNAGE__SERVER__HOST must not be empty".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.socket_addr().is_err() {
            return Err(ConfigValidationError::InvalidValue(format!(
                "Invalid listen address {}:{}",
                self.server.host, self.server.port
            )));
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(ConfigValidationError::InvalidValue(format!(
                "logging.format must be json or pretty, got {}",
                self.logging.format
            )));
        }

        if self.directory.event_buffer == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "directory.event_buffer must be at least 1".to_string(),
            ));
        }

        if self.activity.capacity == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "activity.capacity must be at least 1".to_string(),
            ));
        }

        let announcements = &self.announcements;
        if announcements.default_per_page == 0
            || announcements.default_per_page > announcements.max_per_page
        {
            return Err(ConfigValidationError::InvalidValue(
                "announcements.default_per_page must be between 1 and max_per_page".to_string(),
            ));
        }

        if announcements.schedule_sweep_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "announcements.schedule_sweep_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
