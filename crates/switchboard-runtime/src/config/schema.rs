//! Configuration schema definitions.
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [telegram]
//! token = "123456:ABC..."
//! poll_timeout_secs = 30
//!
//! [dispatcher]
//! capability_timeout_ms = 30000
//! session_ttl_secs = 3600
//!
//! [capabilities]
//! data_dir = "data"
//! weather.api_key = "..."
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use switchboard_capabilities::weather::DEFAULT_BASE_URL;
use switchboard_transport::Backoff;
use switchboard_transport::telegram::DEFAULT_API_URL;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchboardConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Bot API connection.
    #[serde(default)]
    pub telegram: TelegramSettings,

    /// Dispatcher tuning.
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    /// Capability backends.
    #[serde(default)]
    pub capabilities: CapabilitiesConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to the tracing level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level. `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, required when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-target levels, e.g. `switchboard_transport = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

// =============================================================================
// Telegram
// =============================================================================

/// Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramSettings {
    /// Bot token. Usually supplied as `SWITCHBOARD_TELEGRAM__TOKEN`.
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// `getUpdates` long-poll timeout in seconds.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Backoff after failed polls.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: default_api_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

impl TelegramSettings {
    /// Converts to the transport config.
    pub fn to_transport_config(&self) -> switchboard_transport::TelegramConfig {
        switchboard_transport::TelegramConfig {
            token: self.token.clone(),
            api_url: self.api_url.clone(),
            poll_timeout: Duration::from_secs(self.poll_timeout_secs),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

/// Retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Initial delay between retries in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Exponential backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    /// Creates the backoff tracker.
    pub fn to_backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.max_delay_ms),
            self.backoff_multiplier,
        )
    }
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Dispatcher and lane tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Upper bound for a single capability call.
    #[serde(default = "default_capability_timeout_ms")]
    pub capability_timeout_ms: u64,

    /// Pending intents older than this are forgotten. Unset keeps them forever.
    #[serde(default)]
    pub session_ttl_secs: Option<u64>,

    /// A chat lane with no traffic for this long is torn down.
    #[serde(default = "default_lane_idle_secs")]
    pub lane_idle_secs: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            capability_timeout_ms: default_capability_timeout_ms(),
            session_ttl_secs: None,
            lane_idle_secs: default_lane_idle_secs(),
        }
    }
}

impl DispatcherConfig {
    pub fn capability_timeout(&self) -> Duration {
        Duration::from_millis(self.capability_timeout_ms)
    }

    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl_secs.map(Duration::from_secs)
    }

    pub fn lane_idle(&self) -> Duration {
        Duration::from_secs(self.lane_idle_secs)
    }
}

fn default_capability_timeout_ms() -> u64 {
    30_000
}

fn default_lane_idle_secs() -> u64 {
    300
}

// =============================================================================
// Capabilities
// =============================================================================

/// Capability backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitiesConfig {
    /// Directory for journals and default image output.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub weather: WeatherSettings,

    #[serde(default)]
    pub image: ImageSettings,
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            weather: WeatherSettings::default(),
            image: ImageSettings::default(),
        }
    }
}

impl CapabilitiesConfig {
    /// Directory for converted images.
    pub fn image_output_dir(&self) -> PathBuf {
        self.image
            .output_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("images"))
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Weather API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSettings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_weather_url")]
    pub base_url: String,

    #[serde(default = "default_weather_lang")]
    pub lang: String,

    #[serde(default = "default_weather_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_url(),
            lang: default_weather_lang(),
            timeout_ms: default_weather_timeout_ms(),
        }
    }
}

impl WeatherSettings {
    /// Converts to the capability config.
    pub fn to_weather_config(&self) -> switchboard_capabilities::WeatherConfig {
        switchboard_capabilities::WeatherConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            lang: self.lang.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

fn default_weather_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_weather_lang() -> String {
    "ru".to_string()
}

fn default_weather_timeout_ms() -> u64 {
    10_000
}

/// Image conversion settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageSettings {
    /// Default output directory. Falls back to `<data_dir>/images`.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}
