//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{
    CapabilitiesConfig, DispatcherConfig, LogOutput, LoggingConfig, RetryConfig,
    SwitchboardConfig, TelegramSettings,
};

/// Validates the entire configuration.
pub fn validate_config(config: &SwitchboardConfig) -> ConfigResult<()> {
    validate_logging(&config.logging)?;
    validate_telegram(&config.telegram)?;
    validate_dispatcher(&config.dispatcher)?;
    validate_capabilities(&config.capabilities)?;
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    Ok(())
}

fn validate_telegram(telegram: &TelegramSettings) -> ConfigResult<()> {
    if telegram.token.trim().is_empty() {
        return Err(ConfigError::missing_field("telegram.token"));
    }
    if telegram.token.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(
            "telegram.token must not contain whitespace",
        ));
    }
    validate_url(&telegram.api_url)?;

    if telegram.poll_timeout_secs == 0 {
        return Err(ConfigError::validation(
            "telegram.poll_timeout_secs must be greater than 0",
        ));
    }

    validate_retry(&telegram.retry)
}

fn validate_retry(retry: &RetryConfig) -> ConfigResult<()> {
    if retry.initial_delay_ms == 0 {
        return Err(ConfigError::validation(
            "Initial retry delay must be greater than 0",
        ));
    }

    if retry.max_delay_ms < retry.initial_delay_ms {
        return Err(ConfigError::validation(
            "Max retry delay must be greater than or equal to initial delay",
        ));
    }

    if !retry.backoff_multiplier.is_finite() || retry.backoff_multiplier < 1.0 {
        return Err(ConfigError::validation(
            "Backoff multiplier must be at least 1.0",
        ));
    }

    Ok(())
}

fn validate_dispatcher(dispatcher: &DispatcherConfig) -> ConfigResult<()> {
    if dispatcher.capability_timeout_ms == 0 {
        return Err(ConfigError::validation(
            "dispatcher.capability_timeout_ms must be greater than 0",
        ));
    }
    if dispatcher.session_ttl_secs == Some(0) {
        return Err(ConfigError::validation(
            "dispatcher.session_ttl_secs must be greater than 0 when set",
        ));
    }
    if dispatcher.lane_idle_secs == 0 {
        return Err(ConfigError::validation(
            "dispatcher.lane_idle_secs must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_capabilities(capabilities: &CapabilitiesConfig) -> ConfigResult<()> {
    if capabilities.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::missing_field("capabilities.data_dir"));
    }
    validate_url(&capabilities.weather.base_url)?;
    if capabilities.weather.timeout_ms == 0 {
        return Err(ConfigError::validation(
            "capabilities.weather.timeout_ms must be greater than 0",
        ));
    }
    Ok(())
}

/// Checks that `url` is an absolute http(s) URL.
fn validate_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("url"));
    }

    let valid_schemes = ["http://", "https://"];
    let Some(rest) = valid_schemes.iter().find_map(|s| url.strip_prefix(s)) else {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {valid_schemes:?}"),
        ));
    };
    if rest.is_empty() || rest.starts_with('/') {
        return Err(ConfigError::invalid_url(url, "URL has no host"));
    }

    Ok(())
}
