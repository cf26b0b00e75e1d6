use crate::config::types::{
    CheckpointConfig, Config, DatabaseConfig, LoggingConfig, NavigatorConfig, SelectorConfig,
    SourceConfig,
};
use crate::{ConfigError, ConfigResult};
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_source_config(&config.source)?;
    validate_navigator_config(&config.navigator)?;
    validate_selector_config(&config.selectors)?;
    validate_checkpoint_config(&config.checkpoint)?;
    validate_database_config(&config.database)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Maps a level name onto a `tracing` filter directive
///
/// Accepts the usual `tracing` names in any case, plus `WARNING` and `CRITICAL`.
pub fn normalize_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" => Some("error"),
        _ => None,
    }
}

fn validate_source_config(config: &SourceConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.provenance.trim().is_empty() {
        return Err(ConfigError::Validation(
            "provenance cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_navigator_config(config: &NavigatorConfig) -> ConfigResult<()> {
    if config.poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "poll-interval-ms must be greater than 0".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be greater than 0".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_selector_config(config: &SelectorConfig) -> ConfigResult<()> {
    for (key, selector) in config.entries() {
        if selector.trim().is_empty() {
            return Err(ConfigError::InvalidSelector {
                selector: key.to_string(),
                message: "selector cannot be empty".to_string(),
            });
        }

        Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: format!("{:?}", e),
        })?;
    }

    if config.next_label.trim().is_empty() {
        return Err(ConfigError::Validation(
            "next-label cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_checkpoint_config(config: &CheckpointConfig) -> ConfigResult<()> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_database_config(config: &DatabaseConfig) -> ConfigResult<()> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database name cannot be empty".to_string(),
        ));
    }

    if let Some(port) = &config.port {
        port.trim().parse::<u16>().map_err(|_| {
            ConfigError::Validation(format!("database port must be a number, got '{}'", port))
        })?;
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> ConfigResult<()> {
    if normalize_level(&config.level).is_none() {
        return Err(ConfigError::Validation(format!(
            "Unknown log level '{}'",
            config.level
        )));
    }

    if config.file.trim().is_empty() {
        return Err(ConfigError::Validation(
            "log file name cannot be empty".to_string(),
        ));
    }

    Ok(())
}
