//! Environment-variable overrides
//!
//! Deployments configure the harvester through the environment (optionally via a
//! `.env` file). Each recognized variable replaces one config value; empty values
//! are ignored.

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};

/// Applies environment overrides to `config` and re-validates it
///
/// `lookup` resolves a variable name to its value; pass
/// `|key| std::env::var(key).ok()` for the process environment.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(value) = get("BASE_URL") {
        config.source.base_url = value.trim().trim_end_matches('/').to_string();
    }

    // HEADLESS wins over the older PLAYWRIGHT_HEADLESS name
    for key in ["HEADLESS", "PLAYWRIGHT_HEADLESS"] {
        if let Some(value) = get(key) {
            config.navigator.headless = parse_bool(key, &value)?;
            break;
        }
    }

    if let Some(value) = get("PARSER_LOG_LEVEL") {
        config.logging.level = value;
    }

    if let Some(value) = get("LOG_FILE") {
        config.logging.file = value;
    }

    if let Some(value) = get("CHECKPOINT_FILE") {
        config.checkpoint.path = value;
    }

    if let Some(value) = get("DB_NAME") {
        config.database.name = value;
    }

    if let Some(value) = get("DB_USER") {
        config.database.user = Some(value);
    }

    if let Some(value) = get("DB_PASSWORD") {
        config.database.password = Some(value);
    }

    if let Some(value) = get("DB_HOST") {
        config.database.host = Some(value);
    }

    if let Some(value) = get("DB_PORT") {
        config.database.port = Some(value);
    }

    validate(config)
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnv {
            key: key.to_string(),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}
