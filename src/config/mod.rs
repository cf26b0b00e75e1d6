//! Configuration module for Tag-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and layering environment-variable overrides on top.
//!
//! # Example
//!
//! ```no_run
//! use tag_harvester::config::{apply_env_overrides, load_config};
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("harvester.toml")).unwrap();
//! apply_env_overrides(&mut config, |key| std::env::var(key).ok()).unwrap();
//! println!("Crawling {}", config.source.base_url);
//! ```

mod env;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CheckpointConfig, Config, DatabaseConfig, LoggingConfig, NavigatorConfig, SelectorConfig,
    SourceConfig, DEFAULT_BASE_URL, DEFAULT_PROVENANCE,
};

// Re-export parser functions
pub use env::apply_env_overrides;
pub use parser::{config_digest, load_config, load_config_with_hash, parse_config};
pub use validation::{normalize_level, validate};
