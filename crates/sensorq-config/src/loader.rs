// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, SensorqConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the sensorq configuration file
///
/// Search order:
/// 1. `SENSORQ_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to five parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("SENSORQ_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by SENSORQ_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet SENSORQ_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, [`find_config_file`] is used.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is missing or contains invalid TOML. Validation is
/// left to [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SensorqConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: SensorqConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SENSORQ_LOG_LEVEL` -> `system.log_level`
/// - `SENSORQ_DEBUG_MODE` -> `system.debug`
/// - `SENSORQ_QUEUE_CAPACITY` -> `queue.capacity`
/// - `SENSORQ_MAX_QUEUES` -> `queue.max_queues`
/// - `SENSORQ_DELAY_POLICY` -> `queue.delay_policy`
/// - `SENSORQ_ALLOW_INJECTION` -> `injection.allow`
///
/// Unparseable values are ignored.
pub fn apply_environment_overrides(config: &mut SensorqConfig) {
    if let Ok(value) = env::var("SENSORQ_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("SENSORQ_DEBUG_MODE") {
        config.system.debug = parse_flag(&value);
    }
    if let Ok(value) = env::var("SENSORQ_QUEUE_CAPACITY") {
        if let Ok(capacity) = value.parse::<usize>() {
            config.queue.capacity = capacity;
        }
    }
    if let Ok(value) = env::var("SENSORQ_MAX_QUEUES") {
        if let Ok(max) = value.parse::<usize>() {
            config.queue.max_queues = max;
        }
    }
    if let Ok(value) = env::var("SENSORQ_DELAY_POLICY") {
        if let Ok(policy) = value.parse() {
            config.queue.delay_policy = policy;
        }
    }
    if let Ok(value) = env::var("SENSORQ_ALLOW_INJECTION") {
        config.injection.allow = parse_flag(&value);
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"queue_capacity": "512", "allow_injection": "true"}`)
pub fn apply_cli_overrides(config: &mut SensorqConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = cli_args.get("debug") {
        config.system.debug = parse_flag(value);
    }
    if let Some(value) = cli_args.get("queue_capacity") {
        if let Ok(capacity) = value.parse::<usize>() {
            config.queue.capacity = capacity;
        }
    }
    if let Some(value) = cli_args.get("max_queues") {
        if let Ok(max) = value.parse::<usize>() {
            config.queue.max_queues = max;
        }
    }
    if let Some(value) = cli_args.get("delay_policy") {
        if let Ok(policy) = value.parse() {
            config.queue.delay_policy = policy;
        }
    }
    if let Some(value) = cli_args.get("allow_injection") {
        config.injection.allow = parse_flag(value);
    }
}
