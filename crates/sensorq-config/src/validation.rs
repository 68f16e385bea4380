// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures queue limits are usable and the configured sensor list can be
//! published as a registry.

use std::collections::HashSet;

use crate::{ConfigError, ConfigResult, SensorqConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    DuplicateSensorHandle { handle: i32 },
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateSensorHandle { handle } => {
                write!(f, "Sensor handle {} is declared more than once", handle)
            }
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &SensorqConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_queue(config, &mut errors);
    validate_sensors(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_queue(config: &SensorqConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.queue.capacity == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "queue.capacity".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if config.queue.max_queues == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "queue.max_queues".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_sensors(config: &SensorqConfig, errors: &mut Vec<ConfigValidationError>) {
    let mut seen = HashSet::new();
    for (position, sensor) in config.sensors.iter().enumerate() {
        if !seen.insert(sensor.handle) {
            errors.push(ConfigValidationError::DuplicateSensorHandle {
                handle: sensor.handle.raw(),
            });
        }
        if sensor.name.trim().is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: format!("sensors[{}].name", position),
            });
        }
        if sensor.min_delay_us < 0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("sensors[{}].min_delay_us", position),
                reason: format!("{} is negative", sensor.min_delay_us),
            });
        }
    }
}

fn validate_logging(config: &SensorqConfig, errors: &mut Vec<ConfigValidationError>) {
    let format = config.logging.format.to_lowercase();
    if format != "text" && format != "json" {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.format".to_string(),
            reason: format!("'{}' is not one of text, json", config.logging.format),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorq_structures::{SensorDescriptor, SensorType};

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = SensorqConfig::default();
        config.queue.capacity = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("queue.capacity"));
    }

    #[test]
    fn test_duplicate_and_unnamed_sensors_all_reported() {
        let mut config = SensorqConfig::default();
        config.sensors = vec![
            SensorDescriptor::new(1, "accel", SensorType::Accelerometer),
            SensorDescriptor::new(1, " ", SensorType::Gyroscope).with_min_delay(-5),
        ];
        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("handle 1"));
        assert!(message.contains("sensors[1].name"));
        assert!(message.contains("sensors[1].min_delay_us"));
    }

    #[test]
    fn test_unknown_log_format() {
        let mut config = SensorqConfig::default();
        config.logging.format = "yaml".to_string();
        assert!(validate_config(&config).is_err());
    }
}
