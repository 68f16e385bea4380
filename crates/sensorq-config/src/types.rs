// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `sensorq_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use sensorq_structures::SensorDescriptor;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SensorqConfig {
    pub system: SystemConfig,
    pub queue: QueueConfig,
    pub injection: InjectionConfig,
    pub logging: LoggingConfig,
    /// Sensor list published by the config-backed source
    pub sensors: Vec<SensorDescriptor>,
}

/// System-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub debug: bool,
    pub log_level: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
        }
    }
}

/// What to do with a requested delay below a sensor's minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayPolicy {
    /// Raise the delay to the sensor's minimum
    #[default]
    Clamp,
    /// Refuse the enable request
    Reject,
}

impl std::str::FromStr for DelayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clamp" => Ok(DelayPolicy::Clamp),
            "reject" => Ok(DelayPolicy::Reject),
            _ => Err(format!("Invalid delay policy: {}", s)),
        }
    }
}

/// Event queue configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Events buffered per queue before new samples are refused
    pub capacity: usize,
    /// Queues that may be open at once
    pub max_queues: usize,
    pub delay_policy: DelayPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_queues: 64,
            delay_policy: DelayPolicy::Clamp,
        }
    }
}

/// Event injection gate
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InjectionConfig {
    pub allow: bool,
}

/// Logging output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `text` or `json` console output
    pub format: String,
    pub file_logging: bool,
    pub log_dir: PathBuf,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            file_logging: false,
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}
