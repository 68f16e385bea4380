// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Where the sensor list comes from.

Physical enumeration is outside this crate; a [`SensorSource`] hands the
manager a complete descriptor list each time it is asked. The manager asks
once at construction and again on every `reload_config`.
*/

use std::path::{Path, PathBuf};

use sensorq_config::{load_config, validate_config, ConfigError};
use sensorq_structures::SensorDescriptor;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sensor source unavailable: {0}")]
    Unavailable(String),
}

pub trait SensorSource: Send + Sync {
    fn query_sensors(&self) -> Result<Vec<SensorDescriptor>, SourceError>;
}

/// Fixed descriptor list
#[derive(Debug, Clone, Default)]
pub struct StaticSensorSource {
    sensors: Vec<SensorDescriptor>,
}

impl StaticSensorSource {
    pub fn new(sensors: Vec<SensorDescriptor>) -> Self {
        Self { sensors }
    }
}

impl SensorSource for StaticSensorSource {
    fn query_sensors(&self) -> Result<Vec<SensorDescriptor>, SourceError> {
        Ok(self.sensors.clone())
    }
}

/// Reads `[[sensors]]` from the configuration file on every query, so a
/// reload picks up edits.
#[derive(Debug, Clone)]
pub struct ConfigSensorSource {
    path: Option<PathBuf>,
}

impl ConfigSensorSource {
    /// `None` searches for the file the same way [`load_config`] does
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl SensorSource for ConfigSensorSource {
    fn query_sensors(&self) -> Result<Vec<SensorDescriptor>, SourceError> {
        let config = load_config(self.path.as_deref(), None)?;
        validate_config(&config)?;
        debug!(
            path = ?self.path,
            sensors = config.sensors.len(),
            "Loaded sensor list from configuration"
        );
        Ok(config.sensors)
    }
}
