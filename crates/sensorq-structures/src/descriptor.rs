// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sensor descriptors

use serde::{Deserialize, Serialize};

use crate::SensorType;

/// Opaque sensor identifier, unique within a registry.
///
/// Handles carry no arithmetic meaning; they are only compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorHandle(pub i32);

impl SensorHandle {
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl From<i32> for SensorHandle {
    fn from(raw: i32) -> Self {
        SensorHandle(raw)
    }
}

impl std::fmt::Display for SensorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

fn default_version() -> i32 {
    1
}

/// Immutable metadata record for one physical or virtual sensor.
///
/// Deserialises from a `[[sensors]]` table in the configuration file:
///
/// ```toml
/// [[sensors]]
/// handle = 1
/// name = "BMI160 Accelerometer"
/// vendor = "Bosch"
/// sensor_type = "accelerometer"
/// max_range = 39.2
/// resolution = 0.0012
/// power = 0.18
/// min_delay_us = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    pub handle: SensorHandle,
    pub name: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default = "default_version")]
    pub version: i32,
    pub sensor_type: SensorType,
    /// Maximum reading in the sensor's unit
    #[serde(default)]
    pub max_range: f32,
    #[serde(default)]
    pub resolution: f32,
    /// Power draw in mA while active
    #[serde(default)]
    pub power: f32,
    /// Minimum sampling interval in microseconds. Zero marks an on-change
    /// sensor that has no streaming rate.
    #[serde(default)]
    pub min_delay_us: i32,
}

impl SensorDescriptor {
    pub fn new(handle: impl Into<SensorHandle>, name: impl Into<String>, sensor_type: SensorType) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
            vendor: String::new(),
            version: default_version(),
            sensor_type,
            max_range: 0.0,
            resolution: 0.0,
            power: 0.0,
            min_delay_us: 0,
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn with_range(mut self, max_range: f32, resolution: f32) -> Self {
        self.max_range = max_range;
        self.resolution = resolution;
        self
    }

    pub fn with_power(mut self, power: f32) -> Self {
        self.power = power;
        self
    }

    pub fn with_min_delay(mut self, min_delay_us: i32) -> Self {
        self.min_delay_us = min_delay_us;
        self
    }

    /// On-change sensors report only when the reading changes.
    pub fn is_on_change(&self) -> bool {
        self.min_delay_us <= 0
    }

    /// Smallest delay the sensor can stream at, if it streams at all
    pub fn min_delay(&self) -> Option<u32> {
        if self.is_on_change() {
            None
        } else {
            Some(self.min_delay_us as u32)
        }
    }
}
