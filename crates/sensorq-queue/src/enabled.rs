// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-queue enabled sensor state

use std::collections::HashMap;

use sensorq_structures::SensorHandle;

/// Delivery state for one enabled sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledSensor {
    pub delay_us: u32,
    /// Timestamp of the last hardware sample buffered for this sensor
    pub last_hw_timestamp: Option<i64>,
}

/// Why a sample was or was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accept,
    Disabled,
    OutOfOrder { last: i64 },
}

/// Handle → enabled state. Absent means disabled.
#[derive(Debug, Default)]
pub struct EnabledSensorState {
    sensors: HashMap<SensorHandle, EnabledSensor>,
}

impl EnabledSensorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or re-enable a sensor; the latest delay wins. Returns the
    /// previous delay if the sensor was already enabled.
    ///
    /// The hardware timestamp watermark survives re-enabling so ordering
    /// stays strict across rate changes.
    pub fn enable(&mut self, handle: SensorHandle, delay_us: u32) -> Option<u32> {
        match self.sensors.get_mut(&handle) {
            Some(entry) => {
                let previous = entry.delay_us;
                entry.delay_us = delay_us;
                Some(previous)
            }
            None => {
                self.sensors.insert(
                    handle,
                    EnabledSensor {
                        delay_us,
                        last_hw_timestamp: None,
                    },
                );
                None
            }
        }
    }

    /// Returns true if the sensor was enabled
    pub fn disable(&mut self, handle: SensorHandle) -> bool {
        self.sensors.remove(&handle).is_some()
    }

    pub fn delay(&self, handle: SensorHandle) -> Option<u32> {
        self.sensors.get(&handle).map(|s| s.delay_us)
    }

    pub fn is_enabled(&self, handle: SensorHandle) -> bool {
        self.sensors.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Enabled handles with their delays, sorted by handle
    pub fn snapshot(&self) -> Vec<(SensorHandle, u32)> {
        let mut entries: Vec<_> = self.sensors.iter().map(|(h, s)| (*h, s.delay_us)).collect();
        entries.sort_by_key(|(h, _)| *h);
        entries
    }

    /// Decide whether a hardware sample may be buffered
    pub fn admit_hardware(&self, handle: SensorHandle, timestamp: i64) -> Admission {
        match self.sensors.get(&handle) {
            None => Admission::Disabled,
            Some(EnabledSensor {
                last_hw_timestamp: Some(last),
                ..
            }) if timestamp <= *last => Admission::OutOfOrder { last: *last },
            Some(_) => Admission::Accept,
        }
    }

    /// Injected samples only need the sensor to be enabled
    pub fn admit_injected(&self, handle: SensorHandle) -> Admission {
        if self.is_enabled(handle) {
            Admission::Accept
        } else {
            Admission::Disabled
        }
    }

    /// Record that a hardware sample was buffered
    pub fn record_hardware(&mut self, handle: SensorHandle, timestamp: i64) {
        if let Some(entry) = self.sensors.get_mut(&handle) {
            entry.last_hw_timestamp = Some(timestamp);
        }
    }
}
