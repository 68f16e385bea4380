// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sensor event value type

use crate::{SensorDescriptor, SensorHandle, SensorType};

/// Event layout version written by [`SensorEvent::new`]
pub const EVENT_VERSION: i32 = 1;

/// Accuracy/status values reported alongside a sample
pub mod accuracy {
    pub const UNRELIABLE: i32 = 0;
    pub const LOW: i32 = 1;
    pub const MEDIUM: i32 = 2;
    pub const HIGH: i32 = 3;
}

/// One timestamped measurement sample.
///
/// `timestamp` is monotonic nanoseconds. For hardware events it strictly
/// increases per (queue, sensor); injected events carry whatever the injector
/// supplied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorEvent {
    pub version: i32,
    pub sensor: SensorHandle,
    pub sensor_type: SensorType,
    pub values: [f32; 3],
    pub accuracy: i32,
    pub timestamp: i64,
}

impl SensorEvent {
    pub fn new(
        sensor: impl Into<SensorHandle>,
        sensor_type: SensorType,
        values: [f32; 3],
        accuracy: i32,
        timestamp: i64,
    ) -> Self {
        Self {
            version: EVENT_VERSION,
            sensor: sensor.into(),
            sensor_type,
            values,
            accuracy,
            timestamp,
        }
    }

    /// Build an event that takes its handle, type and version from a descriptor
    pub fn for_sensor(descriptor: &SensorDescriptor, values: [f32; 3], accuracy: i32, timestamp: i64) -> Self {
        Self {
            version: descriptor.version,
            sensor: descriptor.handle,
            sensor_type: descriptor.sensor_type,
            values,
            accuracy,
            timestamp,
        }
    }

    /// Bitwise equality, including NaN payloads and signed zeros
    pub fn bit_eq(&self, other: &SensorEvent) -> bool {
        self.version == other.version
            && self.sensor == other.sensor
            && self.sensor_type == other.sensor_type
            && self.accuracy == other.accuracy
            && self.timestamp == other.timestamp
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_sensor_copies_identity() {
        let d = SensorDescriptor::new(7, "baro", SensorType::Pressure).with_version(4);
        let e = SensorEvent::for_sensor(&d, [1013.2, 0.0, 0.0], accuracy::HIGH, 55);
        assert_eq!(e.sensor, SensorHandle(7));
        assert_eq!(e.sensor_type, SensorType::Pressure);
        assert_eq!(e.version, 4);
    }

    #[test]
    fn test_bit_eq_distinguishes_signed_zero() {
        let a = SensorEvent::new(1, SensorType::Light, [0.0, 0.0, 0.0], 0, 1);
        let mut b = a;
        b.values[0] = -0.0;
        assert_eq!(a, b);
        assert!(!a.bit_eq(&b));
    }
}
