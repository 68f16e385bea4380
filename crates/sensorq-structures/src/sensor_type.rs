// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sensor kinds and their numeric codes

use serde::{Deserialize, Serialize};

/// Enumerated sensor kind.
///
/// The numeric codes are the ones producers put on the wire. Codes that are
/// not listed here (vendor-defined sensors) are carried as [`SensorType::Other`].
///
/// Identity is the wire code: `Other(5)` equals `Light`, hashes the same, and
/// displays as `light`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Accelerometer,
    MagneticField,
    Orientation,
    Gyroscope,
    Light,
    Pressure,
    Temperature,
    Proximity,
    Gravity,
    LinearAcceleration,
    RotationVector,
    RelativeHumidity,
    AmbientTemperature,
    /// Vendor or otherwise unlisted code
    Other(i32),
}

impl SensorType {
    /// Numeric wire code
    pub fn code(self) -> i32 {
        match self {
            SensorType::Accelerometer => 1,
            SensorType::MagneticField => 2,
            SensorType::Orientation => 3,
            SensorType::Gyroscope => 4,
            SensorType::Light => 5,
            SensorType::Pressure => 6,
            SensorType::Temperature => 7,
            SensorType::Proximity => 8,
            SensorType::Gravity => 9,
            SensorType::LinearAcceleration => 10,
            SensorType::RotationVector => 11,
            SensorType::RelativeHumidity => 12,
            SensorType::AmbientTemperature => 13,
            SensorType::Other(code) => code,
        }
    }

    /// Map a wire code back to a kind. Listed codes always map to their named
    /// variant, so `Other(1)` never comes out of here.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => SensorType::Accelerometer,
            2 => SensorType::MagneticField,
            3 => SensorType::Orientation,
            4 => SensorType::Gyroscope,
            5 => SensorType::Light,
            6 => SensorType::Pressure,
            7 => SensorType::Temperature,
            8 => SensorType::Proximity,
            9 => SensorType::Gravity,
            10 => SensorType::LinearAcceleration,
            11 => SensorType::RotationVector,
            12 => SensorType::RelativeHumidity,
            13 => SensorType::AmbientTemperature,
            other => SensorType::Other(other),
        }
    }
}

impl std::fmt::Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorType::Accelerometer => write!(f, "accelerometer"),
            SensorType::MagneticField => write!(f, "magnetic_field"),
            SensorType::Orientation => write!(f, "orientation"),
            SensorType::Gyroscope => write!(f, "gyroscope"),
            SensorType::Light => write!(f, "light"),
            SensorType::Pressure => write!(f, "pressure"),
            SensorType::Temperature => write!(f, "temperature"),
            SensorType::Proximity => write!(f, "proximity"),
            SensorType::Gravity => write!(f, "gravity"),
            SensorType::LinearAcceleration => write!(f, "linear_acceleration"),
            SensorType::RotationVector => write!(f, "rotation_vector"),
            SensorType::RelativeHumidity => write!(f, "relative_humidity"),
            SensorType::AmbientTemperature => write!(f, "ambient_temperature"),
            SensorType::Other(code) => match SensorType::from_code(*code) {
                SensorType::Other(code) => write!(f, "other({})", code),
                listed => listed.fmt(f),
            },
        }
    }
}

impl PartialEq for SensorType {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
    }
}

impl Eq for SensorType {}

impl std::hash::Hash for SensorType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.code().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listed_codes_round_trip() {
        for code in 1..=13 {
            let kind = SensorType::from_code(code);
            assert!(!matches!(kind, SensorType::Other(_)), "code {} unlisted", code);
            assert_eq!(kind.code(), code);
        }
    }

    #[test]
    fn test_vendor_code_is_preserved() {
        let kind = SensorType::from_code(65536);
        assert_eq!(kind, SensorType::Other(65536));
        assert_eq!(kind.code(), 65536);
    }

    #[test]
    fn test_other_with_listed_code_is_the_listed_kind() {
        use std::collections::HashSet;

        assert_eq!(SensorType::Other(5), SensorType::Light);
        assert_ne!(SensorType::Other(5), SensorType::Pressure);
        assert_eq!(SensorType::Other(5).to_string(), "light");

        let kinds: HashSet<_> = [SensorType::Light, SensorType::Other(5)].into_iter().collect();
        assert_eq!(kinds.len(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(SensorType::Gyroscope.to_string(), "gyroscope");
        assert_eq!(SensorType::Other(99).to_string(), "other(99)");
    }
}
