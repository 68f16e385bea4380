// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # sensorq-manager
//!
//! Service side of sensorq:
//!
//! - [`SensorManager`]: publishes the registry, opens queues, fans hardware samples out
//! - [`SensorSource`]: pluggable origin of the sensor list
//! - [`global`]: optional process-wide manager
//! - [`SensorBridge`]: token-based API for callers that cannot hold Rust references

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bridge;
pub mod error;
pub mod global;
pub mod manager;
pub mod slots;
pub mod source;

pub use bridge::{PolledEvent, QueueToken, SensorBridge};
pub use error::{ManagerError, ManagerResult};
pub use manager::SensorManager;
pub use slots::{SlotId, SlotTable};
pub use source::{ConfigSensorSource, SensorSource, SourceError, StaticSensorSource};
