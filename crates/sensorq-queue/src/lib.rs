// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # sensorq-queue
//!
//! The per-client event queue: enabled-sensor state, the blocking read
//! protocol, injection, and the queue state machine.
//!
//! ```rust
//! use std::sync::Arc;
//! use sensorq_queue::{EventQueue, QueueOptions, SharedRegistry};
//! use sensorq_structures::{SensorDescriptor, SensorEvent, SensorHandle, SensorRegistry, SensorType};
//! use sensorq_transports::{MemoryPipe, PipeConfig};
//!
//! let registry = SharedRegistry::new(SensorRegistry::new(vec![
//!     SensorDescriptor::new(1, "Accelerometer", SensorType::Accelerometer),
//! ])?);
//! let pipe = Arc::new(MemoryPipe::new(PipeConfig::default())?);
//! let queue = EventQueue::new(registry, pipe, QueueOptions::default());
//!
//! queue.enable_sensor(SensorHandle(1), 20_000)?;
//! queue.dispatch(&SensorEvent::new(1, SensorType::Accelerometer, [0.0, 9.8, 0.0], 3, 1))?;
//! assert_eq!(queue.poll_one()?.timestamp, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod enabled;
pub mod error;
pub mod permission;
pub mod queue;
pub mod shared;
pub mod state;
pub mod stats;

pub use enabled::{EnabledSensor, EnabledSensorState};
pub use error::{QueueError, QueueResult};
pub use permission::InjectPermission;
pub use queue::{EventOrigin, EventQueue, QueueOptions};
pub use shared::SharedRegistry;
pub use state::QueueState;
pub use stats::QueueStats;
