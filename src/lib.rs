//! # sensorq - sensor event queues
//!
//! A sensor service publishes timestamped samples; each client owns an event
//! queue, enables the sensors it cares about, and blocks until the next sample
//! arrives. Buffers are bounded and per-sensor order is preserved.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! sensorq = "0.1"
//! ```
//!
//! ```rust
//! use sensorq::prelude::*;
//!
//! let mut config = SensorqConfig::default();
//! config.sensors = vec![
//!     SensorDescriptor::new(1, "Accelerometer", SensorType::Accelerometer).with_min_delay(10_000),
//! ];
//! let manager = SensorManager::from_config(&config)?;
//!
//! let queue = manager.create_event_queue()?;
//! queue.enable_sensor(SensorHandle(1), 20_000)?;
//!
//! manager.dispatch(&SensorEvent::new(1, SensorType::Accelerometer, [0.0, 9.81, 0.0], accuracy::HIGH, 1_000));
//! let event = queue.poll_one()?;
//! assert_eq!(event.values[1], 9.81);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crates
//!
//! - [`structures`]: descriptors, events, registry cursor, frame codec
//! - [`config`]: `sensorq_configuration.toml` loading and validation
//! - [`transports`]: bounded frame pipes
//! - [`queue`]: the per-client [`EventQueue`](queue::EventQueue)
//! - [`manager`]: [`SensorManager`](manager::SensorManager) and the token boundary
//! - [`observability`]: logging bootstrap and `--debug-<crate>` flags
//!
//! ## Feature Flags
//!
//! - **`file-logging`**: per-crate log files via `tracing-appender`

pub use sensorq_config as config;
pub use sensorq_manager as manager;
pub use sensorq_observability as observability;
pub use sensorq_queue as queue;
pub use sensorq_structures as structures;
pub use sensorq_transports as transports;

/// Common imports
pub mod prelude {
    pub use crate::config::{DelayPolicy, SensorqConfig};
    pub use crate::manager::{PolledEvent, QueueToken, SensorBridge, SensorManager, SensorSource};
    pub use crate::queue::{EventQueue, InjectPermission, QueueError, QueueState, QueueStats};
    pub use crate::structures::{
        accuracy, SensorDescriptor, SensorEvent, SensorHandle, SensorRegistry, SensorType,
    };
}
