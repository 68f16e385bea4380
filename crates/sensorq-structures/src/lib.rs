// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # sensorq-structures
//!
//! Data model shared by every sensorq crate:
//!
//! - [`SensorDescriptor`]: immutable metadata for one sensor, published by the registry
//! - [`SensorEvent`]: a single timestamped sample
//! - [`SensorRegistry`]: ordered descriptor list with the restartable enumeration cursor
//! - [`codec`]: fixed-layout binary frames used on the transport
//!
//! Nothing here allocates threads or takes locks; these are plain values that
//! the queue and manager layers move around.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod codec;
pub mod descriptor;
pub mod error;
pub mod event;
pub mod registry;
pub mod sensor_type;

pub use codec::{decode_event, encode_event, FRAME_LEN};
pub use descriptor::{SensorDescriptor, SensorHandle};
pub use error::{CodecError, RegistryError};
pub use event::{accuracy, SensorEvent, EVENT_VERSION};
pub use registry::SensorRegistry;
pub use sensor_type::SensorType;
