// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Binary frame codec for events crossing a transport
//!
//! Frames are bincode's fixed-int little-endian encoding of a flat record:
//!
//! ```text
//! offset  size  field
//!      0     4  version       i32
//!      4     4  sensor        i32
//!      8     4  sensor_type   i32 (wire code)
//!     12    12  values        [f32; 3]
//!     24     4  accuracy      i32
//!     28     8  timestamp     i64
//! ```

use serde::{Deserialize, Serialize};

use crate::{CodecError, SensorEvent, SensorHandle, SensorType};

/// Encoded size of one event
pub const FRAME_LEN: usize = 36;

#[derive(Serialize, Deserialize)]
struct EventFrame {
    version: i32,
    sensor: i32,
    sensor_type: i32,
    values: [f32; 3],
    accuracy: i32,
    timestamp: i64,
}

pub fn encode_event(event: &SensorEvent) -> Result<Vec<u8>, CodecError> {
    let frame = EventFrame {
        version: event.version,
        sensor: event.sensor.raw(),
        sensor_type: event.sensor_type.code(),
        values: event.values,
        accuracy: event.accuracy,
        timestamp: event.timestamp,
    };
    Ok(bincode::serialize(&frame)?)
}

pub fn decode_event(bytes: &[u8]) -> Result<SensorEvent, CodecError> {
    if bytes.len() != FRAME_LEN {
        return Err(CodecError::FrameLength {
            expected: FRAME_LEN,
            actual: bytes.len(),
        });
    }
    let frame: EventFrame = bincode::deserialize(bytes)?;
    Ok(SensorEvent {
        version: frame.version,
        sensor: SensorHandle(frame.sensor),
        sensor_type: SensorType::from_code(frame.sensor_type),
        values: frame.values,
        accuracy: frame.accuracy,
        timestamp: frame.timestamp,
    })
}
