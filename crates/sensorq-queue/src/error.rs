// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Queue error types.

`InvalidHandle` and `Unsupported` are per-call failures the caller can
recover from. `QueueClosed` is terminal for the queue: callers must stop
reading instead of retrying.
*/

use sensorq_structures::{CodecError, SensorHandle};
use sensorq_transports::TransportError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Unknown sensor handle
    #[error("Invalid sensor handle {0}")]
    InvalidHandle(SensorHandle),

    /// Request cannot be honoured by the sensor or transport
    #[error("Unsupported request for sensor {handle}: {reason}")]
    Unsupported { handle: SensorHandle, reason: String },

    /// Injection attempted without injection rights
    #[error("Event injection not permitted")]
    PermissionDenied,

    /// Queue was closed, possibly while a wait was in progress
    #[error("Queue closed")]
    QueueClosed,

    /// Underlying channel failure
    #[error("Transport error: {0}")]
    Transport(TransportError),

    /// A read came back empty right after a successful wait
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Timed wait elapsed without data
    #[error("Timed out waiting for events")]
    Timeout,
}

impl From<TransportError> for QueueError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ConnectionClosed => QueueError::QueueClosed,
            TransportError::Timeout => QueueError::Timeout,
            other => QueueError::Transport(other),
        }
    }
}

impl From<CodecError> for QueueError {
    fn from(err: CodecError) -> Self {
        QueueError::Transport(TransportError::Codec(err.to_string()))
    }
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
