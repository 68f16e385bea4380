// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Transport trait definitions
//!
//! A queue talks to its transport only through these traits, so the in-memory
//! pipe can be replaced by a shared-memory or socket-backed one without
//! touching the queue protocol.

use std::sync::Arc;
use std::time::Duration;

use crate::common::TransportResult;

/// Base transport trait - implemented by all transports
pub trait Transport: Send + Sync {
    /// Close the transport. Idempotent. Wakes every blocked waiter.
    fn close(&self);

    /// Whether frames can still flow
    fn is_open(&self) -> bool;

    /// Transport name/type
    fn transport_type(&self) -> &str;
}

/// Bounded, ordered, single-consumer frame pipe
pub trait FramePipe: Transport {
    /// Append a frame. Fails with `Full` at capacity, leaving the pipe unchanged.
    fn push(&self, frame: Vec<u8>) -> TransportResult<()>;

    /// Take the oldest frame without blocking. `Ok(None)` when empty.
    fn pull(&self) -> TransportResult<Option<Vec<u8>>>;

    /// Block until at least one frame is buffered.
    ///
    /// Returns `Ok(())` only when a following `pull` will yield a frame
    /// (given a single consumer). Returns `ConnectionClosed` when the pipe is
    /// closed while waiting, `Broken` on failure, and `Timeout` once `timeout`
    /// elapses. `None` waits indefinitely.
    fn wait_readable(&self, timeout: Option<Duration>) -> TransportResult<()>;

    /// Frames currently buffered
    fn pending(&self) -> usize;

    fn capacity(&self) -> usize;
}

/// Opens pipes for new queues
pub trait PipeFactory: Send + Sync {
    /// Open a new pipe. Fails with `Exhausted` when no more pipes can be created.
    fn open_pipe(&self) -> TransportResult<Arc<dyn FramePipe>>;

    /// Pipes currently alive
    fn open_count(&self) -> usize;
}
