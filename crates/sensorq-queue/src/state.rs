// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Queue read-protocol state machine
//!
//! ```text
//!   Idle ──wait──▶ Waiting ──data──▶ Ready ──drained──▶ Idle
//!     │              │                 │
//!     └──────────────┴───── close ─────┴──────────▶ Closed (terminal)
//! ```
//!
//! `Idle`, `Waiting` and `Ready` are advisory: producers and the consumer
//! update them outside the pipe's lock, so under concurrent use they can lag
//! the buffer briefly. A successful `wait_for_event` is what guarantees a
//! readable event. `Closed` is exact and final.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum QueueState {
    /// Nothing known to be buffered, no waiter
    Idle = 0,
    /// A consumer is parked in `wait_for_event`
    Waiting = 1,
    /// Events were buffered as of the last transition
    Ready = 2,
    /// Terminal
    Closed = 3,
}

impl QueueState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => QueueState::Idle,
            1 => QueueState::Waiting,
            2 => QueueState::Ready,
            _ => QueueState::Closed,
        }
    }
}

impl std::fmt::Display for QueueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueState::Idle => write!(f, "idle"),
            QueueState::Waiting => write!(f, "waiting"),
            QueueState::Ready => write!(f, "ready"),
            QueueState::Closed => write!(f, "closed"),
        }
    }
}

/// Atomic holder for [`QueueState`] that never leaves `Closed`
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl Default for StateCell {
    fn default() -> Self {
        Self(AtomicU8::new(QueueState::Idle as u8))
    }
}

impl StateCell {
    pub fn get(&self) -> QueueState {
        QueueState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn is_closed(&self) -> bool {
        self.get() == QueueState::Closed
    }

    /// Move to `next` unless closed. Returns the previous state, or `None`
    /// if the cell was already closed.
    pub fn transition(&self, next: QueueState) -> Option<QueueState> {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != QueueState::Closed as u8).then_some(next as u8)
            })
            .ok()
            .map(QueueState::from_u8)
    }

    /// Move from `from` to `to` only if currently in `from`
    pub fn transition_from(&self, from: QueueState, to: QueueState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Enter `Closed`. Returns true on the first call only.
    pub fn close(&self) -> bool {
        self.0.swap(QueueState::Closed as u8, Ordering::AcqRel) != QueueState::Closed as u8
    }
}
