// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-queue delivery counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of a queue's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Hardware events buffered
    pub delivered: u64,
    /// Injected events buffered
    pub injected: u64,
    pub dropped_disabled: u64,
    pub dropped_overflow: u64,
    pub dropped_out_of_order: u64,
}

impl QueueStats {
    pub fn dropped(&self) -> u64 {
        self.dropped_disabled + self.dropped_overflow + self.dropped_out_of_order
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    delivered: AtomicU64,
    injected: AtomicU64,
    dropped_disabled: AtomicU64,
    dropped_overflow: AtomicU64,
    dropped_out_of_order: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn injected(&self) {
        self.injected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dropped_disabled(&self) {
        self.dropped_disabled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dropped_overflow(&self) {
        self.dropped_overflow.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dropped_out_of_order(&self) {
        self.dropped_out_of_order.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> QueueStats {
        QueueStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            injected: self.injected.load(Ordering::Relaxed),
            dropped_disabled: self.dropped_disabled.load(Ordering::Relaxed),
            dropped_overflow: self.dropped_overflow.load(Ordering::Relaxed),
            dropped_out_of_order: self.dropped_out_of_order.load(Ordering::Relaxed),
        }
    }
}
