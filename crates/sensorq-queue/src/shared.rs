// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Registry snapshot shared between the manager and its queues.
//!
//! Readers take an `Arc` of the current snapshot and never hold the lock
//! while they work. A reload swaps in a new snapshot; readers that already
//! cloned the old one keep using it until they drop it.

use std::sync::Arc;

use parking_lot::RwLock;
use sensorq_structures::SensorRegistry;

#[derive(Debug, Clone)]
pub struct SharedRegistry {
    current: Arc<RwLock<Arc<SensorRegistry>>>,
}

impl SharedRegistry {
    pub fn new(registry: SensorRegistry) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    pub fn snapshot(&self) -> Arc<SensorRegistry> {
        Arc::clone(&self.current.read())
    }

    /// Publish a new snapshot and return the one it replaced
    pub fn replace(&self, registry: SensorRegistry) -> Arc<SensorRegistry> {
        std::mem::replace(&mut *self.current.write(), Arc::new(registry))
    }
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new(SensorRegistry::empty())
    }
}
