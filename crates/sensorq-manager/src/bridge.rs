// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Token-based boundary API.

Foreign callers never hold an `Arc<EventQueue>`; they hold a [`QueueToken`],
a `u64` that resolves through a generation-checked [`SlotTable`]. Tokens are
reference counted: `create_queue` starts at 1, `retain_queue` adds one, and
`destroy_queue` drops one. At zero the queue is closed, which wakes any
thread blocked in [`SensorBridge::poll_one`].

Every failure is mapped to `false`/`None` with a log line. Nothing here
panics across the boundary.
*/

use std::sync::Arc;

use parking_lot::Mutex;
use sensorq_queue::{EventQueue, QueueError};
use sensorq_structures::{SensorDescriptor, SensorEvent, SensorHandle};
use tracing::{debug, error, warn};

use crate::manager::SensorManager;
use crate::slots::{SlotId, SlotTable};

/// Opaque boundary handle for a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueToken(u64);

impl QueueToken {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    fn slot(self) -> SlotId {
        SlotId::from_raw(self.0)
    }
}

impl std::fmt::Display for QueueToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Flattened event returned across the boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolledEvent {
    pub sensor: i32,
    pub values: [f32; 3],
    pub accuracy: i32,
    pub timestamp: i64,
}

impl From<SensorEvent> for PolledEvent {
    fn from(event: SensorEvent) -> Self {
        Self {
            sensor: event.sensor.raw(),
            values: event.values,
            accuracy: event.accuracy,
            timestamp: event.timestamp,
        }
    }
}

#[derive(Debug)]
struct BridgeEntry {
    queue: Arc<EventQueue>,
    refs: u32,
}

#[derive(Debug)]
pub struct SensorBridge {
    manager: Arc<SensorManager>,
    queues: Mutex<SlotTable<BridgeEntry>>,
}

impl SensorBridge {
    pub fn new(manager: Arc<SensorManager>) -> Self {
        Self {
            manager,
            queues: Mutex::new(SlotTable::new()),
        }
    }

    /// Bridge over the process-wide manager, if one is installed
    pub fn from_global() -> Option<Self> {
        crate::global::instance().map(Self::new)
    }

    pub fn manager(&self) -> &Arc<SensorManager> {
        &self.manager
    }

    /// Tokens currently resolvable
    pub fn open_tokens(&self) -> usize {
        self.queues.lock().len()
    }

    fn resolve(&self, token: QueueToken) -> Option<Arc<EventQueue>> {
        let queue = self
            .queues
            .lock()
            .get(token.slot())
            .map(|entry| Arc::clone(&entry.queue));
        if queue.is_none() {
            debug!(token = %token, "Unknown or stale queue token");
        }
        queue
    }

    // ------------------------------------------------------------------
    // Queue lifetime
    // ------------------------------------------------------------------

    pub fn create_queue(&self) -> Option<QueueToken> {
        let queue = match self.manager.create_event_queue() {
            Ok(queue) => queue,
            Err(e) => {
                warn!(error = %e, "create_queue failed");
                return None;
            }
        };
        let id = queue.id();
        match self.queues.lock().insert(BridgeEntry { queue, refs: 1 }) {
            Some(slot) => {
                let token = QueueToken(slot.to_raw());
                debug!(token = %token, queue_id = id, "Queue token issued");
                Some(token)
            }
            None => {
                error!(queue_id = id, "Queue token space exhausted");
                None
            }
        }
    }

    pub fn retain_queue(&self, token: QueueToken) -> bool {
        match self.queues.lock().get_mut(token.slot()) {
            Some(entry) => match entry.refs.checked_add(1) {
                Some(refs) => {
                    entry.refs = refs;
                    true
                }
                None => {
                    warn!(token = %token, "Queue reference count saturated");
                    false
                }
            },
            None => {
                debug!(token = %token, "retain_queue on stale token");
                false
            }
        }
    }

    /// Drop one reference. The last one retires the token and closes the
    /// queue, waking any blocked poller.
    pub fn destroy_queue(&self, token: QueueToken) -> bool {
        let retired = {
            let mut queues = self.queues.lock();
            let Some(entry) = queues.get_mut(token.slot()) else {
                debug!(token = %token, "destroy_queue on stale token");
                return false;
            };
            entry.refs -= 1;
            if entry.refs > 0 {
                return true;
            }
            queues.remove(token.slot())
        };
        if let Some(entry) = retired {
            debug!(token = %token, queue_id = entry.queue.id(), "Queue token retired");
            entry.queue.close();
        }
        true
    }

    // ------------------------------------------------------------------
    // Per-queue operations
    // ------------------------------------------------------------------

    /// Enable `sensor` at `delay_us`, or disable it when `delay_us` is negative.
    pub fn enable(&self, token: QueueToken, sensor: i32, delay_us: i32) -> bool {
        let Some(queue) = self.resolve(token) else {
            return false;
        };
        let handle = SensorHandle(sensor);
        let result = match u32::try_from(delay_us) {
            Ok(delay) => queue.enable_sensor(handle, delay),
            Err(_) => queue.disable_sensor(handle),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(token = %token, sensor, delay_us, error = %e, "enable failed");
                false
            }
        }
    }

    /// Block until the queue yields an event. `None` on any failure,
    /// including the queue being destroyed while waiting.
    pub fn poll_one(&self, token: QueueToken) -> Option<PolledEvent> {
        let queue = self.resolve(token)?;
        match queue.poll_one() {
            Ok(event) => Some(event.into()),
            Err(QueueError::QueueClosed) => {
                debug!(token = %token, "poll_one ended: queue closed");
                None
            }
            Err(e) => {
                warn!(token = %token, error = %e, "poll_one failed");
                None
            }
        }
    }

    /// Inject a structured event. True only when it was buffered.
    pub fn inject_event(&self, token: QueueToken, event: &SensorEvent) -> bool {
        let Some(queue) = self.resolve(token) else {
            return false;
        };
        match queue.write(event, self.manager.injection_permission()) {
            Ok(buffered) => buffered > 0,
            Err(e) => {
                warn!(token = %token, sensor = %event.sensor, error = %e, "inject_event failed");
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------

    pub fn reload_config(&self) -> bool {
        self.manager.reload_config().is_ok()
    }

    pub fn list_sensors(&self) -> Vec<SensorDescriptor> {
        self.manager.sensor_list().descriptors().to_vec()
    }

    /// Cursor over the registry: the descriptor at `index` and the index to
    /// pass next. `None` once `index` is past the end.
    pub fn next_sensor(&self, index: usize) -> Option<(SensorDescriptor, usize)> {
        self.manager
            .sensor_list()
            .next_sensor(index)
            .map(|(descriptor, next)| (descriptor.clone(), next))
    }
}
