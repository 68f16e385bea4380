// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Sensor Manager

Owns the published sensor registry and creates one [`EventQueue`] per
client session.

## Responsibilities

1. **Registry**: query the [`SensorSource`] and publish an immutable snapshot
2. **Queues**: open a pipe per client and track queues weakly for fan-out
3. **Dispatch**: deliver hardware samples to every queue that enabled the sensor
4. **Reload**: swap in a fresh snapshot without invalidating live queues

## Thread Safety

The registry snapshot is an `Arc` swapped under a `RwLock`; the queue list is
a `Mutex<Vec<Weak<_>>>` held only long enough to clone strong references.
Delivery itself runs outside both locks.
*/

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use sensorq_config::{load_config, validate_config, SensorqConfig};
use sensorq_queue::{EventQueue, InjectPermission, QueueError, QueueOptions, SharedRegistry};
use sensorq_structures::{SensorEvent, SensorHandle, SensorRegistry};
use sensorq_transports::{MemoryPipeFactory, PipeConfig, PipeFactory};
use tracing::{debug, info, warn};

use crate::error::{ManagerError, ManagerResult};
use crate::source::{ConfigSensorSource, SensorSource, SourceError, StaticSensorSource};

pub struct SensorManager {
    registry: SharedRegistry,
    source: Box<dyn SensorSource>,
    pipe_factory: Arc<dyn PipeFactory>,
    queue_options: QueueOptions,
    injection: InjectPermission,
    queues: Mutex<Vec<Weak<EventQueue>>>,
}

impl std::fmt::Debug for SensorManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorManager")
            .field("sensors", &self.registry.snapshot().len())
            .field("open_pipes", &self.pipe_factory.open_count())
            .field("queue_options", &self.queue_options)
            .field("injection", &self.injection)
            .finish()
    }
}

impl SensorManager {
    /// Build a manager from explicit parts. Queries `source` once.
    pub fn new(
        config: &SensorqConfig,
        source: Box<dyn SensorSource>,
        pipe_factory: Arc<dyn PipeFactory>,
    ) -> ManagerResult<Self> {
        let registry = SensorRegistry::new(source.query_sensors()?)?;
        info!(
            sensors = registry.len(),
            delay_policy = ?config.queue.delay_policy,
            injection = config.injection.allow,
            "Sensor manager initialised"
        );
        Ok(Self {
            registry: SharedRegistry::new(registry),
            source,
            pipe_factory,
            queue_options: QueueOptions::from_config(&config.queue),
            injection: InjectPermission::from_allowed(config.injection.allow),
            queues: Mutex::new(Vec::new()),
        })
    }

    fn memory_factory(config: &SensorqConfig) -> ManagerResult<Arc<dyn PipeFactory>> {
        let factory = MemoryPipeFactory::new(
            PipeConfig::with_capacity(config.queue.capacity),
            config.queue.max_queues,
        )?;
        Ok(Arc::new(factory))
    }

    /// In-memory pipes sized from `config.queue`, sensors from `config.sensors`.
    ///
    /// The sensor list is fixed; use [`from_config_file`](Self::from_config_file)
    /// for a manager that can reload it.
    pub fn from_config(config: &SensorqConfig) -> ManagerResult<Self> {
        let source = StaticSensorSource::new(config.sensors.clone());
        Self::new(config, Box::new(source), Self::memory_factory(config)?)
    }

    /// Load configuration from `path` (or the usual search locations) and
    /// build a manager whose `reload_config` re-reads that file.
    pub fn from_config_file(path: Option<PathBuf>) -> ManagerResult<Self> {
        let config = load_config(path.as_deref(), None).map_err(SourceError::from)?;
        validate_config(&config).map_err(SourceError::from)?;
        let source = ConfigSensorSource::new(path);
        Self::new(&config, Box::new(source), Self::memory_factory(&config)?)
    }

    /// Current registry snapshot. Order is stable until the next reload.
    pub fn sensor_list(&self) -> Arc<SensorRegistry> {
        self.registry.snapshot()
    }

    pub fn injection_permission(&self) -> InjectPermission {
        self.injection
    }

    /// Open a queue for a new client session.
    ///
    /// Fails with [`ManagerError::Transport`] when no further pipe can be
    /// opened, e.g. when the queue limit is reached.
    pub fn create_event_queue(&self) -> ManagerResult<Arc<EventQueue>> {
        let pipe = self.pipe_factory.open_pipe().map_err(|e| {
            warn!(error = %e, open = self.pipe_factory.open_count(), "Failed to open event queue pipe");
            e
        })?;
        let queue = Arc::new(EventQueue::new(self.registry.clone(), pipe, self.queue_options));

        let mut queues = self.queues.lock();
        queues.retain(|weak| weak.strong_count() > 0);
        queues.push(Arc::downgrade(&queue));
        info!(queue_id = queue.id(), live_queues = queues.len(), "Event queue created");
        Ok(queue)
    }

    fn live_queues(&self) -> Vec<Arc<EventQueue>> {
        let mut queues = self.queues.lock();
        let mut live = Vec::with_capacity(queues.len());
        queues.retain(|weak| match weak.upgrade() {
            Some(queue) if !queue.is_closed() => {
                live.push(queue);
                true
            }
            _ => false,
        });
        live
    }

    /// Queues that are neither dropped nor closed
    pub fn live_queue_count(&self) -> usize {
        self.live_queues().len()
    }

    /// Deliver a hardware sample to every queue that has its sensor enabled.
    /// Returns how many queues buffered it.
    pub fn dispatch(&self, event: &SensorEvent) -> usize {
        let mut delivered = 0;
        for queue in self.live_queues() {
            match queue.dispatch(event) {
                Ok(n) => delivered += n,
                Err(QueueError::QueueClosed) => {
                    debug!(queue_id = queue.id(), "Skipping queue closed during dispatch");
                }
                Err(e) => {
                    warn!(queue_id = queue.id(), sensor = %event.sensor, error = %e, "Dispatch failed");
                }
            }
        }
        delivered
    }

    /// Effective delay per sensor across live queues: the smallest delay any
    /// queue requested. This is what a driver would be programmed with.
    pub fn active_sensors(&self) -> Vec<(SensorHandle, u32)> {
        let mut active: BTreeMap<SensorHandle, u32> = BTreeMap::new();
        for queue in self.live_queues() {
            for (handle, delay) in queue.enabled_sensors() {
                active
                    .entry(handle)
                    .and_modify(|d| *d = (*d).min(delay))
                    .or_insert(delay);
            }
        }
        active.into_iter().collect()
    }

    /// Re-query the source and publish a new registry snapshot.
    ///
    /// Live queues keep working and pick up the new snapshot for later
    /// enable/write calls. On failure the previous snapshot stays published.
    pub fn reload_config(&self) -> ManagerResult<Arc<SensorRegistry>> {
        let result = self
            .source
            .query_sensors()
            .map_err(ManagerError::from)
            .and_then(|sensors| SensorRegistry::new(sensors).map_err(ManagerError::from));

        match result {
            Ok(registry) => {
                let previous = self.registry.replace(registry);
                let current = self.registry.snapshot();
                info!(
                    before = previous.len(),
                    after = current.len(),
                    "Sensor registry reloaded"
                );
                Ok(current)
            }
            Err(e) => {
                warn!(error = %e, "Sensor registry reload failed, keeping previous list");
                Err(e)
            }
        }
    }
}
