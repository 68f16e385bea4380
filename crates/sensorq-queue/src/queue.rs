// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Per-client event queue.

An [`EventQueue`] pairs a bounded [`FramePipe`] with the client's
[`EnabledSensorState`]. Producers (hardware dispatch, injection) push encoded
frames; the single consumer drains them with [`EventQueue::read`] or the
two-phase [`EventQueue::poll_one`].

The enabled-state mutex is held across the admission check and the push, so
once `disable_sensor` returns no further sample for that sensor is buffered.
*/

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sensorq_config::{DelayPolicy, QueueConfig};
use sensorq_structures::{decode_event, encode_event, SensorDescriptor, SensorEvent, SensorHandle};
use sensorq_transports::{FramePipe, TransportError};
use tracing::{debug, error, info, trace, warn};

use crate::enabled::{Admission, EnabledSensorState};
use crate::error::{QueueError, QueueResult};
use crate::permission::InjectPermission;
use crate::shared::SharedRegistry;
use crate::state::{QueueState, StateCell};
use crate::stats::{QueueStats, StatsCounters};

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

/// Where a sample entered the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    /// Sensor service fan-out; subject to per-sensor timestamp ordering
    Hardware,
    /// `write` by a caller holding injection rights
    Injected,
}

/// Queue behaviour knobs taken from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueOptions {
    pub delay_policy: DelayPolicy,
}

impl QueueOptions {
    pub fn from_config(config: &QueueConfig) -> Self {
        Self {
            delay_policy: config.delay_policy,
        }
    }
}

pub struct EventQueue {
    id: u64,
    registry: SharedRegistry,
    pipe: Arc<dyn FramePipe>,
    enabled: Mutex<EnabledSensorState>,
    state: StateCell,
    stats: StatsCounters,
    options: QueueOptions,
    /// Read failure held back so events drained before it are not lost
    deferred: Mutex<Option<QueueError>>,
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("id", &self.id)
            .field("state", &self.state.get())
            .field("transport", &self.pipe.transport_type())
            .field("pending", &self.pipe.pending())
            .finish()
    }
}

impl EventQueue {
    pub fn new(registry: SharedRegistry, pipe: Arc<dyn FramePipe>, options: QueueOptions) -> Self {
        let id = NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed);
        debug!(
            queue_id = id,
            transport = pipe.transport_type(),
            capacity = pipe.capacity(),
            "Event queue created"
        );
        Self {
            id,
            registry,
            pipe,
            enabled: Mutex::new(EnabledSensorState::new()),
            state: StateCell::default(),
            stats: StatsCounters::default(),
            options,
            deferred: Mutex::new(None),
        }
    }

    /// Process-unique queue id, for logs
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> QueueState {
        self.state.get()
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    pub fn stats(&self) -> QueueStats {
        self.stats.snapshot()
    }

    /// Events currently buffered
    pub fn pending(&self) -> usize {
        self.pipe.pending()
    }

    fn ensure_open(&self) -> QueueResult<()> {
        if self.state.is_closed() {
            Err(QueueError::QueueClosed)
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Enable / disable
    // ------------------------------------------------------------------

    /// Start delivering events for `handle` at roughly `delay_us` intervals.
    ///
    /// Calling again for an enabled sensor replaces its delay.
    pub fn enable_sensor(&self, handle: SensorHandle, delay_us: u32) -> QueueResult<()> {
        self.ensure_open()?;
        let registry = self.registry.snapshot();
        let descriptor = registry.get(handle).ok_or(QueueError::InvalidHandle(handle))?;
        let effective = self.effective_delay(descriptor, delay_us)?;

        let previous = self.enabled.lock().enable(handle, effective);
        debug!(
            queue_id = self.id,
            sensor = %handle,
            requested_us = delay_us,
            effective_us = effective,
            previous_us = ?previous,
            "Sensor enabled"
        );
        Ok(())
    }

    fn effective_delay(&self, descriptor: &SensorDescriptor, requested: u32) -> QueueResult<u32> {
        let Some(min) = descriptor.min_delay() else {
            return Ok(requested);
        };
        if requested >= min {
            return Ok(requested);
        }
        match self.options.delay_policy {
            DelayPolicy::Clamp => Ok(min),
            DelayPolicy::Reject => Err(QueueError::Unsupported {
                handle: descriptor.handle,
                reason: format!("requested delay {}us is below the minimum of {}us", requested, min),
            }),
        }
    }

    /// Stop delivering events for `handle`. Idempotent.
    ///
    /// Events buffered before the call stay readable. A sensor that was
    /// removed from the registry by a reload can still be disabled.
    pub fn disable_sensor(&self, handle: SensorHandle) -> QueueResult<()> {
        self.ensure_open()?;
        let mut enabled = self.enabled.lock();
        if !enabled.is_enabled(handle) && !self.registry.snapshot().contains(handle) {
            return Err(QueueError::InvalidHandle(handle));
        }
        if enabled.disable(handle) {
            debug!(queue_id = self.id, sensor = %handle, "Sensor disabled");
        }
        Ok(())
    }

    /// Effective delay for an enabled sensor, `None` when disabled
    pub fn enabled_delay(&self, handle: SensorHandle) -> Option<u32> {
        self.enabled.lock().delay(handle)
    }

    /// Enabled sensors and their delays, ordered by handle
    pub fn enabled_sensors(&self) -> Vec<(SensorHandle, u32)> {
        self.enabled.lock().snapshot()
    }

    // ------------------------------------------------------------------
    // Producer side
    // ------------------------------------------------------------------

    /// Inject an event. Returns the number of events buffered (0 or 1).
    ///
    /// `Ok(0)` means the sensor is not enabled on this queue or the buffer is
    /// full; neither is an error for the injector.
    pub fn write(&self, event: &SensorEvent, permission: InjectPermission) -> QueueResult<usize> {
        if !permission.is_granted() {
            warn!(queue_id = self.id, sensor = %event.sensor, "Event injection denied");
            return Err(QueueError::PermissionDenied);
        }
        self.ensure_open()?;
        if !self.registry.snapshot().contains(event.sensor) {
            return Err(QueueError::InvalidHandle(event.sensor));
        }
        self.deliver(event, EventOrigin::Injected)
    }

    /// Hardware fan-out entry point used by the sensor service.
    pub fn dispatch(&self, event: &SensorEvent) -> QueueResult<usize> {
        self.deliver(event, EventOrigin::Hardware)
    }

    fn deliver(&self, event: &SensorEvent, origin: EventOrigin) -> QueueResult<usize> {
        let mut enabled = self.enabled.lock();
        self.ensure_open()?;

        let admission = match origin {
            EventOrigin::Hardware => enabled.admit_hardware(event.sensor, event.timestamp),
            EventOrigin::Injected => enabled.admit_injected(event.sensor),
        };
        match admission {
            Admission::Accept => {}
            Admission::Disabled => {
                self.stats.dropped_disabled();
                trace!(queue_id = self.id, sensor = %event.sensor, "Dropped event for disabled sensor");
                return Ok(0);
            }
            Admission::OutOfOrder { last } => {
                self.stats.dropped_out_of_order();
                warn!(
                    queue_id = self.id,
                    sensor = %event.sensor,
                    timestamp = event.timestamp,
                    last_timestamp = last,
                    "Dropped out-of-order hardware event"
                );
                return Ok(0);
            }
        }

        let frame = encode_event(event)?;
        match self.pipe.push(frame) {
            Ok(()) => {
                match origin {
                    EventOrigin::Hardware => {
                        enabled.record_hardware(event.sensor, event.timestamp);
                        self.stats.delivered();
                    }
                    EventOrigin::Injected => self.stats.injected(),
                }
                self.state.transition(QueueState::Ready);
                Ok(1)
            }
            Err(TransportError::Full { capacity }) => {
                self.stats.dropped_overflow();
                warn!(
                    queue_id = self.id,
                    sensor = %event.sensor,
                    capacity,
                    "Queue full, dropping newest event"
                );
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    // ------------------------------------------------------------------
    // Consumer side
    // ------------------------------------------------------------------

    /// Drain up to `max_count` events in arrival order without blocking.
    ///
    /// A pull or decode failure after some events were drained returns those
    /// events; the failure is reported by the next call.
    pub fn read(&self, max_count: usize) -> QueueResult<Vec<SensorEvent>> {
        self.ensure_open()?;
        if let Some(err) = self.deferred.lock().take() {
            return Err(err);
        }

        let mut events = Vec::with_capacity(max_count.min(self.pipe.pending()));
        while events.len() < max_count {
            match self.next_event() {
                Ok(Some(event)) => events.push(event),
                Ok(None) => break,
                Err(err) if events.is_empty() => return Err(err),
                Err(err) => {
                    debug!(
                        queue_id = self.id,
                        drained = events.len(),
                        error = %err,
                        "Read failed mid-drain, deferring error"
                    );
                    *self.deferred.lock() = Some(err);
                    break;
                }
            }
        }
        self.settle_state();
        Ok(events)
    }

    fn next_event(&self) -> QueueResult<Option<SensorEvent>> {
        match self.pipe.pull()? {
            Some(frame) => Ok(Some(decode_event(&frame)?)),
            None => Ok(None),
        }
    }

    /// Drop back to `Idle` once drained, re-checking for a producer that
    /// pushed in between.
    fn settle_state(&self) {
        if self.pipe.pending() > 0 || !self.state.transition_from(QueueState::Ready, QueueState::Idle) {
            return;
        }
        if self.pipe.pending() > 0 {
            self.state.transition_from(QueueState::Idle, QueueState::Ready);
        }
    }

    /// Block until at least one event is buffered.
    pub fn wait_for_event(&self) -> QueueResult<()> {
        self.wait_inner(None)
    }

    /// Like [`wait_for_event`](Self::wait_for_event), failing with
    /// `Timeout` once `timeout` elapses.
    pub fn wait_for_event_timeout(&self, timeout: Duration) -> QueueResult<()> {
        self.wait_inner(Some(timeout))
    }

    fn wait_inner(&self, timeout: Option<Duration>) -> QueueResult<()> {
        if self.state.transition(QueueState::Waiting).is_none() {
            return Err(QueueError::QueueClosed);
        }
        match self.pipe.wait_readable(timeout) {
            Ok(()) => {
                self.state.transition(QueueState::Ready);
                Ok(())
            }
            Err(e) => {
                self.state.transition_from(QueueState::Waiting, QueueState::Idle);
                let err = QueueError::from(e);
                if err != QueueError::Timeout {
                    debug!(queue_id = self.id, error = %err, "Wait ended without data");
                }
                Err(err)
            }
        }
    }

    /// Return the next event, blocking if none is buffered.
    ///
    /// An empty read right after a successful wait means another consumer
    /// raced this one or the transport lied about readiness. It is reported
    /// as `ProtocolViolation` and not retried.
    pub fn poll_one(&self) -> QueueResult<SensorEvent> {
        if let Some(event) = self.read(1)?.pop() {
            return Ok(event);
        }
        self.wait_for_event()?;
        match self.read(1)?.pop() {
            Some(event) => Ok(event),
            None => {
                error!(
                    queue_id = self.id,
                    transport = self.pipe.transport_type(),
                    "Read returned no events after a successful wait"
                );
                Err(QueueError::ProtocolViolation(
                    "no event readable after wait reported data".to_string(),
                ))
            }
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Enter the terminal `Closed` state and wake any waiter. Idempotent.
    pub fn close(&self) {
        // Serialises with in-flight deliveries
        let _enabled = self.enabled.lock();
        if self.state.close() {
            self.pipe.close();
            info!(queue_id = self.id, stats = ?self.stats.snapshot(), "Event queue closed");
        }
    }
}

impl Drop for EventQueue {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorq_structures::{accuracy, SensorRegistry, SensorType};
    use sensorq_transports::{MemoryPipe, PipeConfig, Transport, TransportResult};
    use std::thread;

    const ACCEL: SensorHandle = SensorHandle(1);
    const LIGHT: SensorHandle = SensorHandle(5);

    fn registry() -> SharedRegistry {
        SharedRegistry::new(
            SensorRegistry::new(vec![
                SensorDescriptor::new(1, "Accelerometer", SensorType::Accelerometer).with_min_delay(10_000),
                SensorDescriptor::new(5, "Light", SensorType::Light),
            ])
            .unwrap(),
        )
    }

    fn queue_with(capacity: usize, options: QueueOptions) -> EventQueue {
        let pipe = Arc::new(MemoryPipe::new(PipeConfig::with_capacity(capacity)).unwrap());
        EventQueue::new(registry(), pipe, options)
    }

    fn queue() -> EventQueue {
        queue_with(16, QueueOptions::default())
    }

    fn accel(ts: i64) -> SensorEvent {
        SensorEvent::new(ACCEL, SensorType::Accelerometer, [0.0, 9.8, 0.1], accuracy::HIGH, ts)
    }

    #[test]
    fn test_enable_unknown_handle() {
        let q = queue();
        assert_eq!(
            q.enable_sensor(SensorHandle(99), 1000),
            Err(QueueError::InvalidHandle(SensorHandle(99)))
        );
        assert_eq!(
            q.disable_sensor(SensorHandle(99)),
            Err(QueueError::InvalidHandle(SensorHandle(99)))
        );
    }

    #[test]
    fn test_delay_clamped_to_minimum() {
        let q = queue();
        q.enable_sensor(ACCEL, 1_000).unwrap();
        assert_eq!(q.enabled_delay(ACCEL), Some(10_000));
        q.enable_sensor(ACCEL, 50_000).unwrap();
        assert_eq!(q.enabled_delay(ACCEL), Some(50_000));
    }

    #[test]
    fn test_delay_rejected_by_policy() {
        let q = queue_with(
            16,
            QueueOptions {
                delay_policy: DelayPolicy::Reject,
            },
        );
        assert!(matches!(
            q.enable_sensor(ACCEL, 1_000),
            Err(QueueError::Unsupported { handle: ACCEL, .. })
        ));
        assert_eq!(q.enabled_delay(ACCEL), None);

        // on-change sensors accept any delay
        q.enable_sensor(LIGHT, 0).unwrap();
        assert_eq!(q.enabled_delay(LIGHT), Some(0));
    }

    #[test]
    fn test_disabled_sensor_drops_events() {
        let q = queue();
        assert_eq!(q.dispatch(&accel(1)).unwrap(), 0);
        q.enable_sensor(ACCEL, 20_000).unwrap();
        assert_eq!(q.dispatch(&accel(2)).unwrap(), 1);
        q.disable_sensor(ACCEL).unwrap();
        assert_eq!(q.dispatch(&accel(3)).unwrap(), 0);

        // buffered before the disable, still readable
        let events = q.read(10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timestamp, 2);

        let stats = q.stats();
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.dropped_disabled, 2);
    }

    #[test]
    fn test_out_of_order_hardware_dropped() {
        let q = queue();
        q.enable_sensor(ACCEL, 20_000).unwrap();
        assert_eq!(q.dispatch(&accel(100)).unwrap(), 1);
        assert_eq!(q.dispatch(&accel(100)).unwrap(), 0);
        assert_eq!(q.dispatch(&accel(50)).unwrap(), 0);
        assert_eq!(q.dispatch(&accel(101)).unwrap(), 1);
        assert_eq!(q.stats().dropped_out_of_order, 2);

        // injection is not subject to ordering
        assert_eq!(q.write(&accel(1), InjectPermission::Granted).unwrap(), 1);

        let ts: Vec<i64> = q.read(10).unwrap().iter().map(|e| e.timestamp).collect();
        assert_eq!(ts, vec![100, 101, 1]);
    }

    #[test]
    fn test_write_permission_and_handle() {
        let q = queue();
        q.enable_sensor(ACCEL, 20_000).unwrap();
        assert_eq!(q.write(&accel(1), InjectPermission::Denied), Err(QueueError::PermissionDenied));

        let unknown = SensorEvent::new(42, SensorType::Other(42), [0.0; 3], 0, 1);
        assert_eq!(
            q.write(&unknown, InjectPermission::Granted),
            Err(QueueError::InvalidHandle(SensorHandle(42)))
        );

        let light = SensorEvent::new(LIGHT, SensorType::Light, [300.0, 0.0, 0.0], 0, 1);
        assert_eq!(q.write(&light, InjectPermission::Granted).unwrap(), 0);
        assert_eq!(q.stats().injected, 0);
    }

    #[test]
    fn test_overflow_rejects_newest() {
        let q = queue_with(2, QueueOptions::default());
        q.enable_sensor(ACCEL, 20_000).unwrap();
        assert_eq!(q.dispatch(&accel(1)).unwrap(), 1);
        assert_eq!(q.dispatch(&accel(2)).unwrap(), 1);
        assert_eq!(q.dispatch(&accel(3)).unwrap(), 0);
        assert_eq!(q.stats().dropped_overflow, 1);

        let ts: Vec<i64> = q.read(10).unwrap().iter().map(|e| e.timestamp).collect();
        assert_eq!(ts, vec![1, 2]);

        // the rejected sample did not advance the ordering watermark
        assert_eq!(q.dispatch(&accel(3)).unwrap(), 1);
    }

    #[test]
    fn test_read_respects_max_and_states() {
        let q = queue();
        assert_eq!(q.state(), QueueState::Idle);
        assert!(q.read(4).unwrap().is_empty());

        q.enable_sensor(ACCEL, 20_000).unwrap();
        for ts in 1..=3 {
            q.dispatch(&accel(ts)).unwrap();
        }
        assert_eq!(q.state(), QueueState::Ready);
        assert_eq!(q.read(2).unwrap().len(), 2);
        assert_eq!(q.state(), QueueState::Ready);
        assert_eq!(q.read(0).unwrap().len(), 0);
        assert_eq!(q.read(2).unwrap().len(), 1);
        assert_eq!(q.state(), QueueState::Idle);
    }

    #[test]
    fn test_wait_timeout() {
        let q = queue();
        assert_eq!(
            q.wait_for_event_timeout(Duration::from_millis(20)),
            Err(QueueError::Timeout)
        );
        assert_eq!(q.state(), QueueState::Idle);
    }

    #[test]
    fn test_poll_one_blocks_until_dispatch() {
        let q = Arc::new(queue());
        q.enable_sensor(ACCEL, 20_000).unwrap();

        let consumer = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.poll_one())
        };
        thread::sleep(Duration::from_millis(20));
        q.dispatch(&accel(7)).unwrap();

        let event = consumer.join().unwrap().unwrap();
        assert_eq!(event.timestamp, 7);
        assert_eq!(event.sensor, ACCEL);
    }

    #[test]
    fn test_close_wakes_waiter() {
        let q = Arc::new(queue());
        let consumer = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.wait_for_event())
        };
        thread::sleep(Duration::from_millis(20));
        q.close();

        assert_eq!(consumer.join().unwrap(), Err(QueueError::QueueClosed));
        assert_eq!(q.state(), QueueState::Closed);
        assert_eq!(q.read(1), Err(QueueError::QueueClosed));
        assert_eq!(q.enable_sensor(ACCEL, 20_000), Err(QueueError::QueueClosed));
        assert_eq!(q.dispatch(&accel(1)), Err(QueueError::QueueClosed));
    }

    /// Claims readiness but never yields a frame
    struct LyingPipe;

    impl Transport for LyingPipe {
        fn close(&self) {}
        fn is_open(&self) -> bool {
            true
        }
        fn transport_type(&self) -> &str {
            "lying"
        }
    }

    impl FramePipe for LyingPipe {
        fn push(&self, _frame: Vec<u8>) -> TransportResult<()> {
            Ok(())
        }
        fn pull(&self) -> TransportResult<Option<Vec<u8>>> {
            Ok(None)
        }
        fn wait_readable(&self, _timeout: Option<Duration>) -> TransportResult<()> {
            Ok(())
        }
        fn pending(&self) -> usize {
            0
        }
        fn capacity(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_spurious_wakeup_is_protocol_violation() {
        let q = EventQueue::new(registry(), Arc::new(LyingPipe), QueueOptions::default());
        assert!(matches!(q.poll_one(), Err(QueueError::ProtocolViolation(_))));
    }

    #[test]
    fn test_broken_pipe_reports_transport() {
        let pipe = Arc::new(MemoryPipe::new(PipeConfig::with_capacity(4)).unwrap());
        let q = EventQueue::new(registry(), pipe.clone(), QueueOptions::default());
        pipe.sever("service died");
        assert!(matches!(q.read(1), Err(QueueError::Transport(TransportError::Broken(_)))));
        assert!(matches!(
            q.wait_for_event(),
            Err(QueueError::Transport(TransportError::Broken(_)))
        ));
    }

    #[test]
    fn test_decode_failure_after_good_frame_keeps_good_event() {
        let pipe = Arc::new(MemoryPipe::new(PipeConfig::with_capacity(4)).unwrap());
        let q = EventQueue::new(registry(), pipe.clone(), QueueOptions::default());
        pipe.push(encode_event(&accel(5)).unwrap()).unwrap();
        pipe.push(vec![9, 9]).unwrap();

        let first = q.read(10).unwrap();
        assert_eq!(first.len(), 1);
        assert!(first[0].bit_eq(&accel(5)));
        assert!(matches!(q.read(10), Err(QueueError::Transport(TransportError::Codec(_)))));
        assert!(q.read(10).unwrap().is_empty());
    }

    #[test]
    fn test_state_follows_buffer_across_drain_and_refill() {
        let q = queue();
        q.enable_sensor(ACCEL, 20_000).unwrap();
        q.dispatch(&accel(1)).unwrap();
        assert_eq!(q.state(), QueueState::Ready);
        q.read(1).unwrap();
        assert_eq!(q.state(), QueueState::Idle);
        q.dispatch(&accel(2)).unwrap();
        assert_eq!(q.state(), QueueState::Ready);
        q.wait_for_event().unwrap();
        assert_eq!(q.state(), QueueState::Ready);
        assert_eq!(q.read(5).unwrap().len(), 1);
        assert_eq!(q.state(), QueueState::Idle);
    }

    #[test]
    fn test_undecodable_frame() {
        let pipe = Arc::new(MemoryPipe::new(PipeConfig::with_capacity(4)).unwrap());
        let q = EventQueue::new(registry(), pipe.clone(), QueueOptions::default());
        pipe.push(vec![1, 2, 3]).unwrap();
        assert!(matches!(q.read(1), Err(QueueError::Transport(TransportError::Codec(_)))));
    }
}
