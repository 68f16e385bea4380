// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-process frame pipe
//!
//! A `VecDeque` of frames behind a `parking_lot` mutex, with a condition
//! variable as the readiness primitive. Waiters sleep on the condvar; nothing
//! here polls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::common::{PipeConfig, TransportError, TransportResult};
use crate::traits::{FramePipe, PipeFactory, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
enum PipeStatus {
    Open,
    Closed,
    Broken(String),
}

#[derive(Debug)]
struct PipeInner {
    frames: VecDeque<Vec<u8>>,
    status: PipeStatus,
}

impl PipeInner {
    fn check_usable(&self) -> TransportResult<()> {
        match &self.status {
            PipeStatus::Open => Ok(()),
            PipeStatus::Closed => Err(TransportError::ConnectionClosed),
            PipeStatus::Broken(reason) => Err(TransportError::Broken(reason.clone())),
        }
    }
}

/// Releases a factory slot when the pipe is dropped
#[derive(Debug)]
struct OpenSlot(Arc<AtomicUsize>);

impl Drop for OpenSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Bounded in-memory frame pipe
#[derive(Debug)]
pub struct MemoryPipe {
    capacity: usize,
    inner: Mutex<PipeInner>,
    readable: Condvar,
    _slot: Option<OpenSlot>,
}

impl MemoryPipe {
    pub fn new(config: PipeConfig) -> TransportResult<Self> {
        config.validate()?;
        Ok(Self::with_slot(config.capacity, None))
    }

    fn with_slot(capacity: usize, slot: Option<OpenSlot>) -> Self {
        Self {
            capacity,
            inner: Mutex::new(PipeInner {
                frames: VecDeque::with_capacity(capacity.min(1024)),
                status: PipeStatus::Open,
            }),
            readable: Condvar::new(),
            _slot: slot,
        }
    }

    /// Mark the pipe as failed. Buffered frames are discarded and every
    /// waiter wakes with `Broken`.
    pub fn sever(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let mut inner = self.inner.lock();
        if inner.status == PipeStatus::Open {
            warn!(reason = %reason, "Memory pipe severed");
            inner.status = PipeStatus::Broken(reason);
            inner.frames.clear();
        }
        drop(inner);
        self.readable.notify_all();
    }
}

impl Transport for MemoryPipe {
    fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.status == PipeStatus::Open {
            inner.status = PipeStatus::Closed;
            inner.frames.clear();
        }
        drop(inner);
        self.readable.notify_all();
    }

    fn is_open(&self) -> bool {
        self.inner.lock().status == PipeStatus::Open
    }

    fn transport_type(&self) -> &str {
        "memory"
    }
}

impl FramePipe for MemoryPipe {
    fn push(&self, frame: Vec<u8>) -> TransportResult<()> {
        let mut inner = self.inner.lock();
        inner.check_usable()?;
        if inner.frames.len() >= self.capacity {
            return Err(TransportError::Full {
                capacity: self.capacity,
            });
        }
        inner.frames.push_back(frame);
        drop(inner);
        self.readable.notify_one();
        Ok(())
    }

    fn pull(&self) -> TransportResult<Option<Vec<u8>>> {
        let mut inner = self.inner.lock();
        inner.check_usable()?;
        Ok(inner.frames.pop_front())
    }

    fn wait_readable(&self, timeout: Option<Duration>) -> TransportResult<()> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut inner = self.inner.lock();
        loop {
            inner.check_usable()?;
            if !inner.frames.is_empty() {
                return Ok(());
            }
            match deadline {
                None => self.readable.wait(&mut inner),
                Some(deadline) => {
                    if self.readable.wait_until(&mut inner, deadline).timed_out() {
                        inner.check_usable()?;
                        return if inner.frames.is_empty() {
                            Err(TransportError::Timeout)
                        } else {
                            Ok(())
                        };
                    }
                }
            }
        }
    }

    fn pending(&self) -> usize {
        self.inner.lock().frames.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Opens [`MemoryPipe`]s, up to `max_open` alive at once
#[derive(Debug)]
pub struct MemoryPipeFactory {
    config: PipeConfig,
    max_open: usize,
    open: Arc<AtomicUsize>,
}

impl MemoryPipeFactory {
    pub fn new(config: PipeConfig, max_open: usize) -> TransportResult<Self> {
        config.validate()?;
        if max_open == 0 {
            return Err(TransportError::InvalidConfig(
                "max_open must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            config,
            max_open,
            open: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn reserve(&self) -> TransportResult<OpenSlot> {
        self.open
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_open).then_some(n + 1)
            })
            .map_err(|_| TransportError::Exhausted {
                limit: self.max_open,
            })?;
        Ok(OpenSlot(Arc::clone(&self.open)))
    }
}

impl PipeFactory for MemoryPipeFactory {
    fn open_pipe(&self) -> TransportResult<Arc<dyn FramePipe>> {
        let slot = self.reserve()?;
        debug!(capacity = self.config.capacity, "Opening memory pipe");
        Ok(Arc::new(MemoryPipe::with_slot(self.config.capacity, Some(slot))))
    }

    fn open_count(&self) -> usize {
        self.open.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn pipe(capacity: usize) -> MemoryPipe {
        MemoryPipe::new(PipeConfig::with_capacity(capacity)).unwrap()
    }

    #[test]
    fn test_fifo_order() {
        let p = pipe(4);
        p.push(vec![1]).unwrap();
        p.push(vec![2]).unwrap();
        assert_eq!(p.pull().unwrap(), Some(vec![1]));
        assert_eq!(p.pull().unwrap(), Some(vec![2]));
        assert_eq!(p.pull().unwrap(), None);
    }

    #[test]
    fn test_full_rejects_newest() {
        let p = pipe(1);
        p.push(vec![1]).unwrap();
        assert_eq!(p.push(vec![2]), Err(TransportError::Full { capacity: 1 }));
        assert_eq!(p.pending(), 1);
        assert_eq!(p.pull().unwrap(), Some(vec![1]));
    }

    #[test]
    fn test_wait_returns_when_data_present() {
        let p = pipe(2);
        p.push(vec![7]).unwrap();
        assert!(p.wait_readable(None).is_ok());
        assert_eq!(p.pending(), 1);
    }

    #[test]
    fn test_wait_timeout() {
        let p = pipe(2);
        let err = p.wait_readable(Some(Duration::from_millis(20))).unwrap_err();
        assert_eq!(err, TransportError::Timeout);
    }

    #[test]
    fn test_wait_wakes_on_push() {
        let p = Arc::new(pipe(2));
        let waiter = {
            let p = Arc::clone(&p);
            thread::spawn(move || p.wait_readable(Some(Duration::from_secs(5))))
        };
        thread::sleep(Duration::from_millis(20));
        p.push(vec![9]).unwrap();
        assert!(waiter.join().unwrap().is_ok());
    }

    #[test]
    fn test_close_wakes_waiter() {
        let p = Arc::new(pipe(2));
        let waiter = {
            let p = Arc::clone(&p);
            thread::spawn(move || p.wait_readable(None))
        };
        thread::sleep(Duration::from_millis(20));
        p.close();
        assert_eq!(waiter.join().unwrap(), Err(TransportError::ConnectionClosed));
        assert!(!p.is_open());
        assert_eq!(p.push(vec![1]), Err(TransportError::ConnectionClosed));
    }

    #[test]
    fn test_sever_reports_broken() {
        let p = pipe(2);
        p.push(vec![1]).unwrap();
        p.sever("peer died");
        assert_eq!(p.pull(), Err(TransportError::Broken("peer died".to_string())));
        assert_eq!(
            p.wait_readable(None),
            Err(TransportError::Broken("peer died".to_string()))
        );
    }

    #[test]
    fn test_factory_limit_and_release() {
        let factory = MemoryPipeFactory::new(PipeConfig::with_capacity(4), 2).unwrap();
        let a = factory.open_pipe().unwrap();
        let _b = factory.open_pipe().unwrap();
        assert_eq!(factory.open_count(), 2);
        assert!(matches!(
            factory.open_pipe(),
            Err(TransportError::Exhausted { limit: 2 })
        ));

        drop(a);
        assert_eq!(factory.open_count(), 1);
        assert!(factory.open_pipe().is_ok());
    }
}
