//! Producer/consumer behaviour of a single queue under real threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sensorq_queue::{EventQueue, InjectPermission, QueueError, QueueOptions, SharedRegistry};
use sensorq_structures::{SensorDescriptor, SensorEvent, SensorHandle, SensorRegistry, SensorType};
use sensorq_transports::{MemoryPipe, PipeConfig};

const ACCEL: SensorHandle = SensorHandle(1);
const GYRO: SensorHandle = SensorHandle(4);

fn new_queue(capacity: usize) -> Arc<EventQueue> {
    let registry = SharedRegistry::new(
        SensorRegistry::new(vec![
            SensorDescriptor::new(ACCEL, "Accelerometer", SensorType::Accelerometer),
            SensorDescriptor::new(GYRO, "Gyroscope", SensorType::Gyroscope),
        ])
        .unwrap(),
    );
    let pipe = Arc::new(MemoryPipe::new(PipeConfig::with_capacity(capacity)).unwrap());
    Arc::new(EventQueue::new(registry, pipe, QueueOptions::default()))
}

fn event(sensor: SensorHandle, ts: i64) -> SensorEvent {
    let sensor_type = if sensor == ACCEL {
        SensorType::Accelerometer
    } else {
        SensorType::Gyroscope
    };
    SensorEvent::new(sensor, sensor_type, [ts as f32, 0.0, 0.0], 3, ts)
}

#[test]
fn per_sensor_order_preserved_across_threads() {
    let queue = new_queue(4096);
    queue.enable_sensor(ACCEL, 0).unwrap();
    queue.enable_sensor(GYRO, 0).unwrap();

    let producers: Vec<_> = [ACCEL, GYRO]
        .into_iter()
        .map(|sensor| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for ts in 1..=500 {
                    assert_eq!(queue.dispatch(&event(sensor, ts)).unwrap(), 1);
                }
            })
        })
        .collect();

    let mut last = std::collections::HashMap::new();
    for _ in 0..1000 {
        let e = queue.poll_one().unwrap();
        let prev = last.insert(e.sensor, e.timestamp).unwrap_or(0);
        assert!(e.timestamp > prev, "{} went backwards: {} after {}", e.sensor, e.timestamp, prev);
    }
    for p in producers {
        p.join().unwrap();
    }
    assert_eq!(last.get(&ACCEL), Some(&500));
    assert_eq!(last.get(&GYRO), Some(&500));
    assert_eq!(queue.stats().delivered, 1000);
}

#[test]
fn nothing_buffered_after_disable_returns() {
    let queue = new_queue(100_000);
    queue.enable_sensor(ACCEL, 0).unwrap();

    let running = Arc::new(AtomicBool::new(true));
    let producer = {
        let queue = Arc::clone(&queue);
        let running = Arc::clone(&running);
        thread::spawn(move || {
            let mut ts = 0;
            while running.load(Ordering::Relaxed) {
                ts += 1;
                queue.dispatch(&event(ACCEL, ts)).unwrap();
            }
        })
    };

    thread::sleep(Duration::from_millis(10));
    queue.disable_sensor(ACCEL).unwrap();
    let buffered_at_disable = queue.pending();
    thread::sleep(Duration::from_millis(10));
    running.store(false, Ordering::Relaxed);
    producer.join().unwrap();

    assert_eq!(queue.pending(), buffered_at_disable);
    assert_eq!(queue.read(usize::MAX).unwrap().len(), buffered_at_disable);
}

#[test]
fn close_wakes_blocked_poll() {
    let queue = new_queue(8);
    queue.enable_sensor(ACCEL, 0).unwrap();

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.poll_one())
    };
    thread::sleep(Duration::from_millis(20));
    queue.close();

    assert_eq!(consumer.join().unwrap(), Err(QueueError::QueueClosed));
    assert_eq!(
        queue.write(&event(ACCEL, 1), InjectPermission::Granted),
        Err(QueueError::QueueClosed)
    );
}
