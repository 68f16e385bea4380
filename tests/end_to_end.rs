//! End-to-end behaviour through the umbrella crate: manager, queues and the
//! token boundary together.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use sensorq::prelude::*;

fn two_sensor_config(allow_injection: bool) -> SensorqConfig {
    let mut config = SensorqConfig::default();
    config.injection.allow = allow_injection;
    config.queue.capacity = 32;
    config.sensors = vec![
        SensorDescriptor::new(1, "Accelerometer", SensorType::Accelerometer)
            .with_vendor("Acme")
            .with_min_delay(10_000),
        SensorDescriptor::new(2, "Magnetometer", SensorType::MagneticField).with_min_delay(20_000),
    ];
    config
}

#[test]
fn inject_poll_disable_scenario() {
    let manager = SensorManager::from_config(&two_sensor_config(true)).unwrap();
    let queue = manager.create_event_queue().unwrap();
    let permission = manager.injection_permission();

    queue.enable_sensor(SensorHandle(1), 20_000).unwrap();
    let event = SensorEvent::new(1, SensorType::Accelerometer, [0.0, 9.8, 0.0], 3, 100);
    assert_eq!(queue.write(&event, permission).unwrap(), 1);

    let polled = queue.poll_one().unwrap();
    assert!(polled.bit_eq(&event));

    queue.disable_sensor(SensorHandle(1)).unwrap();
    assert_eq!(queue.write(&event, permission).unwrap(), 0);
    assert!(queue.read(1).unwrap().is_empty());
}

#[test]
fn injected_event_round_trips_bit_exact() {
    let manager = SensorManager::from_config(&two_sensor_config(true)).unwrap();
    let queue = manager.create_event_queue().unwrap();
    queue.enable_sensor(SensorHandle(2), 0).unwrap();

    let event = SensorEvent::new(
        2,
        SensorType::MagneticField,
        [f32::from_bits(0x7fc0_0001), -0.0, f32::MIN_POSITIVE],
        accuracy::LOW,
        i64::MAX,
    );
    queue.write(&event, InjectPermission::Granted).unwrap();
    let read = queue.read(8).unwrap();
    assert_eq!(read.len(), 1);
    assert!(read[0].bit_eq(&event));
}

#[test]
fn enable_state_is_last_write_wins() {
    let manager = SensorManager::from_config(&two_sensor_config(false)).unwrap();
    let queue = manager.create_event_queue().unwrap();
    let h = SensorHandle(1);

    let calls: &[Option<u32>] = &[Some(50_000), None, Some(30_000), Some(70_000), None, None, Some(40_000)];
    for call in calls {
        match call {
            Some(delay) => queue.enable_sensor(h, *delay).unwrap(),
            None => queue.disable_sensor(h).unwrap(),
        }
        assert_eq!(queue.enabled_delay(h), *call);
    }
}

#[test]
fn wait_then_read_never_empty_with_own_writes() {
    let manager = SensorManager::from_config(&two_sensor_config(true)).unwrap();
    let queue = manager.create_event_queue().unwrap();
    queue.enable_sensor(SensorHandle(1), 20_000).unwrap();

    let writer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for ts in 1..=20 {
                let event = SensorEvent::new(1, SensorType::Accelerometer, [ts as f32, 0.0, 0.0], 3, ts);
                queue.write(&event, InjectPermission::Granted).unwrap();
                thread::sleep(Duration::from_millis(1));
            }
        })
    };

    let mut seen = 0;
    while seen < 20 {
        queue.wait_for_event().unwrap();
        let events = queue.read(usize::MAX).unwrap();
        assert!(!events.is_empty());
        seen += events.len();
    }
    writer.join().unwrap();
    assert_eq!(queue.stats().injected, 20);
}

#[test]
fn destroying_token_unblocks_poll_in_bounded_time() {
    let manager = Arc::new(SensorManager::from_config(&two_sensor_config(false)).unwrap());
    let bridge = Arc::new(SensorBridge::new(manager));
    let token = bridge.create_queue().unwrap();
    assert!(bridge.enable(token, 1, 20_000));

    let (tx, rx) = std::sync::mpsc::channel();
    {
        let bridge = Arc::clone(&bridge);
        thread::spawn(move || {
            let _ = tx.send(bridge.poll_one(token));
        });
    }
    thread::sleep(Duration::from_millis(20));

    let start = Instant::now();
    assert!(bridge.destroy_queue(token));
    let result = rx.recv_timeout(Duration::from_secs(5)).expect("poll did not return");
    assert_eq!(result, None);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(!bridge.enable(token, 1, 20_000));
}

#[test]
fn cursor_visits_each_sensor_once_then_wraps() {
    let manager = SensorManager::from_config(&two_sensor_config(false)).unwrap();
    let bridge = SensorBridge::new(Arc::new(manager));

    let mut names = Vec::new();
    let mut index = 0;
    loop {
        let (descriptor, next) = bridge.next_sensor(index).unwrap();
        names.push(descriptor.name);
        if next == 0 {
            break;
        }
        index = next;
    }
    assert_eq!(names, vec!["Accelerometer", "Magnetometer"]);
    assert!(bridge.next_sensor(2).is_none());
    assert!(bridge.next_sensor(usize::MAX).is_none());
}

#[test]
fn hardware_dispatch_reaches_bridge_pollers() {
    let manager = Arc::new(SensorManager::from_config(&two_sensor_config(false)).unwrap());
    let bridge = SensorBridge::new(Arc::clone(&manager));
    let a = bridge.create_queue().unwrap();
    let b = bridge.create_queue().unwrap();
    bridge.enable(a, 1, 20_000);
    bridge.enable(b, 2, 20_000);

    let accel = SensorEvent::new(1, SensorType::Accelerometer, [0.1, 0.2, 9.7], 3, 10);
    let mag = SensorEvent::new(2, SensorType::MagneticField, [30.0, -2.0, 45.0], 2, 10);
    assert_eq!(manager.dispatch(&accel), 1);
    assert_eq!(manager.dispatch(&mag), 1);

    let from_a = bridge.poll_one(a).unwrap();
    assert_eq!((from_a.sensor, from_a.timestamp), (1, 10));
    let from_b = bridge.poll_one(b).unwrap();
    assert_eq!((from_b.sensor, from_b.values), (2, [30.0, -2.0, 45.0]));

    assert_eq!(
        manager.active_sensors(),
        vec![(SensorHandle(1), 20_000), (SensorHandle(2), 20_000)]
    );
    bridge.destroy_queue(a);
    assert_eq!(manager.active_sensors(), vec![(SensorHandle(2), 20_000)]);
}
