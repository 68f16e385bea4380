// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sensor queue probe.
//!
//! Loads `sensorq_configuration.toml`, lists the registry with the
//! enumeration cursor, then opens a queue, enables every sensor, feeds it a
//! few synthetic hardware samples and prints what comes back.
//!
//! Usage: sensorq-probe [--config <path>] [--samples <n>] [--debug-<crate>] [--debug-all]

use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use sensorq::observability::{debug_flags_help, init_console_logging, parse_debug_flags, LogFormat};
use sensorq::prelude::*;
use tracing::info;

struct Args {
    config: Option<PathBuf>,
    samples: usize,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: sensorq-probe [--config <path>] [--samples <n>]\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        samples: 5,
    };
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().unwrap_or_else(|| usage_and_exit());
                args.config = Some(PathBuf::from(value));
            }
            "--samples" => {
                let value = iter.next().unwrap_or_else(|| usage_and_exit());
                args.samples = value
                    .parse()
                    .with_context(|| format!("--samples expects a number, got {value}"))?;
            }
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other => bail!("Unknown argument: {other}"),
        }
    }
    Ok(args)
}

#[cfg(feature = "file-logging")]
fn init_tracing(config: &SensorqConfig, format: LogFormat) -> Result<Option<sensorq::observability::LoggingGuard>> {
    let flags = parse_debug_flags();
    if !config.logging.file_logging {
        init_console_logging(&flags, &config.system.log_level, format)?;
        return Ok(None);
    }
    let guard = sensorq::observability::init_logging(
        &flags,
        &config.system.log_level,
        format,
        &config.logging.log_dir,
        config.logging.retention_days,
        config.logging.retention_runs,
    )?;
    Ok(Some(guard))
}

#[cfg(not(feature = "file-logging"))]
fn init_tracing(config: &SensorqConfig, format: LogFormat) -> Result<()> {
    init_console_logging(&parse_debug_flags(), &config.system.log_level, format)
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let config = sensorq::config::load_config(args.config.as_deref(), None)
        .context("Failed to load sensorq configuration")?;
    sensorq::config::validate_config(&config)?;

    let format: LogFormat = config.logging.format.parse().map_err(anyhow::Error::msg)?;
    let _logging = init_tracing(&config, format)?;

    let manager = Arc::new(SensorManager::from_config_file(args.config.clone())?);
    let registry = manager.sensor_list();
    if registry.is_empty() {
        bail!("No sensors configured");
    }

    println!("{} sensor(s):", registry.len());
    let mut index = 0;
    loop {
        let Some((sensor, next)) = registry.next_sensor(index) else {
            break;
        };
        println!(
            "  {:>4}  {:<24} {:<20} min_delay={}us",
            sensor.handle, sensor.name, sensor.sensor_type, sensor.min_delay_us
        );
        if next == 0 {
            break;
        }
        index = next;
    }

    let queue = manager.create_event_queue()?;
    for sensor in registry.iter() {
        queue.enable_sensor(sensor.handle, 20_000)?;
    }
    info!(active = ?manager.active_sensors(), "Sensors enabled");

    let producer = {
        let manager = Arc::clone(&manager);
        let registry = Arc::clone(&registry);
        let samples = args.samples;
        thread::spawn(move || {
            let start = Instant::now();
            let mut delivered = 0;
            for n in 0..samples {
                for sensor in registry.iter() {
                    let ts = start.elapsed().as_nanos() as i64 + 1;
                    let event = SensorEvent::for_sensor(sensor, [n as f32, 0.0, 0.0], accuracy::HIGH, ts);
                    delivered += manager.dispatch(&event);
                }
                thread::sleep(Duration::from_millis(20));
            }
            delivered
        })
    };

    // Drain until the producer is done and the queue stays quiet
    let mut received = 0;
    loop {
        match queue.wait_for_event_timeout(Duration::from_millis(200)) {
            Ok(()) => {}
            Err(QueueError::Timeout) if producer.is_finished() && queue.pending() == 0 => break,
            Err(QueueError::Timeout) => continue,
            Err(e) => return Err(e.into()),
        }
        for event in queue.read(usize::MAX)? {
            received += 1;
            println!(
                "  sensor {:>4} t={:>12}ns values={:?} accuracy={}",
                event.sensor, event.timestamp, event.values, event.accuracy
            );
        }
    }
    let Ok(delivered) = producer.join() else {
        bail!("Producer thread panicked");
    };
    println!("received {received} of {delivered} delivered");

    println!("stats: {:?}", queue.stats());
    queue.close();
    Ok(())
}
