// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always available. With the `file-logging` feature a
//! timestamped run folder is created holding one JSON log per crate plus a
//! combined log, and older runs are pruned by age and count.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

/// Console log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

fn console_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed(),
    }
}

/// Build the filter for the given flags and default level
pub fn build_filter(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<EnvFilter> {
    let directives = debug_flags.to_filter_string(&default_level.to_lowercase());
    EnvFilter::try_new(&directives).with_context(|| format!("Invalid log filter: {}", directives))
}

/// Install a console-only subscriber
///
/// # Errors
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_console_logging(
    debug_flags: &CrateDebugFlags,
    default_level: &str,
    format: LogFormat,
) -> Result<()> {
    let filter = build_filter(debug_flags, default_level)?;
    Registry::default()
        .with(console_layer(format).with_filter(filter))
        .try_init()
        .context("Failed to install tracing subscriber")
}

#[cfg(feature = "file-logging")]
pub use file::{init_logging, LoggingGuard};

#[cfg(feature = "file-logging")]
mod file {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use chrono::{DateTime, NaiveDateTime, Utc};
    use tracing_appender::rolling;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer, Registry};

    use super::{build_filter, console_layer, LogFormat};
    use crate::cli::CrateDebugFlags;
    use crate::{crate_target, KNOWN_CRATES};

    /// Keeps the non-blocking writers alive; logs flush on drop
    pub struct LoggingGuard {
        _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
        log_dir: PathBuf,
    }

    impl LoggingGuard {
        /// Run folder holding this process's log files
        pub fn log_dir(&self) -> &Path {
            &self.log_dir
        }
    }

    /// Initialize console plus file logging
    ///
    /// Creates:
    /// ```text
    /// <log_dir>/
    ///   └── run_20250101_120000/
    ///       ├── sensorq-queue.log
    ///       ├── sensorq-manager.log
    ///       └── sensorq.log (combined)
    /// ```
    pub fn init_logging(
        debug_flags: &CrateDebugFlags,
        default_level: &str,
        format: LogFormat,
        log_dir: &Path,
        retention_days: u64,
        retention_runs: usize,
    ) -> Result<LoggingGuard> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let run_folder = log_dir.join(format!("run_{}", timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_logs(log_dir, &run_folder, retention_days, retention_runs)?;

        let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
        let mut file_guards = Vec::new();

        layers.push(
            console_layer(format)
                .with_filter(build_filter(debug_flags, default_level)?)
                .boxed(),
        );

        for crate_name in KNOWN_CRATES {
            let file_appender = rolling::daily(&run_folder, format!("{}.log", crate_name));
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            file_guards.push(guard);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(EnvFilter::new(format!("{}=debug", crate_target(crate_name))))
                .boxed();
            layers.push(file_layer);
        }

        let combined_appender = rolling::daily(&run_folder, "sensorq.log");
        let (combined_non_blocking, combined_guard) = tracing_appender::non_blocking(combined_appender);
        file_guards.push(combined_guard);

        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(combined_non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(build_filter(debug_flags, default_level)?)
                .boxed(),
        );

        Registry::default()
            .with(layers)
            .try_init()
            .context("Failed to install tracing subscriber")?;

        Ok(LoggingGuard {
            _file_guards: file_guards,
            log_dir: run_folder,
        })
    }

    /// Remove run folders older than `retention_days`, then trim to the newest
    /// `retention_runs`. The current run folder is never removed.
    fn cleanup_old_logs(
        base_log_dir: &Path,
        current_run: &Path,
        retention_days: u64,
        retention_runs: usize,
    ) -> Result<()> {
        if !base_log_dir.exists() {
            return Ok(());
        }

        let cutoff_date = Utc::now() - chrono::Duration::days(retention_days as i64);
        let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();

        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() || path == current_run {
                continue;
            }
            let stamp = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix("run_"))
                .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y%m%d_%H%M%S").ok());
            if let Some(naive) = stamp {
                runs.push((path, naive.and_utc()));
            }
        }

        // newest first
        runs.sort_by(|a, b| b.1.cmp(&a.1));

        // the current run occupies one retention slot
        let keep = retention_runs.saturating_sub(1);
        for (position, (path, started)) in runs.iter().enumerate() {
            if *started < cutoff_date || position >= keep {
                if let Err(e) = std::fs::remove_dir_all(path) {
                    eprintln!("Warning: Failed to remove old log directory {}: {}", path.display(), e);
                }
            }
        }

        Ok(())
    }

}
