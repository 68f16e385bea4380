// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # sensorq-observability
//!
//! Logging bootstrap for sensorq processes, with per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: timestamped run folders with daily-rotated JSON log files

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known sensorq crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "sensorq",
    "sensorq-config",
    "sensorq-structures",
    "sensorq-transports",
    "sensorq-queue",
    "sensorq-manager",
];

/// Tracing target for a crate name (`sensorq-queue` -> `sensorq_queue`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
