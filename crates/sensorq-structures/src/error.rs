// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::SensorHandle;

/// Frame encode/decode failures
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Frame length {actual} does not match expected {expected}")]
    FrameLength { expected: usize, actual: usize },

    #[error("Frame serialization failed: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Registry construction failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate sensor handle {0}")]
    DuplicateHandle(SensorHandle),
}
