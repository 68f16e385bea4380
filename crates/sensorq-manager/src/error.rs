// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Manager error types

use sensorq_structures::RegistryError;
use sensorq_transports::TransportError;
use thiserror::Error;

use crate::source::SourceError;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Sensor source error: {0}")]
    Source(#[from] SourceError),

    /// Pipe could not be opened; includes the queue limit being reached
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

pub type ManagerResult<T> = Result<T, ManagerError>;
