//! Shared transport types

pub mod config;
pub mod error;

pub use config::PipeConfig;
pub use error::{TransportError, TransportResult};
