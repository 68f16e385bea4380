//! # sensorq-transports
//!
//! Transport abstraction layer for sensorq event queues.
//!
//! A queue owns one [`FramePipe`]: a bounded, ordered buffer of encoded event
//! frames with a blocking readiness primitive. Pipes are opened through a
//! [`PipeFactory`], which is where resource limits are enforced.
//!
//! ## Example
//!
//! ```rust
//! use sensorq_transports::prelude::*;
//!
//! let factory = MemoryPipeFactory::new(PipeConfig::with_capacity(8), 4)?;
//! let pipe = factory.open_pipe()?;
//!
//! pipe.push(vec![1, 2, 3])?;
//! pipe.wait_readable(None)?;
//! assert_eq!(pipe.pull()?, Some(vec![1, 2, 3]));
//! # Ok::<(), sensorq_transports::TransportError>(())
//! ```
//!
//! ## Architecture
//!
//! 1. **Common**: shared types (errors, configs)
//! 2. **Traits**: transport-agnostic interfaces
//! 3. **Implementations**: the in-memory pipe

pub mod common;
pub mod memory;
pub mod traits;

pub use common::{PipeConfig, TransportError, TransportResult};
pub use memory::{MemoryPipe, MemoryPipeFactory};
pub use traits::{FramePipe, PipeFactory, Transport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::common::*;
    pub use crate::memory::*;
    pub use crate::traits::*;
}
