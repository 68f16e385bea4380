//! Pipe configuration

use serde::{Deserialize, Serialize};

use super::error::{TransportError, TransportResult};

/// Settings for one frame pipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipeConfig {
    /// Frames held before `push` reports `Full`
    pub capacity: usize,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

impl PipeConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn validate(&self) -> TransportResult<()> {
        if self.capacity == 0 {
            return Err(TransportError::InvalidConfig(
                "pipe capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
