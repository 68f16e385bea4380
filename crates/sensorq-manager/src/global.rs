// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Optional process-wide manager.
//!
//! Nothing in this crate requires a global; boundary code that cannot carry
//! a manager reference installs one at startup and looks it up here.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::manager::SensorManager;

static INSTANCE: OnceCell<Arc<SensorManager>> = OnceCell::new();

/// Install the process-wide manager. Only the first call succeeds; later
/// calls get their manager back unchanged.
pub fn install(manager: Arc<SensorManager>) -> Result<(), Arc<SensorManager>> {
    match INSTANCE.set(manager) {
        Ok(()) => {
            info!("Global sensor manager installed");
            Ok(())
        }
        Err(rejected) => {
            warn!("Global sensor manager already installed");
            Err(rejected)
        }
    }
}

/// The installed manager, or `None` before [`install`]
pub fn instance() -> Option<Arc<SensorManager>> {
    INSTANCE.get().cloned()
}
