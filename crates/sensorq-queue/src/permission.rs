// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Injection rights carried by a caller of [`EventQueue::write`](crate::EventQueue::write)

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InjectPermission {
    Granted,
    #[default]
    Denied,
}

impl InjectPermission {
    pub fn from_allowed(allowed: bool) -> Self {
        if allowed {
            InjectPermission::Granted
        } else {
            InjectPermission::Denied
        }
    }

    pub fn is_granted(self) -> bool {
        self == InjectPermission::Granted
    }
}
