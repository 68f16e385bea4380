// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sensor descriptor registry
//!
//! An ordered, immutable list of descriptors. Order is whatever the source
//! reported and stays fixed for the lifetime of the registry; index-based
//! callers walk it through [`SensorRegistry::next_sensor`].

use std::collections::HashMap;

use crate::{RegistryError, SensorDescriptor, SensorHandle};

#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    sensors: Vec<SensorDescriptor>,
    by_handle: HashMap<SensorHandle, usize>,
}

impl SensorRegistry {
    /// Build a registry, rejecting duplicate handles
    pub fn new(sensors: Vec<SensorDescriptor>) -> Result<Self, RegistryError> {
        let mut by_handle = HashMap::with_capacity(sensors.len());
        for (position, sensor) in sensors.iter().enumerate() {
            if by_handle.insert(sensor.handle, position).is_some() {
                return Err(RegistryError::DuplicateHandle(sensor.handle));
            }
        }
        Ok(Self { sensors, by_handle })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn get(&self, handle: SensorHandle) -> Option<&SensorDescriptor> {
        self.by_handle.get(&handle).map(|&position| &self.sensors[position])
    }

    pub fn contains(&self, handle: SensorHandle) -> bool {
        self.by_handle.contains_key(&handle)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SensorDescriptor> {
        self.sensors.iter()
    }

    pub fn descriptors(&self) -> &[SensorDescriptor] {
        &self.sensors
    }

    /// Restartable enumeration cursor.
    ///
    /// Returns the descriptor at `index` together with the index to pass on the
    /// next call, which wraps to `0` after the last element. Returns `None` when
    /// `index` is out of bounds (including any index on an empty registry).
    pub fn next_sensor(&self, index: usize) -> Option<(&SensorDescriptor, usize)> {
        let descriptor = self.sensors.get(index)?;
        let next = index + 1;
        Some((descriptor, if next < self.sensors.len() { next } else { 0 }))
    }
}

impl<'a> IntoIterator for &'a SensorRegistry {
    type Item = &'a SensorDescriptor;
    type IntoIter = std::slice::Iter<'a, SensorDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
