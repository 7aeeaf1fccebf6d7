//! Mock persistent storage for testing

use std::vec::Vec;

use crate::platform::error::{PlatformError, StorageError};
use crate::platform::traits::{DeviceDefaults, StorageInterface};
use crate::platform::Result;

/// Mock storage with injectable load failure and a save log
#[derive(Debug, Default)]
pub struct MockStorage {
    pub defaults: DeviceDefaults,
    pub fail_load: bool,
    saves: Vec<DeviceDefaults>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every persisted snapshot, oldest first
    pub fn saves(&self) -> &[DeviceDefaults] {
        &self.saves
    }
}

impl StorageInterface for MockStorage {
    fn load(&mut self) -> Result<DeviceDefaults> {
        if self.fail_load {
            return Err(PlatformError::Storage(StorageError::ReadFailed));
        }
        Ok(self.defaults)
    }

    fn save(&mut self, defaults: &DeviceDefaults) -> Result<()> {
        self.defaults = *defaults;
        self.saves.push(*defaults);
        Ok(())
    }
}
