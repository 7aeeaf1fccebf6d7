//! Persistent configuration storage

use crate::platform::Result;

/// Number of physical filament channels
pub const CHANNEL_SLOTS: usize = 5;

/// Boot defaults persisted across power cycles
///
/// `active_channel` may be the park index (one past the last slot);
/// `filament_classes` holds the raw material class per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceDefaults {
    pub active_channel: u8,
    pub filament_classes: [u8; CHANNEL_SLOTS],
}

impl Default for DeviceDefaults {
    fn default() -> Self {
        Self {
            active_channel: CHANNEL_SLOTS as u8,
            filament_classes: [0; CHANNEL_SLOTS],
        }
    }
}

/// Storage collaborator interface
pub trait StorageInterface {
    /// Load persisted defaults
    fn load(&mut self) -> Result<DeviceDefaults>;

    /// Persist defaults
    fn save(&mut self, defaults: &DeviceDefaults) -> Result<()>;
}
