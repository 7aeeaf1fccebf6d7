//! Device state
//!
//! One struct holds every mutable fact about the unit: the selected
//! channel, the material table, the print/eject/error flags and the
//! duplicate-suppression state of the host protocol. It is created once at
//! boot from persisted defaults and mutated only by the dispatcher, the
//! operational loop and the recovery flows.

use super::materials::FilamentType;
use crate::platform::traits::{DeviceDefaults, DriveMode, CHANNEL_SLOTS};

/// Number of real filament channels
pub const NUM_CHANNELS: u8 = CHANNEL_SLOTS as u8;

/// Pseudo-channel index meaning "parked, nothing selected"
pub const PARK_CHANNEL: u8 = NUM_CHANNELS;

/// Firmware version reported to the host, high byte first
pub const FW_VERSION: u16 = 302;

/// Firmware build number reported to the host, high byte first
pub const FW_BUILD: u16 = 870;

/// Mutable device state, alive for the whole uptime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    /// Selected channel, `PARK_CHANNEL` when parked
    pub active_channel: u8,
    /// Channel that was active before the last selection change
    pub previous_channel: u8,
    /// Material class per channel
    pub filament_classes: [FilamentType; CHANNEL_SLOTS],
    /// A print job is driving the unit
    pub is_printing: bool,
    /// Filament is parked for removal, awaiting operator action
    pub is_ejected: bool,
    /// A recovery flow is active; dispatch of new commands is suspended
    pub in_error_state: bool,
    /// The host initiated a runout-driven tool change
    pub runout_changing: bool,
    /// A load toward the sensor is in progress
    pub sensor_loading: bool,
    /// The last tool change repeated the already-loaded channel
    pub duplicate_tool_change: bool,
    /// Tool changes since the last unload or recovery
    pub tool_changes: u16,
    /// Current stepper driver mode
    pub drive_mode: DriveMode,
}

impl DeviceState {
    /// Build boot state from persisted defaults
    ///
    /// Out-of-range values in storage are clamped (channel) or mapped to
    /// the default material class rather than trusted.
    pub fn from_defaults(defaults: &DeviceDefaults) -> Self {
        let mut filament_classes = [FilamentType::default(); CHANNEL_SLOTS];
        for (slot, &class) in filament_classes.iter_mut().zip(&defaults.filament_classes) {
            *slot = FilamentType::from_class(class).unwrap_or_default();
        }
        let active_channel = defaults.active_channel.min(PARK_CHANNEL);
        Self {
            active_channel,
            previous_channel: active_channel,
            filament_classes,
            is_printing: false,
            is_ejected: false,
            in_error_state: false,
            runout_changing: false,
            sensor_loading: false,
            duplicate_tool_change: false,
            tool_changes: 0,
            drive_mode: DriveMode::Normal,
        }
    }

    /// Snapshot the persistable part of the state
    pub fn to_defaults(&self) -> DeviceDefaults {
        let mut filament_classes = [0u8; CHANNEL_SLOTS];
        for (raw, class) in filament_classes.iter_mut().zip(&self.filament_classes) {
            *raw = class.class();
        }
        DeviceDefaults {
            active_channel: self.active_channel,
            filament_classes,
        }
    }

    /// Material class of a channel; park and out-of-range indices map to
    /// the default class
    pub fn class_of(&self, channel: u8) -> FilamentType {
        self.filament_classes
            .get(channel as usize)
            .copied()
            .unwrap_or_default()
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::from_defaults(&DeviceDefaults::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip() {
        let defaults = DeviceDefaults {
            active_channel: 2,
            filament_classes: [0, 1, 2, 0, 1],
        };
        let state = DeviceState::from_defaults(&defaults);
        assert_eq!(state.active_channel, 2);
        assert_eq!(state.previous_channel, 2);
        assert_eq!(state.filament_classes[1], FilamentType::Flexible);
        assert_eq!(state.to_defaults(), defaults);
    }

    #[test]
    fn bad_storage_values_are_sanitized() {
        let defaults = DeviceDefaults {
            active_channel: 200,
            filament_classes: [9, 0, 0, 0, 0],
        };
        let state = DeviceState::from_defaults(&defaults);
        assert_eq!(state.active_channel, PARK_CHANNEL);
        assert_eq!(state.filament_classes[0], FilamentType::Standard);
    }

    #[test]
    fn class_of_park_is_default() {
        let state = DeviceState::default();
        assert_eq!(state.class_of(PARK_CHANNEL), FilamentType::Standard);
        assert_eq!(state.class_of(42), FilamentType::Standard);
    }
}
