//! Material classes and motion profiles
//!
//! Feed speeds and parking lengths differ per material class. The scale
//! factors applied during recovery jogs are named here so they can be
//! tested in isolation instead of living as inline literals at the call
//! sites.

/// Material class assigned to a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilamentType {
    /// Rigid everyday material
    #[default]
    Standard,
    /// Flexible material, fed slowly
    Flexible,
    /// Soluble or otherwise delicate material
    Specialty,
}

impl FilamentType {
    /// Decode the raw wire/storage class
    pub fn from_class(class: u8) -> Option<Self> {
        match class {
            0 => Some(FilamentType::Standard),
            1 => Some(FilamentType::Flexible),
            2 => Some(FilamentType::Specialty),
            _ => None,
        }
    }

    /// Raw wire/storage class
    pub fn class(self) -> u8 {
        match self {
            FilamentType::Standard => 0,
            FilamentType::Flexible => 1,
            FilamentType::Specialty => 2,
        }
    }
}

/// Pulley feed parameters for one material class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MaterialProfile {
    /// Peak pulley feedrate in steps per second
    pub feedrate: u16,
    /// Distance from the sensor to the parking position, in steps
    pub park_steps: i32,
}

impl MaterialProfile {
    /// Feedrate scaled by one of the named factors
    pub fn scaled_feedrate(&self, scale: f32) -> u16 {
        (f32::from(self.feedrate) * scale) as u16
    }
}

/// Profiles indexed by material class
pub const PROFILES: [MaterialProfile; 3] = [
    // Standard
    MaterialProfile {
        feedrate: 650,
        park_steps: 620,
    },
    // Flexible
    MaterialProfile {
        feedrate: 350,
        park_steps: 650,
    },
    // Specialty
    MaterialProfile {
        feedrate: 550,
        park_steps: 620,
    },
];

/// Speed multiplier for jogs driven with the previous channel's material
pub const PREVIOUS_SPEED_SCALE: f32 = 1.8;

/// Overshoot multiplier for the recovery retract toward the sensor
pub const RETRACT_SCALE: f32 = 1.5;

/// Bowden tube length from pulley to print head, in pulley steps
pub const BOWDEN_LENGTH: i32 = 8900;

/// Profile for a material class
pub fn profile(class: FilamentType) -> MaterialProfile {
    PROFILES[class.class() as usize]
}

/// Retract distance used when pulling filament back to the sensor:
/// the full bowden length with overshoot, toward the spool
pub fn retract_steps() -> i32 {
    -((BOWDEN_LENGTH as f32 * RETRACT_SCALE) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_round_trip() {
        for class in 0..3 {
            assert_eq!(FilamentType::from_class(class).unwrap().class(), class);
        }
        assert_eq!(FilamentType::from_class(3), None);
    }

    #[test]
    fn flexible_feeds_slowest() {
        assert!(profile(FilamentType::Flexible).feedrate < profile(FilamentType::Specialty).feedrate);
        assert!(profile(FilamentType::Specialty).feedrate < profile(FilamentType::Standard).feedrate);
    }

    #[test]
    fn scaled_feedrate_applies_factor() {
        let p = profile(FilamentType::Standard);
        assert_eq!(p.scaled_feedrate(2.0), 2 * p.feedrate);
        assert_eq!(p.scaled_feedrate(1.0), p.feedrate);
        assert!(p.scaled_feedrate(PREVIOUS_SPEED_SCALE) > p.feedrate);
    }

    #[test]
    fn retract_overshoots_the_bowden_length() {
        assert_eq!(retract_steps(), -13350);
        assert!(retract_steps().unsigned_abs() as i32 > BOWDEN_LENGTH);
    }
}
