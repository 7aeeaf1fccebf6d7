//! Stepper motion interface
//!
//! The selector, idler and pulley mechanisms are driven through this trait.
//! Step-pulse generation, motion-profile math and stall-detection thresholds
//! live entirely in the board implementation; the control core only sees
//! move outcomes and per-axis stall counters.

/// One of the three stepper-driven mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// Channel selection carriage
    Selector,
    /// Filament engagement arm
    Idler,
    /// Filament feed pulley
    Pulley,
}

/// Outcome of a motion primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveResult {
    /// Target reached (or sensor condition met)
    Success,
    /// Move aborted: stall, jam, or sensor condition never met
    Failed,
}

/// Acceleration profile selection for a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionProfile {
    /// Standard acceleration
    Normal,
    /// Reduced acceleration for delicate feeds
    Soft,
}

/// Stepper driver chopper mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveMode {
    /// Full-power mode
    #[default]
    Normal,
    /// Quiet mode with reduced torque
    Stealth,
}

/// Motion collaborator interface
///
/// Conventions:
/// - Pulley steps are positive toward the print head, negative toward the
///   spool.
/// - Any move or positioning call implicitly powers the axis driver.
/// - Per-axis stall counters count consecutive failed positioning attempts;
///   they are maintained by the implementation and cleared explicitly after
///   operator-assisted recovery.
pub trait MotionInterface {
    /// Engage or park the idler so the pulley grips (or releases) filament
    fn engage_pulley(&mut self, engage: bool);

    /// Move an axis by a relative number of steps
    ///
    /// # Arguments
    ///
    /// * `axis` - Axis to move
    /// * `steps` - Relative distance in steps (sign per the pulley convention)
    /// * `feedrate` - Peak speed in steps per second
    /// * `profile` - Acceleration profile
    /// * `stop_on_sensor` - When true, a filament sensor state change ends
    ///   the move successfully; exhausting the distance without a sensor
    ///   change is a `Failed` result
    fn move_axis(
        &mut self,
        axis: Axis,
        steps: i32,
        feedrate: u16,
        profile: MotionProfile,
        stop_on_sensor: bool,
    ) -> MoveResult;

    /// Move the selector carriage to a channel position (park allowed)
    fn position_selector(&mut self, channel: u8) -> MoveResult;

    /// Move the idler arm to a channel position (park allowed)
    fn position_idler(&mut self, channel: u8) -> MoveResult;

    /// Re-establish the selector at its last known channel after a stall
    fn restore_selector(&mut self, channel: u8);

    /// Re-establish the idler at its last known channel after a stall
    fn restore_idler(&mut self, channel: u8);

    /// Home selector and idler
    ///
    /// With `restore_position` the axes return to the previously active
    /// channel after touching their end stops.
    fn home(&mut self, restore_position: bool) -> MoveResult;

    /// Power one axis driver
    fn enable_axis(&mut self, axis: Axis);

    /// Cut power to one axis driver
    fn disable_axis(&mut self, axis: Axis);

    /// Cut power to every axis driver
    fn disable_all(&mut self);

    /// True while at least one axis driver is powered
    fn any_axis_enabled(&self) -> bool;

    /// Reconfigure all axis drivers for the given chopper mode
    fn configure_mode(&mut self, mode: DriveMode);

    /// Consecutive stall count for an axis
    fn stall_count(&self, axis: Axis) -> u8;

    /// Clear the stall count for an axis
    fn clear_stall_count(&mut self, axis: Axis);
}
