//! Root board trait
//!
//! This module defines the root trait that aggregates all collaborator
//! interfaces of one physical unit.

use super::{
    ButtonInterface, ClockInterface, FilamentSensorInterface, LedPanelInterface, MotionInterface,
    SerialInterface, StorageInterface,
};

/// Root board trait
///
/// A board implementation supplies concrete types for each collaborator via
/// associated types, giving the control core compile-time dispatch with no
/// trait objects.
///
/// # Example
///
/// ```ignore
/// pub struct Mm2Board { /* peripherals */ }
///
/// impl Board for Mm2Board {
///     type Motion = TmcMotion;
///     type Sensor = FindaSensor;
///     // ... remaining associated types
///
///     fn motion(&mut self) -> &mut Self::Motion { &mut self.motion }
///     // ... remaining accessors
/// }
/// ```
pub trait Board {
    /// Stepper motion collaborator
    type Motion: MotionInterface;

    /// Filament presence sensor
    type Sensor: FilamentSensorInterface;

    /// Operator button pad
    type Buttons: ButtonInterface;

    /// Channel indicator panel
    type Panel: LedPanelInterface;

    /// Persistent configuration storage
    type Storage: StorageInterface;

    /// Host link transmitter
    type Serial: SerialInterface;

    /// Monotonic clock
    type Clock: ClockInterface;

    fn motion(&mut self) -> &mut Self::Motion;

    fn sensor(&self) -> &Self::Sensor;

    fn buttons(&mut self) -> &mut Self::Buttons;

    fn panel(&mut self) -> &mut Self::Panel;

    fn storage(&mut self) -> &mut Self::Storage;

    fn serial(&mut self) -> &mut Self::Serial;

    fn clock(&self) -> &Self::Clock;

    /// Arm a hardware reset that fires after `delay_ms`
    ///
    /// The delay leaves time for a reply frame to drain before the part
    /// restarts.
    fn arm_reset(&mut self, delay_ms: u32);
}
