//! Filament sensor and button interfaces

/// Debounced operator button states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// No button pressed
    #[default]
    None,
    Left,
    Middle,
    Right,
}

/// Binary filament presence sensor at the reference point
pub trait FilamentSensorInterface {
    /// True while filament is detected
    fn filament_present(&self) -> bool;
}

/// Operator button pad
///
/// The board implementation owns ADC sampling and debouncing; one call
/// reports the currently registered click.
pub trait ButtonInterface {
    /// Currently registered button click, `Button::None` when idle
    fn clicked(&mut self) -> Button;
}
