//! Platform abstraction layer
//!
//! This module isolates every hardware touchpoint of the control core behind
//! trait interfaces. The core never programs stepper drivers, samples the
//! button ADC or shifts LED registers directly; a board implementation
//! provides those behind the narrow interfaces in [`traits`].

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result, StorageError};
pub use traits::{
    Board, Button, ButtonInterface, ClockInterface, FilamentSensorInterface, LedPanelInterface,
    MotionInterface, SerialInterface, StorageInterface,
};
