//! Platform abstraction traits
//!
//! This module defines the traits that board implementations must provide.

pub mod board;
pub mod clock;
pub mod motion;
pub mod panel;
pub mod sensors;
pub mod serial;
pub mod storage;

// Re-export trait interfaces
pub use board::Board;
pub use clock::ClockInterface;
pub use motion::{Axis, DriveMode, MotionInterface, MotionProfile, MoveResult};
pub use panel::{LedImage, LedPanelInterface};
pub use sensors::{Button, ButtonInterface, FilamentSensorInterface};
pub use serial::SerialInterface;
pub use storage::{DeviceDefaults, StorageInterface, CHANNEL_SLOTS};
