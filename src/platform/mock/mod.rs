//! Mock board implementation for testing
//!
//! This module provides in-memory implementations of the platform traits so
//! the whole control core can be exercised without hardware.
//!
//! # Feature Gate
//!
//! Available during test builds (`#[cfg(test)]`) and when the `mock`
//! feature is enabled (host only).

#![cfg(any(test, feature = "mock"))]

mod board;
mod clock;
mod motion;
mod panel;
mod sensors;
mod serial;
mod storage;

pub use board::MockBoard;
pub use clock::MockClock;
pub use motion::{MockMotion, MotionEvent};
pub use panel::MockPanel;
pub use sensors::{MockButtons, MockFilamentSensor};
pub use serial::MockSerial;
pub use storage::MockStorage;
