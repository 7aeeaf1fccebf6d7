#![cfg_attr(not(test), no_std)]

//! mm-control - control core for a multi-material filament feeding unit
//!
//! This library implements the host serial protocol with reliable delivery,
//! the command dispatcher, the operational state machine and the
//! operator-assisted fault recovery flows of a multi-material unit. All
//! hardware access (steppers, filament sensor, buttons, indicator LEDs,
//! persistent storage, serial transmitter) goes through the trait interfaces
//! in [`platform`], so the whole control core runs unmodified on the host
//! for testing.

#[cfg(any(test, feature = "mock"))]
extern crate std;

// Device control: dispatcher, state machine, recovery flows
pub mod control;

// Logging macros (defmt on target, println! under test)
pub mod logging;

// Hardware abstraction: trait interfaces and the mock board
pub mod platform;

// Host link: framing, receive mailbox, reply session, command vocabulary
pub mod protocol;

#[cfg(test)]
mod session_tests;
