//! Host link protocol
//!
//! The host speaks a fixed-size framed protocol: three payload bytes plus a
//! 16-bit additive checksum in each direction, with single-byte ACK/NAK for
//! link control. This module provides the frame codec, the single-slot
//! receive mailbox fed by the asynchronous receive path, the stop-and-wait
//! reply session with resend, and the command vocabulary.

pub mod command;
pub mod frame;
pub mod link;
pub mod mailbox;

pub use command::{Command, Query};
pub use frame::RawFrame;
pub use link::LinkSession;
pub use mailbox::RxMailbox;
