//! Host link transmitter
//!
//! Only the transmit side lives behind a trait. Received bytes arrive
//! asynchronously and are fed into the protocol receive mailbox by the
//! board's interrupt or task layer.

/// Serial transmit interface
///
/// Writes are blocking; the point-to-point link always accepts bytes.
pub trait SerialInterface {
    /// Transmit bytes to the host
    fn write(&mut self, bytes: &[u8]);
}
