//! Mock serial transmitter for testing

use std::vec::Vec;

use crate::platform::traits::SerialInterface;

/// Mock transmitter capturing everything sent to the host
#[derive(Debug, Default)]
pub struct MockSerial {
    tx: Vec<u8>,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transmitted bytes, in order
    pub fn tx_bytes(&self) -> &[u8] {
        &self.tx
    }

    /// Drain and return the transmitted bytes
    pub fn take_tx(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }
}

impl SerialInterface for MockSerial {
    fn write(&mut self, bytes: &[u8]) {
        self.tx.extend_from_slice(bytes);
    }
}
