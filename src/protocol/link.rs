//! Stop-and-wait reply session
//!
//! Every reply frame is retained verbatim until the host acknowledges it.
//! If no acknowledge arrives before the timeout, or the host explicitly
//! NAKs, the retained bytes are retransmitted as-is; a resend never goes
//! back through command dispatch, which keeps retransmission free of side
//! effects.

use super::frame::{encode, ACK_BYTE, FRAME_LEN, NAK_BYTE, PAYLOAD_LEN};
use crate::platform::traits::SerialInterface;

/// How long to wait for the host to acknowledge a reply
pub const TX_TIMEOUT_MS: u32 = 100;

/// Reply session state
#[derive(Debug, Default)]
pub struct LinkSession {
    last_frame: [u8; FRAME_LEN],
    has_payload: bool,
    pending_ack: bool,
    sent_at_ms: u32,
}

impl LinkSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the retained payload and any pending acknowledge
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Transmit a reply payload and arm the resend timer
    pub fn send_payload<S: SerialInterface>(
        &mut self,
        serial: &mut S,
        payload: [u8; PAYLOAD_LEN],
        now_ms: u32,
    ) {
        let frame = encode(payload);
        serial.write(&frame);
        self.last_frame = frame;
        self.has_payload = true;
        self.pending_ack = true;
        self.sent_at_ms = now_ms;
    }

    /// Retransmit the retained frame verbatim
    pub fn resend<S: SerialInterface>(&mut self, serial: &mut S, now_ms: u32) {
        if self.has_payload {
            serial.write(&self.last_frame);
            self.sent_at_ms = now_ms;
        }
    }

    /// True once the acknowledge window for the last reply has lapsed
    pub fn resend_due(&self, now_ms: u32) -> bool {
        self.pending_ack && now_ms.wrapping_sub(self.sent_at_ms) > TX_TIMEOUT_MS
    }

    /// The host acknowledged the last reply
    pub fn confirm(&mut self) {
        self.pending_ack = false;
    }

    /// True while a reply is awaiting its acknowledge
    pub fn pending_ack(&self) -> bool {
        self.pending_ack
    }

    /// Send the single positive acknowledge byte
    pub fn send_ack<S: SerialInterface>(serial: &mut S) {
        serial.write(&[ACK_BYTE]);
    }

    /// Send the single negative acknowledge byte
    pub fn send_nak<S: SerialInterface>(serial: &mut S) {
        serial.write(&[NAK_BYTE]);
    }
}
