//! Single-slot receive mailbox
//!
//! The serial receive path runs asynchronously to the control loop (an
//! interrupt on real hardware). This mailbox is the only structure both
//! sides touch, and ownership of the frame slot is handed off explicitly:
//! the receive side owns the slot while assembling a frame, releases it by
//! raising `frame_ready`, and the control loop owns it until drained.
//!
//! While a completed frame is waiting, further payload bytes are refused
//! and counted as overruns, which schedules a NAK reply. Back-pressure by
//! design: there is exactly one frame in flight, never a queue.
//!
//! Single-byte ACK/NAK from the host are link control, not frame data; they
//! are latched into flags whenever they arrive between frames.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;
use heapless::Vec;

use super::frame::{RawFrame, ACK_BYTE, FRAME_LEN, NAK_BYTE};

/// Receive-side statistics
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxStats {
    /// Complete frames assembled
    pub frames: u32,
    /// Payload bytes refused while a frame was pending
    pub overruns: u32,
}

/// Single-slot receive mailbox
pub struct RxMailbox {
    slot: Mutex<RefCell<Vec<u8, FRAME_LEN>>>,
    frame_ready: AtomicBool,
    peer_ack: AtomicBool,
    peer_nak: AtomicBool,
    nak_request: AtomicBool,
    sensor_event: AtomicBool,
    frames: AtomicU32,
    overruns: AtomicU32,
}

impl RxMailbox {
    /// Create an empty mailbox (const, suitable for a static)
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(Vec::new())),
            frame_ready: AtomicBool::new(false),
            peer_ack: AtomicBool::new(false),
            peer_nak: AtomicBool::new(false),
            nak_request: AtomicBool::new(false),
            sensor_event: AtomicBool::new(false),
            frames: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
        }
    }

    /// Feed one received byte (receive-path side)
    ///
    /// Bytes arriving outside a frame are checked for link control first;
    /// everything else is payload. The fifth payload byte completes a frame
    /// and hands the slot to the control loop.
    pub fn accept_byte(&self, byte: u8) {
        critical_section::with(|cs| {
            let mut slot = self.slot.borrow_ref_mut(cs);
            let ready = self.frame_ready.load(Ordering::Acquire);
            let mid_frame = !ready && !slot.is_empty();

            if !mid_frame {
                match byte {
                    ACK_BYTE => {
                        self.peer_ack.store(true, Ordering::Release);
                        return;
                    }
                    NAK_BYTE => {
                        self.peer_nak.store(true, Ordering::Release);
                        return;
                    }
                    _ => {}
                }
            }

            if ready {
                // Consumer has not drained the previous frame yet
                self.overruns.fetch_add(1, Ordering::Relaxed);
                self.nak_request.store(true, Ordering::Release);
                return;
            }

            let _ = slot.push(byte);
            if slot.len() == FRAME_LEN {
                self.frames.fetch_add(1, Ordering::Relaxed);
                self.frame_ready.store(true, Ordering::Release);
            }
        });
    }

    /// Copy the pending frame without draining it (control-loop side)
    pub fn pending_frame(&self) -> Option<RawFrame> {
        if !self.frame_ready.load(Ordering::Acquire) {
            return None;
        }
        let frame = critical_section::with(|cs| {
            let slot = self.slot.borrow_ref(cs);
            let mut bytes = [0u8; FRAME_LEN];
            bytes.copy_from_slice(&slot);
            RawFrame::from_bytes(&bytes)
        });
        Some(frame)
    }

    /// Drain the pending frame and hand the slot back to the receive path
    pub fn discard_frame(&self) {
        critical_section::with(|cs| {
            self.slot.borrow_ref_mut(cs).clear();
        });
        self.frame_ready.store(false, Ordering::Release);
    }

    /// Latch a filament-sensor trigger notification for the host
    pub fn notify_sensor_event(&self) {
        self.sensor_event.store(true, Ordering::Release);
    }

    /// Consume the peer-ACK latch
    pub fn take_peer_ack(&self) -> bool {
        self.peer_ack.swap(false, Ordering::AcqRel)
    }

    /// Consume the peer-NAK (resend request) latch
    pub fn take_peer_nak(&self) -> bool {
        self.peer_nak.swap(false, Ordering::AcqRel)
    }

    /// Consume the forced-NAK request latch
    pub fn take_nak_request(&self) -> bool {
        self.nak_request.swap(false, Ordering::AcqRel)
    }

    /// Consume the sensor-event latch
    pub fn take_sensor_event(&self) -> bool {
        self.sensor_event.swap(false, Ordering::AcqRel)
    }

    /// Drop all pending state (reset command)
    pub fn reset(&self) {
        self.discard_frame();
        self.peer_ack.store(false, Ordering::Release);
        self.peer_nak.store(false, Ordering::Release);
        self.nak_request.store(false, Ordering::Release);
        self.sensor_event.store(false, Ordering::Release);
    }

    /// Receive-side statistics
    pub fn stats(&self) -> RxStats {
        RxStats {
            frames: self.frames.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }
}

impl Default for RxMailbox {
    fn default() -> Self {
        Self::new()
    }
}
