//! Manual filament selector
//!
//! While no print job or eject is active the operator cycles the selection
//! with the left and right buttons, bounded by channel 0 and the park
//! pseudo-channel. Selection moves are refused while filament is loaded;
//! the host display gets the busy marker instead.

use super::controller::{Controller, BLINK_HALF_MS, BUSY_HOLD_MS};
use super::state::{NUM_CHANNELS, PARK_CHANNEL};
use crate::platform::traits::{
    Board, Button, ClockInterface, FilamentSensorInterface, LedImage, LedPanelInterface,
};
use crate::protocol::frame::{BUSY_MARKER, CLEAR_MARKER, SETUP_MARKER};

impl<'m, B: Board> Controller<'m, B> {
    /// One selector pass: redraw the indicators and act on a button
    pub(crate) fn selector_step(&mut self, button: Button) {
        self.redraw_channel_leds();

        let active = self.state.active_channel;
        if !self.board.sensor().filament_present() {
            match button {
                Button::Right => {
                    if active < PARK_CHANNEL {
                        self.until_ok(move |c| c.set_positions(active + 1));
                    }
                    if self.state.active_channel == PARK_CHANNEL {
                        self.tx(SETUP_MARKER);
                    }
                }
                Button::Left => {
                    if active == PARK_CHANNEL {
                        self.tx(CLEAR_MARKER);
                    }
                    if active > 0 {
                        self.until_ok(move |c| c.set_positions(active - 1));
                    }
                }
                _ => {}
            }
        } else if button == Button::Right || button == Button::Left {
            // Selection is locked while filament is engaged
            self.tx(BUSY_MARKER);
            self.board.clock().delay_ms(BUSY_HOLD_MS);
            self.process_link(false);
            self.tx(CLEAR_MARKER);
        }

        if self.state.active_channel == PARK_CHANNEL {
            self.board.panel().apply(LedImage::park());
            self.board.clock().delay_ms(BLINK_HALF_MS);
            self.board.panel().apply(LedImage::empty());
            self.board.clock().delay_ms(BLINK_HALF_MS);
        }
    }

    /// Show the active channel as settled
    pub(crate) fn redraw_channel_leds(&mut self) {
        let image = if self.state.active_channel < NUM_CHANNELS {
            LedImage::solid(self.state.active_channel)
        } else {
            LedImage::empty()
        };
        self.board.panel().apply(image);
    }
}
