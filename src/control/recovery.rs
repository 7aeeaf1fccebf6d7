//! Operator-assisted fault recovery
//!
//! Three flows handle the conditions the mechanics cannot clear on their
//! own: a general load/unload failure with filament somewhere it should not
//! be, and a stalled selector or idler axis.
//!
//! Each flow is a loop whose body starts by servicing the link, so ACK, NAK
//! and resend keep working for the whole time an operator is involved;
//! dispatch of new commands is held off by the error flag, never the link
//! itself. The loop structure replaces the re-entrant
//! dispatcher-calls-recovery-calls-dispatcher shape with one explicit poll
//! per iteration.
//!
//! The general flow only exits on the confirm button with no filament
//! detected; button input alone never ends it.

use super::controller::{Controller, BLINK_HALF_MS};
use super::materials::{retract_steps, PREVIOUS_SPEED_SCALE};
use super::feeder::JOG_PULLEY_STEPS;
use super::state::NUM_CHANNELS;
use crate::platform::traits::{
    Axis, Board, Button, ButtonInterface, ClockInterface, FilamentSensorInterface, LedImage,
    LedPanelInterface, MotionInterface, MotionProfile, MoveResult,
};
use crate::protocol::frame::{BUSY_MARKER, CLEAR_MARKER};
use crate::{log_info, log_warn};

/// A mechanical step that cannot complete without the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Filament did not reach, or did not clear, the sensor
    ///
    /// `use_previous` selects whose material profile drives the assisting
    /// jogs: the channel being left (unload paths) or the one being entered
    /// (load paths).
    FilamentStuck { use_previous: bool },
    /// Selector axis stalled repeatedly
    SelectorStall,
    /// Idler axis stalled repeatedly
    IdlerStall,
}

impl<'m, B: Board> Controller<'m, B> {
    /// Run `op` until it succeeds, detouring through the matching recovery
    /// flow whenever it faults
    pub(crate) fn until_ok<F>(&mut self, mut op: F)
    where
        F: FnMut(&mut Self) -> Result<(), Fault>,
    {
        loop {
            match op(self) {
                Ok(()) => break,
                Err(fault) => self.run_recovery(fault),
            }
        }
    }

    /// Enter the recovery flow matching a fault and block until the
    /// operator clears it
    pub(crate) fn run_recovery(&mut self, fault: Fault) {
        log_warn!("entering recovery");
        match fault {
            Fault::FilamentStuck { use_previous } => self.recover_general(use_previous),
            Fault::SelectorStall => self.recover_axis_stall(Axis::Selector),
            Fault::IdlerStall => self.recover_axis_stall(Axis::Idler),
        }
        log_info!("recovery cleared");
    }

    /// General load/unload failure
    ///
    /// The pulley is released and both positioning axes are powered down so
    /// the operator can work on the filament, assisted by jog buttons:
    /// right pulls toward the sensor and parks, left pushes further in.
    fn recover_general(&mut self, use_previous: bool) {
        self.board.motion().engage_pulley(false);
        self.board.motion().disable_axis(Axis::Selector);
        self.board.motion().disable_axis(Axis::Idler);
        self.state.in_error_state = true;
        self.tx(BUSY_MARKER);

        loop {
            self.process_link(true);
            let button = self.board.buttons().clicked();
            let present = self.board.sensor().filament_present();
            if button == Button::Middle && !present {
                break;
            }
            match button {
                Button::Right => self.jog_out(use_previous, present),
                Button::Left => self.jog_in(),
                _ => {}
            }
            self.blink_error_leds(use_previous, present);
        }

        self.board.motion().enable_axis(Axis::Selector);
        self.board.motion().enable_axis(Axis::Idler);
        self.state.in_error_state = false;
        self.process_link(true);
        self.tx(CLEAR_MARKER);
        if self.board.motion().home(true) == MoveResult::Failed {
            log_warn!("re-home after recovery failed");
        }
        self.state.tool_changes = 0;
    }

    /// Stalled positioning axis: wait for the confirm button, then clear
    /// the stall count and re-establish the last known position
    fn recover_axis_stall(&mut self, axis: Axis) {
        if axis == Axis::Selector {
            self.board.motion().engage_pulley(false);
        }
        self.board.motion().disable_axis(axis);
        self.state.in_error_state = true;

        loop {
            self.process_link(true);
            if self.board.buttons().clicked() == Button::Middle {
                break;
            }
            let present = self.board.sensor().filament_present();
            let channel = self.state.active_channel;
            self.board.clock().delay_ms(BLINK_HALF_MS);
            self.board.panel().apply(LedImage::empty());
            self.board.clock().delay_ms(BLINK_HALF_MS);
            self.board.panel().apply(if present {
                LedImage::signal(channel)
            } else {
                LedImage::solid(channel)
            });
        }

        self.board.motion().clear_stall_count(axis);
        self.state.in_error_state = false;
        let channel = self.state.active_channel;
        match axis {
            Axis::Selector => self.board.motion().restore_selector(channel),
            Axis::Idler => self.board.motion().restore_idler(channel),
            Axis::Pulley => {}
        }
    }

    /// Right-button jog: pull filament back toward the sensor and park it,
    /// or back it out in short steps when none is detected
    fn jog_out(&mut self, use_previous: bool, present: bool) {
        let channel = self.jog_channel(use_previous);
        let p = self.profile_of(channel);
        let feedrate = if use_previous {
            p.scaled_feedrate(PREVIOUS_SPEED_SCALE)
        } else {
            p.feedrate
        };
        self.board.motion().engage_pulley(true);
        if present {
            let cleared = self.board.motion().move_axis(
                Axis::Pulley,
                retract_steps(),
                feedrate,
                MotionProfile::Normal,
                true,
            );
            if cleared == MoveResult::Success {
                self.board.motion().move_axis(
                    Axis::Pulley,
                    p.park_steps,
                    feedrate,
                    MotionProfile::Normal,
                    false,
                );
            }
        } else {
            self.board.motion().move_axis(
                Axis::Pulley,
                -JOG_PULLEY_STEPS,
                feedrate,
                MotionProfile::Normal,
                false,
            );
        }
        self.board.motion().engage_pulley(false);
        self.board.motion().disable_axis(Axis::Idler);
    }

    /// Left-button jog: push filament further in, always with the previous
    /// channel's material at the raised jog speed
    fn jog_in(&mut self) {
        let p = self.profile_of(self.state.previous_channel);
        let feedrate = p.scaled_feedrate(PREVIOUS_SPEED_SCALE);
        self.board.motion().engage_pulley(true);
        self.board.motion().move_axis(
            Axis::Pulley,
            JOG_PULLEY_STEPS,
            feedrate,
            MotionProfile::Normal,
            false,
        );
        self.board.motion().engage_pulley(false);
        self.board.motion().disable_axis(Axis::Idler);
    }

    fn jog_channel(&self, use_previous: bool) -> u8 {
        if use_previous {
            self.state.previous_channel
        } else {
            self.state.active_channel
        }
    }

    /// Blink the channel indicator: red while filament is detected, green
    /// once it is clear
    fn blink_error_leds(&mut self, use_previous: bool, present: bool) {
        let channel = self.jog_channel(use_previous);
        self.board.clock().delay_ms(BLINK_HALF_MS);
        self.board.panel().apply(LedImage::empty());
        self.board.clock().delay_ms(BLINK_HALF_MS);
        let mut image = if present {
            LedImage::signal(channel)
        } else {
            LedImage::solid(channel)
        };
        if use_previous
            && self.state.active_channel != self.state.previous_channel
            && self.state.active_channel < NUM_CHANNELS
        {
            image |= LedImage::solid(self.state.active_channel);
        }
        self.board.panel().apply(image);
    }
}
