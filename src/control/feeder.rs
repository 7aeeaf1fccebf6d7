//! Filament motion sequences
//!
//! The compound operations behind tool changes: feeding to the sensor,
//! unloading past it, ejecting for removal and the continued feed into the
//! drive gears. Every sequence returns a [`Fault`] instead of blocking when
//! a mechanical step cannot complete; the caller routes the fault into the
//! matching recovery flow and retries.

use super::controller::Controller;
use super::materials::{profile, retract_steps, MaterialProfile};
use super::recovery::Fault;
use super::state::PARK_CHANNEL;
use crate::platform::traits::{
    Axis, Board, ClockInterface, FilamentSensorInterface, MotionInterface, MotionProfile,
    MoveResult,
};

/// Feed distance from the parking position to the filament sensor
pub(crate) const FINDA_FEED_STEPS: i32 = 1500;

/// Eject travel that presents the filament for removal
pub(crate) const EJECT_PULLEY_STEPS: i32 = 2500;

/// Short operator jog distance during recovery
pub(crate) const JOG_PULLEY_STEPS: i32 = 300;

/// Continued feed from the sensor into the drive gears
pub(crate) const LOAD_TO_GEARS_STEPS: i32 = 450;

/// Positioning attempts before an axis is declared stalled
pub(crate) const STALL_THRESHOLD: u8 = 3;

impl<'m, B: Board> Controller<'m, B> {
    /// Pulley profile of a channel's material
    pub(crate) fn profile_of(&self, channel: u8) -> MaterialProfile {
        profile(self.state.class_of(channel))
    }

    /// Move selector and idler to a channel (park allowed) and persist the
    /// new selection
    pub(crate) fn set_positions(&mut self, channel: u8) -> Result<(), Fault> {
        debug_assert!(channel <= PARK_CHANNEL);
        self.state.previous_channel = self.state.active_channel;
        self.state.active_channel = channel;

        let mut done = false;
        for _ in 0..STALL_THRESHOLD {
            if self.board.motion().position_selector(channel) == MoveResult::Success {
                done = true;
                break;
            }
        }
        if !done {
            return Err(Fault::SelectorStall);
        }

        let mut done = false;
        for _ in 0..STALL_THRESHOLD {
            if self.board.motion().position_idler(channel) == MoveResult::Success {
                done = true;
                break;
            }
        }
        if !done {
            return Err(Fault::IdlerStall);
        }

        self.persist_defaults();
        Ok(())
    }

    /// Feed filament of the active channel up to the sensor, then retract
    /// it to the parking position
    pub(crate) fn feed_filament(&mut self) -> Result<(), Fault> {
        let p = self.profile_of(self.state.active_channel);
        self.board.motion().engage_pulley(true);
        let fed = self.board.motion().move_axis(
            Axis::Pulley,
            FINDA_FEED_STEPS,
            p.feedrate,
            MotionProfile::Normal,
            true,
        );
        if fed == MoveResult::Failed {
            self.board.motion().engage_pulley(false);
            return Err(Fault::FilamentStuck {
                use_previous: false,
            });
        }
        self.board.motion().move_axis(
            Axis::Pulley,
            -p.park_steps,
            p.feedrate,
            MotionProfile::Normal,
            false,
        );
        self.board.motion().engage_pulley(false);
        self.redraw_channel_leds();
        self.last_wake_ms = self.board.clock().now_ms();
        Ok(())
    }

    /// Feed the active channel up to the sensor and leave it there,
    /// awaiting the continue-load command
    pub(crate) fn load_to_sensor(&mut self) -> Result<(), Fault> {
        let p = self.profile_of(self.state.active_channel);
        self.board.motion().engage_pulley(true);
        let fed = self.board.motion().move_axis(
            Axis::Pulley,
            FINDA_FEED_STEPS,
            p.feedrate,
            MotionProfile::Normal,
            true,
        );
        if fed == MoveResult::Failed {
            return Err(Fault::FilamentStuck {
                use_previous: false,
            });
        }
        self.board.motion().engage_pulley(false);
        Ok(())
    }

    /// Retract filament past the sensor and park it
    pub(crate) fn unload_filament(&mut self) -> Result<(), Fault> {
        if !self.board.sensor().filament_present() {
            return Ok(());
        }
        let p = self.profile_of(self.state.active_channel);
        self.board.motion().engage_pulley(true);
        let cleared = self.board.motion().move_axis(
            Axis::Pulley,
            retract_steps(),
            p.feedrate,
            MotionProfile::Normal,
            true,
        );
        if cleared == MoveResult::Failed {
            return Err(Fault::FilamentStuck { use_previous: true });
        }
        self.board.motion().move_axis(
            Axis::Pulley,
            p.park_steps,
            p.feedrate,
            MotionProfile::Normal,
            false,
        );
        self.board.motion().engage_pulley(false);
        Ok(())
    }

    /// Full tool change: unload whatever is loaded, select the new channel
    /// and feed it to the sensor
    pub(crate) fn tool_change(&mut self, channel: u8) {
        self.state.tool_changes = self.state.tool_changes.saturating_add(1);
        self.state.is_printing = true;
        self.until_ok(|c| {
            if c.board.sensor().filament_present() {
                c.unload_filament()
            } else {
                Ok(())
            }
        });
        self.until_ok(move |c| c.set_positions(channel));
        self.until_ok(|c| c.load_to_sensor());
        self.state.sensor_loading = false;
        self.last_wake_ms = self.board.clock().now_ms();
    }

    /// Present a channel's filament for removal
    pub(crate) fn eject_filament(&mut self, channel: u8) -> Result<(), Fault> {
        self.set_positions(channel)?;
        let p = self.profile_of(channel);
        self.board.motion().engage_pulley(true);
        let out = self.board.motion().move_axis(
            Axis::Pulley,
            EJECT_PULLEY_STEPS,
            p.feedrate,
            MotionProfile::Normal,
            true,
        );
        if out == MoveResult::Failed {
            return Err(Fault::FilamentStuck { use_previous: true });
        }
        self.board.motion().engage_pulley(false);
        self.state.is_ejected = true;
        Ok(())
    }

    /// Leave the ejected position and re-home to the active channel
    pub(crate) fn recover_after_eject(&mut self) -> Result<(), Fault> {
        if self.board.motion().home(true) == MoveResult::Failed {
            return Err(Fault::SelectorStall);
        }
        self.state.is_ejected = false;
        Ok(())
    }

    /// Continued feed from the sensor into the drive gears
    pub(crate) fn load_into_extruder(&mut self) -> Result<(), Fault> {
        let p = self.profile_of(self.state.active_channel);
        self.board.motion().engage_pulley(true);
        let fed = self.board.motion().move_axis(
            Axis::Pulley,
            LOAD_TO_GEARS_STEPS,
            p.feedrate,
            MotionProfile::Soft,
            false,
        );
        self.board.motion().engage_pulley(false);
        if fed == MoveResult::Failed {
            return Err(Fault::FilamentStuck {
                use_previous: false,
            });
        }
        self.state.sensor_loading = false;
        Ok(())
    }

    /// Operator confirmed removal of ejected filament: grip again and pull
    /// the remainder back in
    pub(crate) fn pull_back_ejected(&mut self) {
        let p = self.profile_of(self.state.previous_channel);
        self.board.motion().engage_pulley(true);
        self.board.motion().move_axis(
            Axis::Pulley,
            -EJECT_PULLEY_STEPS,
            p.feedrate,
            MotionProfile::Normal,
            false,
        );
        self.board.motion().engage_pulley(false);
    }
}
