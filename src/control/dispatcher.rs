//! Command dispatcher
//!
//! Turns one validated frame into exactly one control action and one reply.
//!
//! # Processing order
//!
//! Each service pass mirrors the link contract:
//!
//! 1. A host ACK confirms the outstanding reply.
//! 2. A host NAK, or an expired acknowledge window, retransmits the
//!    retained reply verbatim and ends the pass; nothing is re-dispatched.
//! 3. A latched filament-sensor event is acknowledged to the host.
//! 4. A forced-NAK request (receive overrun) answers NAK.
//! 5. A pending frame is checksum-gated: bad frames answer NAK, good frames
//!    answer ACK and dispatch. While a recovery flow is active, good frames
//!    are dropped so the mechanics stay untouched, but steps 1-4 keep the
//!    link alive.
//!
//! Out-of-range channel or class arguments are deliberately dropped without
//! a reply; the host treats the missing reply like a lost frame.

use super::controller::{Controller, BUSY_HOLD_MS, CONTINUE_DELAY_MS, RESET_DELAY_MS};
use super::materials::FilamentType;
use super::state::{FW_BUILD, FW_VERSION, NUM_CHANNELS};
use crate::platform::traits::{
    Board, ClockInterface, DriveMode, FilamentSensorInterface, MotionInterface, StorageInterface,
};
use crate::protocol::command::{Command, Query};
use crate::protocol::frame::{BUSY_MARKER, CLEAR_MARKER, FILLER, OK_REPLY};
use crate::protocol::link::LinkSession;
use crate::{log_debug, log_warn};

impl<'m, B: Board> Controller<'m, B> {
    /// One link service pass
    ///
    /// With `allow_dispatch` false (the bounded nested pass inside busy
    /// replies) a pending frame is left in the mailbox for the main loop;
    /// everything else is serviced normally.
    pub fn process_link(&mut self, allow_dispatch: bool) {
        if self.mailbox.take_peer_ack() {
            self.link.confirm();
        }

        let now = self.board.clock().now_ms();
        if self.mailbox.take_peer_nak() || self.link.resend_due(now) {
            // A pending command is superseded by the resend
            self.mailbox.discard_frame();
            self.link.resend(self.board.serial(), now);
            return;
        }

        if self.mailbox.take_sensor_event() {
            LinkSession::send_ack(self.board.serial());
        }

        if self.mailbox.take_nak_request() {
            self.mailbox.discard_frame();
            LinkSession::send_nak(self.board.serial());
            return;
        }

        let Some(frame) = self.mailbox.pending_frame() else {
            return;
        };
        if !frame.checksum_ok() {
            self.mailbox.discard_frame();
            LinkSession::send_nak(self.board.serial());
            return;
        }
        if !allow_dispatch {
            return;
        }
        self.mailbox.discard_frame();
        if self.state.in_error_state {
            log_debug!("command held off during fault recovery");
            return;
        }

        LinkSession::send_ack(self.board.serial());
        self.last_wake_ms = now;
        self.dispatch(Command::parse(frame.payload));
    }

    fn dispatch(&mut self, command: Command) {
        match command {
            Command::ToolChange { channel } => self.handle_tool_change(channel),
            Command::Load { channel } => self.handle_load(channel),
            Command::Unload => self.handle_unload(),
            Command::Query(query) => self.handle_query(query),
            Command::SetDriveMode(mode) => self.handle_drive_mode(mode),
            Command::SetFilamentType { channel, class } => {
                self.handle_set_filament_type(channel, class)
            }
            Command::Reset => self.handle_reset(),
            Command::ReadSensor => self.handle_read_sensor(),
            Command::ContinueLoad => self.handle_continue_load(),
            Command::Eject { channel } => self.handle_eject(channel),
            Command::Recover => self.handle_recover(),
            Command::Unrecognized { op: _op } => {
                log_warn!("unrecognized command {} dropped", _op);
            }
        }
    }

    /// Tool change: unload the current channel if needed, then select and
    /// load the requested one. Repeating the already-loaded channel outside
    /// a runout change is a duplicate: answered OK with no motion.
    fn handle_tool_change(&mut self, channel: u8) {
        if channel >= NUM_CHANNELS {
            log_warn!("tool change channel {} out of range", channel);
            return;
        }
        let present = self.board.sensor().filament_present();
        if self.state.active_channel == channel && present && !self.state.runout_changing {
            self.state.duplicate_tool_change = true;
            self.tx(OK_REPLY);
        } else {
            self.state.runout_changing = false;
            self.state.sensor_loading = true;
            self.state.duplicate_tool_change = false;
            self.tool_change(channel);
            self.tx(OK_REPLY);
        }
    }

    /// Load: answer busy while filament is already in, otherwise select the
    /// channel and feed to the sensor
    fn handle_load(&mut self, channel: u8) {
        if channel >= NUM_CHANNELS {
            log_warn!("load channel {} out of range", channel);
            return;
        }
        if self.board.sensor().filament_present() {
            self.tx(BUSY_MARKER);
            self.board.clock().delay_ms(BUSY_HOLD_MS);
            self.process_link(false);
            self.tx(CLEAR_MARKER);
        } else {
            self.until_ok(move |c| c.set_positions(channel));
            self.until_ok(|c| c.feed_filament());
        }
        self.tx(OK_REPLY);
    }

    fn handle_unload(&mut self) {
        self.until_ok(|c| c.unload_filament());
        self.tx(OK_REPLY);
        self.state.is_printing = false;
        self.state.tool_changes = 0;
    }

    fn handle_query(&mut self, query: Query) {
        let payload = match query {
            Query::Ack => OK_REPLY,
            Query::FirmwareVersion => [(FW_VERSION >> 8) as u8, (FW_VERSION & 0xff) as u8, FILLER],
            Query::BuildNumber => [(FW_BUILD >> 8) as u8, (FW_BUILD & 0xff) as u8, FILLER],
            Query::ActiveChannel => [b'O', b'K', self.state.active_channel],
        };
        self.tx(payload);
    }

    fn handle_drive_mode(&mut self, mode: DriveMode) {
        self.state.drive_mode = mode;
        self.board.motion().configure_mode(mode);
        self.tx(OK_REPLY);
    }

    fn handle_set_filament_type(&mut self, channel: u8, class: u8) {
        let Some(filament) = FilamentType::from_class(class) else {
            log_warn!("filament class {} out of range", class);
            return;
        };
        if channel >= NUM_CHANNELS {
            log_warn!("filament type channel {} out of range", channel);
            return;
        }
        self.state.filament_classes[channel as usize] = filament;
        self.persist_defaults();
        self.tx(OK_REPLY);
    }

    /// Reset is armed with a delay so the preceding traffic can drain; no
    /// reply is sent, the restart itself is the answer.
    fn handle_reset(&mut self) {
        self.link.reset();
        self.mailbox.reset();
        self.board.arm_reset(RESET_DELAY_MS);
    }

    /// Outside a print the sensor answer is pinned to "present" so the host
    /// does not flag a missing filament while the operator is working.
    fn handle_read_sensor(&mut self) {
        let present = if self.state.is_printing {
            u8::from(self.board.sensor().filament_present())
        } else {
            1
        };
        self.tx([b'P', b'K', present]);
    }

    fn handle_continue_load(&mut self) {
        self.tx(OK_REPLY);
        if !self.state.duplicate_tool_change {
            self.board.clock().delay_ms(CONTINUE_DELAY_MS);
            self.until_ok(|c| c.load_into_extruder());
        }
    }

    fn handle_eject(&mut self, channel: u8) {
        if channel >= NUM_CHANNELS {
            log_warn!("eject channel {} out of range", channel);
            return;
        }
        self.state.runout_changing = true;
        self.until_ok(move |c| c.eject_filament(channel));
        self.tx(OK_REPLY);
    }

    fn handle_recover(&mut self) {
        self.until_ok(|c| c.recover_after_eject());
        self.tx(OK_REPLY);
    }

    /// Persist the channel and material table; a write failure is logged
    /// and the device keeps running on the in-memory state
    pub(crate) fn persist_defaults(&mut self) {
        let defaults = self.state.to_defaults();
        if self.board.storage().save(&defaults).is_err() {
            log_warn!("persisting defaults failed");
        }
    }
}
