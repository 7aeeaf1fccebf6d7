//! Top-level controller
//!
//! Owns the board, the device state and the link session, and runs the
//! operational loop: service the link, handle operator buttons, and power
//! the drivers down when the unit sits idle.

use super::state::{DeviceState, PARK_CHANNEL};
use crate::platform::traits::{
    Board, Button, ButtonInterface, ClockInterface, FilamentSensorInterface, LedImage,
    LedPanelInterface, MotionInterface, MoveResult, StorageInterface,
};
use crate::protocol::frame::{BOOT_NOTIFY, PAYLOAD_LEN};
use crate::protocol::link::LinkSession;
use crate::protocol::mailbox::RxMailbox;
use crate::{log_info, log_warn};

/// Idle time after which the stepper drivers are powered down
pub const WAKE_TIMEOUT_MS: u32 = 300_000;

/// How long the busy marker is held on the host display
pub(crate) const BUSY_HOLD_MS: u32 = 1000;

/// Half period of the indicator blink patterns
pub(crate) const BLINK_HALF_MS: u32 = 100;

/// Delay between the reply to a continue-load and the actual feed
pub(crate) const CONTINUE_DELAY_MS: u32 = 5;

/// Delay granted to the reply frame before a hardware reset fires
pub(crate) const RESET_DELAY_MS: u32 = 15;

/// Top-level controller
///
/// Generic over the board so the same control core drives real hardware
/// and the mock board in tests.
pub struct Controller<'m, B: Board> {
    pub(crate) board: B,
    pub(crate) mailbox: &'m RxMailbox,
    pub(crate) link: LinkSession,
    pub(crate) state: DeviceState,
    pub(crate) last_wake_ms: u32,
}

impl<'m, B: Board> Controller<'m, B> {
    /// Build the controller from a board and the receive mailbox
    ///
    /// Device state comes from persisted defaults; a failed load falls back
    /// to the built-in defaults.
    pub fn new(mut board: B, mailbox: &'m RxMailbox) -> Self {
        let defaults = match board.storage().load() {
            Ok(defaults) => defaults,
            Err(_) => {
                log_warn!("persisted defaults unavailable, using built-ins");
                Default::default()
            }
        };
        let state = DeviceState::from_defaults(&defaults);
        let now = board.clock().now_ms();
        Self {
            board,
            mailbox,
            link: LinkSession::new(),
            state,
            last_wake_ms: now,
        }
    }

    /// Boot sequence: home the mechanics and announce a restored channel
    pub fn boot(&mut self) {
        self.last_wake_ms = self.board.clock().now_ms();
        if self.board.motion().home(false) == MoveResult::Failed {
            log_warn!("homing at boot failed");
        }
        if self.state.active_channel != PARK_CHANNEL {
            self.tx(BOOT_NOTIFY);
        }
    }

    /// One iteration of the operational loop
    ///
    /// Always services the link first so replies, NAKs and resends keep
    /// flowing no matter what the mechanics are doing.
    pub fn tick(&mut self) {
        self.process_link(true);

        let button = self.board.buttons().clicked();
        if button != Button::None {
            self.last_wake_ms = self.board.clock().now_ms();
        }

        if !self.state.is_printing && !self.state.is_ejected {
            self.selector_step(button);
            if button == Button::Middle {
                if self.state.active_channel < super::state::NUM_CHANNELS {
                    self.until_ok(|c| c.feed_filament());
                } else {
                    self.enter_setup_menu();
                }
            }
        } else if self.state.is_ejected && button == Button::Right {
            self.pull_back_ejected();
        }

        self.idle_power_down();
    }

    /// Current device state
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// The board, for inspection
    pub fn board(&self) -> &B {
        &self.board
    }

    /// The board, for scripting in tests
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Transmit a reply payload through the link session
    pub(crate) fn tx(&mut self, payload: [u8; PAYLOAD_LEN]) {
        let now = self.board.clock().now_ms();
        self.link.send_payload(self.board.serial(), payload, now);
    }

    /// Power all drivers down once the unit has sat idle long enough
    ///
    /// Never fires while filament is loaded or a print is running, and does
    /// nothing once every driver is already off.
    fn idle_power_down(&mut self) {
        let now = self.board.clock().now_ms();
        if now.wrapping_sub(self.last_wake_ms) > WAKE_TIMEOUT_MS
            && !self.board.sensor().filament_present()
            && !self.state.is_printing
            && self.board.motion().any_axis_enabled()
        {
            log_info!("idle timeout, powering drivers down");
            self.board.motion().disable_all();
        }
    }

    /// Park-position setup menu hook
    ///
    /// The menu itself belongs to the HMI layer; reaching it from here only
    /// flashes the park indicator.
    fn enter_setup_menu(&mut self) {
        log_info!("setup menu requested");
        self.board.panel().apply(LedImage::park());
    }
}
