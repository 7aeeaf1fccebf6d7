//! Mock board aggregate for testing

use super::{MockButtons, MockClock, MockFilamentSensor, MockMotion, MockPanel, MockSerial, MockStorage};
use crate::platform::traits::Board;

/// Mock board wiring every mock collaborator together
///
/// Fields are public so tests can script and inspect each collaborator
/// directly.
#[derive(Debug, Default)]
pub struct MockBoard {
    pub motion: MockMotion,
    pub sensor: MockFilamentSensor,
    pub buttons: MockButtons,
    pub panel: MockPanel,
    pub storage: MockStorage,
    pub serial: MockSerial,
    pub clock: MockClock,
    /// Delay passed to the last `arm_reset` call, if any
    pub reset_armed: Option<u32>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            motion: MockMotion::new(),
            ..Default::default()
        }
    }
}

impl Board for MockBoard {
    type Motion = MockMotion;
    type Sensor = MockFilamentSensor;
    type Buttons = MockButtons;
    type Panel = MockPanel;
    type Storage = MockStorage;
    type Serial = MockSerial;
    type Clock = MockClock;

    fn motion(&mut self) -> &mut Self::Motion {
        &mut self.motion
    }

    fn sensor(&self) -> &Self::Sensor {
        &self.sensor
    }

    fn buttons(&mut self) -> &mut Self::Buttons {
        &mut self.buttons
    }

    fn panel(&mut self) -> &mut Self::Panel {
        &mut self.panel
    }

    fn storage(&mut self) -> &mut Self::Storage {
        &mut self.storage
    }

    fn serial(&mut self) -> &mut Self::Serial {
        &mut self.serial
    }

    fn clock(&self) -> &Self::Clock {
        &self.clock
    }

    fn arm_reset(&mut self, delay_ms: u32) {
        self.reset_armed = Some(delay_ms);
    }
}
