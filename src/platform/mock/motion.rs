//! Mock motion implementation for testing

use std::collections::VecDeque;
use std::vec::Vec;

use crate::platform::traits::{Axis, DriveMode, MotionInterface, MotionProfile, MoveResult};

/// Recorded motion command, for test assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    EngagePulley(bool),
    Move {
        axis: Axis,
        steps: i32,
        feedrate: u16,
        stop_on_sensor: bool,
    },
    PositionSelector(u8),
    PositionIdler(u8),
    RestoreSelector(u8),
    RestoreIdler(u8),
    Home { restore_position: bool },
    DisableAll,
}

/// Mock motion collaborator
///
/// Records every command and replays scripted results. Unscripted calls
/// succeed. Failed positioning calls bump the per-axis stall counter, the
/// way a stall-detecting backend would.
#[derive(Debug, Default)]
pub struct MockMotion {
    events: Vec<MotionEvent>,
    move_results: VecDeque<MoveResult>,
    selector_results: VecDeque<MoveResult>,
    idler_results: VecDeque<MoveResult>,
    home_results: VecDeque<MoveResult>,
    enabled: [bool; 3],
    pulley_engaged: bool,
    mode: DriveMode,
    stalls: [u8; 3],
}

impl MockMotion {
    pub fn new() -> Self {
        Self {
            enabled: [true; 3],
            ..Default::default()
        }
    }

    /// Script the result of the next `move_axis` calls, in order
    pub fn queue_move_results(&mut self, results: &[MoveResult]) {
        self.move_results.extend(results.iter().copied());
    }

    /// Script the result of the next `position_selector` calls
    pub fn queue_selector_results(&mut self, results: &[MoveResult]) {
        self.selector_results.extend(results.iter().copied());
    }

    /// Script the result of the next `position_idler` calls
    pub fn queue_idler_results(&mut self, results: &[MoveResult]) {
        self.idler_results.extend(results.iter().copied());
    }

    /// Script the result of the next `home` calls
    pub fn queue_home_results(&mut self, results: &[MoveResult]) {
        self.home_results.extend(results.iter().copied());
    }

    /// Every recorded command, oldest first
    pub fn events(&self) -> &[MotionEvent] {
        &self.events
    }

    /// Number of recorded `move_axis` calls
    pub fn move_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, MotionEvent::Move { .. }))
            .count()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn pulley_engaged(&self) -> bool {
        self.pulley_engaged
    }

    pub fn axis_enabled(&self, axis: Axis) -> bool {
        self.enabled[axis_index(axis)]
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    fn pop_or_success(queue: &mut VecDeque<MoveResult>) -> MoveResult {
        queue.pop_front().unwrap_or(MoveResult::Success)
    }

    fn record_position(&mut self, axis: Axis, result: MoveResult) -> MoveResult {
        self.enabled[axis_index(axis)] = true;
        match result {
            MoveResult::Success => self.stalls[axis_index(axis)] = 0,
            MoveResult::Failed => {
                self.stalls[axis_index(axis)] = self.stalls[axis_index(axis)].saturating_add(1)
            }
        }
        result
    }
}

fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::Selector => 0,
        Axis::Idler => 1,
        Axis::Pulley => 2,
    }
}

impl MotionInterface for MockMotion {
    fn engage_pulley(&mut self, engage: bool) {
        self.pulley_engaged = engage;
        self.events.push(MotionEvent::EngagePulley(engage));
    }

    fn move_axis(
        &mut self,
        axis: Axis,
        steps: i32,
        feedrate: u16,
        _profile: MotionProfile,
        stop_on_sensor: bool,
    ) -> MoveResult {
        self.enabled[axis_index(axis)] = true;
        self.events.push(MotionEvent::Move {
            axis,
            steps,
            feedrate,
            stop_on_sensor,
        });
        Self::pop_or_success(&mut self.move_results)
    }

    fn position_selector(&mut self, channel: u8) -> MoveResult {
        self.events.push(MotionEvent::PositionSelector(channel));
        let result = Self::pop_or_success(&mut self.selector_results);
        self.record_position(Axis::Selector, result)
    }

    fn position_idler(&mut self, channel: u8) -> MoveResult {
        self.events.push(MotionEvent::PositionIdler(channel));
        let result = Self::pop_or_success(&mut self.idler_results);
        self.record_position(Axis::Idler, result)
    }

    fn restore_selector(&mut self, channel: u8) {
        self.enabled[axis_index(Axis::Selector)] = true;
        self.events.push(MotionEvent::RestoreSelector(channel));
    }

    fn restore_idler(&mut self, channel: u8) {
        self.enabled[axis_index(Axis::Idler)] = true;
        self.events.push(MotionEvent::RestoreIdler(channel));
    }

    fn home(&mut self, restore_position: bool) -> MoveResult {
        self.enabled = [true; 3];
        self.events.push(MotionEvent::Home { restore_position });
        Self::pop_or_success(&mut self.home_results)
    }

    fn enable_axis(&mut self, axis: Axis) {
        self.enabled[axis_index(axis)] = true;
    }

    fn disable_axis(&mut self, axis: Axis) {
        self.enabled[axis_index(axis)] = false;
    }

    fn disable_all(&mut self) {
        self.enabled = [false; 3];
        self.events.push(MotionEvent::DisableAll);
    }

    fn any_axis_enabled(&self) -> bool {
        self.enabled.iter().any(|&e| e)
    }

    fn configure_mode(&mut self, mode: DriveMode) {
        self.mode = mode;
    }

    fn stall_count(&self, axis: Axis) -> u8 {
        self.stalls[axis_index(axis)]
    }

    fn clear_stall_count(&mut self, axis: Axis) {
        self.stalls[axis_index(axis)] = 0;
    }
}
