//! Tick bookkeeping.

use ecogrid_core::{DeathCause, Population};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockState {
    Idle,
    Running,
    TickComplete,
    Extinct,
}

/// Drives the idle → running → tick-complete → (extinct | running) cycle.
#[derive(Debug, Clone)]
pub struct Clock {
    state: ClockState,
    tick: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            state: ClockState::Idle,
            tick: 0,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Number of the current (or last completed) tick; 0 before the first.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_extinct(&self) -> bool {
        self.state == ClockState::Extinct
    }

    pub(crate) fn begin(&mut self) -> u64 {
        debug_assert_ne!(self.state, ClockState::Running, "tick started twice");
        self.state = ClockState::Running;
        self.tick += 1;
        self.tick
    }

    pub(crate) fn finish(&mut self, population: &Population) {
        debug_assert_eq!(self.state, ClockState::Running, "tick finished while not running");
        self.state = if population.is_extinct() {
            ClockState::Extinct
        } else {
            ClockState::TickComplete
        };
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub births: usize,
    pub deaths: HashMap<DeathCause, usize>,
    pub placement_failures: usize,
    pub grid_growths: u32,
    pub population: Population,
}

impl TickReport {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }

    pub fn record_death(&mut self, cause: DeathCause) {
        *self.deaths.entry(cause).or_insert(0) += 1;
    }

    pub fn total_deaths(&self) -> usize {
        self.deaths.values().sum()
    }

    pub fn deaths_by(&self, cause: DeathCause) -> usize {
        self.deaths.get(&cause).copied().unwrap_or(0)
    }
}
