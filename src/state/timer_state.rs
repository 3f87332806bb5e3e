//! Timer engine: one clock, one mutation rule per mode

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Length of a Pomodoro session in seconds (25 minutes)
pub const POMODORO_SECONDS: u64 = 25 * 60;

/// Which way the timer counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Counts up from zero with no upper bound
    Tracker,
    /// Counts down from the session length
    Pomodoro,
}

impl TimerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Tracker => "tracker",
            TimerMode::Pomodoro => "pomodoro",
        }
    }

    pub fn other(self) -> Self {
        match self {
            TimerMode::Tracker => TimerMode::Pomodoro,
            TimerMode::Pomodoro => TimerMode::Tracker,
        }
    }
}

/// Result of a single tick that actually advanced the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub mode: TimerMode,
    pub time_value: u64,
    /// Set when this tick brought a Pomodoro countdown to zero
    pub session_completed: bool,
}

/// Serializable view of the engine for presentation layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub time_value: u64,
    pub is_running: bool,
    pub completed_sessions: u64,
}

/// Stopwatch / Pomodoro countdown state machine.
///
/// The engine has no clock of its own. Whoever owns it calls `tick()` once
/// per period while `is_running()` is true.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    mode: TimerMode,
    time_value: u64,
    is_running: bool,
    completed_sessions: u64,
    pomodoro_seconds: u64,
}

impl TimerEngine {
    /// Create an engine in Tracker mode at zero with the standard session length
    pub fn new() -> Self {
        Self::with_pomodoro_seconds(POMODORO_SECONDS)
    }

    /// Create an engine with a custom Pomodoro length (clamped to at least one second)
    pub fn with_pomodoro_seconds(pomodoro_seconds: u64) -> Self {
        Self {
            mode: TimerMode::Tracker,
            time_value: 0,
            is_running: false,
            completed_sessions: 0,
            pomodoro_seconds: pomodoro_seconds.max(1),
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn time_value(&self) -> u64 {
        self.time_value
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn completed_sessions(&self) -> u64 {
        self.completed_sessions
    }

    pub fn pomodoro_seconds(&self) -> u64 {
        self.pomodoro_seconds
    }

    /// Baseline value for a mode: zero for Tracker, the session length for Pomodoro
    pub fn baseline(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Tracker => 0,
            TimerMode::Pomodoro => self.pomodoro_seconds,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode,
            time_value: self.time_value,
            is_running: self.is_running,
            completed_sessions: self.completed_sessions,
        }
    }

    /// Start running. Returns false if the engine was already running.
    pub fn start(&mut self) -> bool {
        if self.is_running {
            return false;
        }
        self.is_running = true;
        debug!("Timer started in {:?} mode at {}", self.mode, self.time_value);
        true
    }

    /// Stop running. Returns false if the engine was already paused.
    pub fn pause(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        self.is_running = false;
        debug!("Timer paused in {:?} mode at {}", self.mode, self.time_value);
        true
    }

    /// Pause and return to the current mode's baseline. Session count is kept.
    pub fn reset(&mut self) {
        self.pause();
        self.time_value = self.baseline(self.mode);
    }

    /// Pause, switch to the other mode, and reset to its baseline
    pub fn toggle_mode(&mut self) -> TimerMode {
        self.pause();
        self.mode = self.mode.other();
        self.reset();
        info!("Timer mode switched to {:?}", self.mode);
        self.mode
    }

    /// Advance the clock by one period.
    ///
    /// Returns `None` when paused. A Pomodoro countdown that reaches zero
    /// pauses, counts the session and resets before returning, so zero is
    /// never observable from outside.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.is_running {
            return None;
        }

        let mut session_completed = false;
        match self.mode {
            TimerMode::Tracker => {
                self.time_value += 1;
            }
            TimerMode::Pomodoro => {
                self.time_value = self.time_value.saturating_sub(1);
                if self.time_value == 0 {
                    self.complete_session();
                    session_completed = true;
                }
            }
        }

        Some(TickOutcome {
            mode: self.mode,
            time_value: self.time_value,
            session_completed,
        })
    }

    fn complete_session(&mut self) {
        self.pause();
        self.completed_sessions += 1;
        self.reset();
        info!("Pomodoro session completed ({} total)", self.completed_sessions);
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pomodoro_engine() -> TimerEngine {
        let mut engine = TimerEngine::new();
        engine.toggle_mode();
        engine
    }

    #[test]
    fn starts_in_tracker_mode_at_zero() {
        let engine = TimerEngine::new();
        assert_eq!(engine.mode(), TimerMode::Tracker);
        assert_eq!(engine.time_value(), 0);
        assert!(!engine.is_running());
        assert_eq!(engine.completed_sessions(), 0);
    }

    #[test]
    fn tracker_counts_every_tick() {
        let mut engine = TimerEngine::new();
        engine.start();
        for n in 1..=3_700 {
            let outcome = engine.tick().expect("running engine ticks");
            assert_eq!(outcome.time_value, n);
            assert!(!outcome.session_completed);
        }
        assert_eq!(engine.time_value(), 3_700);
    }

    #[test]
    fn tick_is_a_no_op_while_paused() {
        let mut engine = TimerEngine::new();
        assert_eq!(engine.tick(), None);
        engine.start();
        engine.tick();
        engine.pause();
        assert_eq!(engine.tick(), None);
        assert_eq!(engine.time_value(), 1);
    }

    #[test]
    fn start_and_pause_are_idempotent() {
        let mut engine = TimerEngine::new();
        assert!(engine.start());
        assert!(!engine.start());
        assert!(engine.is_running());
        assert!(engine.pause());
        assert!(!engine.pause());
        assert!(!engine.is_running());
    }

    #[test]
    fn full_pomodoro_completes_one_session() {
        let mut engine = pomodoro_engine();
        assert_eq!(engine.time_value(), POMODORO_SECONDS);
        engine.start();

        for _ in 1..POMODORO_SECONDS {
            let outcome = engine.tick().expect("running engine ticks");
            assert!(!outcome.session_completed);
            assert!(outcome.time_value > 0);
        }
        let last = engine.tick().expect("final tick");

        assert!(last.session_completed);
        assert_eq!(last.time_value, POMODORO_SECONDS);
        assert_eq!(engine.completed_sessions(), 1);
        assert_eq!(engine.time_value(), POMODORO_SECONDS);
        assert!(!engine.is_running());
        assert_eq!(engine.tick(), None);
    }

    #[test]
    fn short_session_length_still_completes() {
        let mut engine = TimerEngine::with_pomodoro_seconds(0);
        assert_eq!(engine.pomodoro_seconds(), 1);
        engine.toggle_mode();
        engine.start();
        let outcome = engine.tick().expect("tick");
        assert!(outcome.session_completed);
        assert_eq!(engine.completed_sessions(), 1);
    }

    #[test]
    fn reset_pauses_and_keeps_sessions() {
        let mut engine = TimerEngine::with_pomodoro_seconds(2);
        engine.toggle_mode();
        engine.start();
        engine.tick();
        engine.tick();
        assert_eq!(engine.completed_sessions(), 1);

        engine.start();
        engine.tick();
        assert_eq!(engine.time_value(), 1);
        engine.reset();
        assert!(!engine.is_running());
        assert_eq!(engine.time_value(), 2);
        assert_eq!(engine.completed_sessions(), 1);
    }

    #[test]
    fn toggle_mode_twice_restores_mode_and_baseline() {
        let mut engine = TimerEngine::new();
        engine.start();
        for _ in 0..42 {
            engine.tick();
        }

        engine.toggle_mode();
        assert_eq!(engine.mode(), TimerMode::Pomodoro);
        assert!(!engine.is_running());
        engine.toggle_mode();

        assert_eq!(engine.mode(), TimerMode::Tracker);
        assert_eq!(engine.time_value(), 0);
        assert!(!engine.is_running());
    }

    #[test]
    fn toggle_mode_stops_a_running_countdown() {
        let mut engine = pomodoro_engine();
        engine.start();
        engine.tick();
        engine.toggle_mode();
        engine.toggle_mode();
        assert_eq!(engine.mode(), TimerMode::Pomodoro);
        assert_eq!(engine.time_value(), POMODORO_SECONDS);
        assert!(!engine.is_running());
    }
}
