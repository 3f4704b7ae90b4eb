use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_WORK_MINUTES: i64 = 25;
pub const DEFAULT_BREAK_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Work,
    Break,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown mode `{0}` (expected `work` or `break`)")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Mode::Work),
            "break" => Ok(Mode::Break),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// Result of advancing the countdown by one second
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Finished,
    NotFinished,
}

/// Countdown state for one work/break timer. Pure transitions only; the
/// controller owns timing.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerState {
    work_seconds: i64,
    break_seconds: i64,
    mode: Mode,
    running: bool,
    remaining_seconds: i64,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_MINUTES, DEFAULT_BREAK_MINUTES)
    }
}

impl TimerState {
    pub fn new(work_minutes: i64, break_minutes: i64) -> Self {
        Self {
            work_seconds: work_minutes.saturating_mul(60),
            break_seconds: break_minutes.saturating_mul(60),
            mode: Mode::Work,
            running: false,
            remaining_seconds: work_minutes.saturating_mul(60),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.remaining_seconds
    }

    pub fn work_seconds(&self) -> i64 {
        self.work_seconds
    }

    pub fn break_seconds(&self) -> i64 {
        self.break_seconds
    }

    /// Full length of a session in the current mode
    pub fn total_seconds(&self) -> i64 {
        match self.mode {
            Mode::Work => self.work_seconds,
            Mode::Break => self.break_seconds,
        }
    }

    /// Durations are not validated here; the input surface substitutes
    /// defaults for anything it can't parse.
    pub fn set_durations(&mut self, work_minutes: i64, break_minutes: i64) {
        self.work_seconds = work_minutes.saturating_mul(60);
        self.break_seconds = break_minutes.saturating_mul(60);
        if !self.running {
            self.remaining_seconds = self.total_seconds();
        }
    }

    pub fn start(&mut self) {
        if !self.running && self.remaining_seconds > 0 {
            self.running = true;
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_seconds = self.total_seconds();
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::NotFinished;
        }
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }
        if self.remaining_seconds <= 0 {
            self.running = false;
            self.remaining_seconds = 0;
            return TickOutcome::Finished;
        }
        TickOutcome::NotFinished
    }

    /// Change mode without starting or stopping the countdown
    pub fn switch_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.remaining_seconds = self.total_seconds();
    }

    /// `MM:SS`; minutes keep counting past 59
    pub fn display_text(&self) -> String {
        let minutes = self.remaining_seconds.div_euclid(60);
        let seconds = self.remaining_seconds.rem_euclid(60);
        format!("{minutes:02}:{seconds:02}")
    }

    pub fn progress_fraction(&self) -> f64 {
        let total = self.total_seconds();
        if total <= 0 {
            return 0.0;
        }
        ((total - self.remaining_seconds) as f64 / total as f64).clamp(0.0, 1.0)
    }
}
