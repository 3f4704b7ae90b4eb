use std::time::{Duration, Instant};

use thiserror::Error;

use crate::timer::Mode;

/// How long a notification toast stays on screen
pub const TOAST_DURATION: Duration = Duration::from_millis(2500);

#[derive(Debug, Error, PartialEq)]
pub enum ViewError {
    #[error("progress fraction {0} is not a finite number")]
    InvalidProgress(f64),
    #[error("presentation surface unavailable: {0}")]
    Unavailable(String),
}

/// Which controls the user may press right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start_enabled: bool,
    pub pause_enabled: bool,
    pub reset_enabled: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            start_enabled: true,
            pause_enabled: false,
            reset_enabled: true,
        }
    }
}

/// Presentation surface the controller pushes derived timer state into.
/// It never reads anything back.
pub trait TimerView {
    fn set_timer_display(&mut self, text: &str) -> Result<(), ViewError>;
    fn set_mode(&mut self, mode: Mode) -> Result<(), ViewError>;
    fn set_controls(&mut self, controls: Controls) -> Result<(), ViewError>;
    /// `fraction` is expected in `0.0..=1.0`
    fn set_progress(&mut self, fraction: f64) -> Result<(), ViewError>;
    fn show_notification(&mut self, message: &str) -> Result<(), ViewError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

/// View-model backing the terminal widget
#[derive(Debug, Clone)]
pub struct TerminalView {
    pub timer_text: String,
    pub mode: Mode,
    pub controls: Controls,
    pub progress: f64,
    toast: Option<Toast>,
}

impl Default for TerminalView {
    fn default() -> Self {
        Self {
            timer_text: "25:00".to_string(),
            mode: Mode::Work,
            controls: Controls::default(),
            progress: 0.0,
            toast: None,
        }
    }
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message of the toast still visible at `now`
    pub fn toast(&self, now: Instant) -> Option<&str> {
        self.toast
            .as_ref()
            .filter(|t| now < t.expires_at)
            .map(|t| t.message.as_str())
    }

    pub fn toast_deadline(&self) -> Option<Instant> {
        self.toast.as_ref().map(|t| t.expires_at)
    }

    /// Drop the toast once it has expired; returns true if one was removed
    pub fn expire_toast(&mut self, now: Instant) -> bool {
        let expired = self
            .toast
            .as_ref()
            .is_some_and(|t| now >= t.expires_at);
        if expired {
            self.toast = None;
        }
        expired
    }
}

impl TimerView for TerminalView {
    fn set_timer_display(&mut self, text: &str) -> Result<(), ViewError> {
        self.timer_text.clear();
        self.timer_text.push_str(text);
        Ok(())
    }

    fn set_mode(&mut self, mode: Mode) -> Result<(), ViewError> {
        self.mode = mode;
        Ok(())
    }

    fn set_controls(&mut self, controls: Controls) -> Result<(), ViewError> {
        self.controls = controls;
        Ok(())
    }

    fn set_progress(&mut self, fraction: f64) -> Result<(), ViewError> {
        if !fraction.is_finite() {
            return Err(ViewError::InvalidProgress(fraction));
        }
        self.progress = fraction.clamp(0.0, 1.0);
        Ok(())
    }

    fn show_notification(&mut self, message: &str) -> Result<(), ViewError> {
        self.toast = Some(Toast {
            message: message.to_string(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
        Ok(())
    }
}
