use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::chime::Chime;
use crate::input::Command;
use crate::scheduler::{Scheduler, TickHandle, TickQueue};
use crate::timer::{TickOutcome, TimerState};
use crate::view::{Controls, TimerView};

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

pub const SESSION_ENDED_MESSAGE: &str = "Session ended. Press Start to begin next session.";

/// Bridges input events to [`TimerState`] and owns the one-second tick loop.
///
/// At most one tick is pending at a time. Every transition that stops the
/// countdown cancels it before returning, so a paused or reset timer never
/// sees a stale decrement.
pub struct TimerController<S: Scheduler, V: TimerView, C: Chime> {
    state: TimerState,
    scheduler: S,
    view: V,
    chime: C,
    pending: Option<TickHandle>,
    tick_interval: Duration,
}

impl<S: Scheduler, V: TimerView, C: Chime> TimerController<S, V, C> {
    pub fn new(state: TimerState, scheduler: S, view: V, chime: C) -> Self {
        let mut controller = Self {
            state,
            scheduler,
            view,
            chime,
            pending: None,
            tick_interval: TICK_INTERVAL,
        };
        controller.sync_view();
        controller
    }

    /// Shorter intervals are only useful for driving the loop headlessly
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending
    }

    pub fn on_start(&mut self) {
        self.state.start();
        self.sync_view();
        if self.state.is_running() {
            self.schedule_tick();
        }
        info!(remaining = self.state.remaining_seconds(), mode = %self.state.mode(), "timer started");
    }

    pub fn on_pause(&mut self) {
        self.state.pause();
        self.cancel_tick();
        self.sync_view();
        info!(remaining = self.state.remaining_seconds(), "timer paused");
    }

    pub fn on_reset(&mut self) {
        self.state.reset();
        self.cancel_tick();
        self.sync_view();
        info!(mode = %self.state.mode(), "timer reset");
    }

    pub fn on_duration_change(&mut self, work_minutes: i64, break_minutes: i64) {
        self.state.set_durations(work_minutes, break_minutes);
        self.sync_view();
        info!(work_minutes, break_minutes, "durations changed");
    }

    /// Apply a command from the input surface. Returns false on quit.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.on_start(),
            Command::Pause => self.on_pause(),
            Command::Reset => self.on_reset(),
            Command::CommitDurations {
                work_minutes,
                break_minutes,
            } => self.on_duration_change(work_minutes, break_minutes),
            Command::Quit => return false,
        }
        true
    }

    /// Called by the app loop once the scheduler reports `handle` as due
    pub fn on_tick_fired(&mut self, handle: TickHandle) {
        if self.pending != Some(handle) {
            debug!(?handle, "ignoring stale tick");
            return;
        }
        self.pending = None;

        let outcome = self.state.tick();
        self.sync_view();
        if self.state.is_running() {
            self.schedule_tick();
        }

        if outcome == TickOutcome::Finished {
            info!(mode = %self.state.mode(), "session ended");
            if let Err(e) = self.chime.signal_session_ended() {
                warn!(error = %e, "completion chime failed");
            }
            if let Err(e) = self.view.show_notification(SESSION_ENDED_MESSAGE) {
                warn!(error = %e, "failed to show notification");
            }
        }
    }

    fn schedule_tick(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.schedule_after(self.tick_interval));
        }
    }

    fn cancel_tick(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Recompute every derived value and push it to the view. Each push is
    /// independent so one failing call doesn't hide the rest.
    fn sync_view(&mut self) {
        let controls = Controls {
            start_enabled: !self.state.is_running() && self.state.remaining_seconds() > 0,
            pause_enabled: self.state.is_running(),
            reset_enabled: true,
        };

        let results = [
            ("timer display", self.view.set_timer_display(&self.state.display_text())),
            ("mode", self.view.set_mode(self.state.mode())),
            ("controls", self.view.set_controls(controls)),
            ("progress", self.view.set_progress(self.state.progress_fraction())),
        ];
        for (what, result) in results {
            if let Err(e) = result {
                warn!(error = %e, "failed to update {what}");
            }
        }
    }
}

impl<V: TimerView, C: Chime> TimerController<TickQueue, V, C> {
    /// Fire every tick whose deadline is at or before `now`
    pub fn fire_due(&mut self, now: Instant) {
        while let Some(handle) = self.scheduler.pop_due(now) {
            self.on_tick_fired(handle);
        }
    }
}
