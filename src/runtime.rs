use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::error;

/// Unified event type consumed by the app loop
#[derive(Clone, Debug)]
pub enum PomoEvent {
    Key(KeyEvent),
    Resize,
    /// The wait ended without input; scheduler deadlines may be due
    Wake,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait PomoEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<PomoEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<PomoEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => PomoEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => PomoEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    error!(error = %e, "terminal event reader stopped");
                    break;
                }
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PomoEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PomoEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<PomoEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<PomoEvent>) -> Self {
        Self { rx }
    }
}

impl PomoEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PomoEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event at a time, waking up for
/// the earliest pending deadline
pub struct Runner<E: PomoEventSource> {
    event_source: E,
    max_wait: Duration,
}

impl<E: PomoEventSource> Runner<E> {
    pub fn new(event_source: E, max_wait: Duration) -> Self {
        Self {
            event_source,
            max_wait,
        }
    }

    /// Blocks until an event arrives, `deadline` passes, or `max_wait`
    /// elapses, whichever is first. Returns Wake on timeout.
    pub fn step(&self, deadline: Option<Instant>) -> PomoEvent {
        let wait = deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
            .map_or(self.max_wait, |until| until.min(self.max_wait));

        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => PomoEvent::Wake,
            Err(RecvTimeoutError::Disconnected) => {
                // no more input will arrive; keep the timer ticking without spinning
                std::thread::sleep(wait);
                PomoEvent::Wake
            }
        }
    }
}
