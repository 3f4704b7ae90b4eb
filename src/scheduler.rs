use std::time::{Duration, Instant};

/// Opaque reference to a one-shot tick that has not fired yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub(crate) u64);

/// One-shot delayed tick scheduling as seen by the controller
pub trait Scheduler {
    fn schedule_after(&mut self, delay: Duration) -> TickHandle;
    /// Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TickHandle);
}

/// Deadline queue polled by the app loop. Ticks fire when the loop
/// observes `pop_due` returning their handle.
#[derive(Debug, Default)]
pub struct TickQueue {
    next_id: u64,
    entries: Vec<(TickHandle, Instant)>,
}

impl TickQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|&(_, at)| at).min()
    }

    /// Remove and return the earliest handle whose deadline is at or before `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<TickHandle> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.1 <= now)
            .min_by_key(|(_, entry)| entry.1)
            .map(|(idx, _)| idx)?;
        Some(self.entries.remove(idx).0)
    }
}

impl Scheduler for TickQueue {
    fn schedule_after(&mut self, delay: Duration) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.entries.push((handle, Instant::now() + delay));
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.entries.retain(|&(h, _)| h != handle);
    }
}
