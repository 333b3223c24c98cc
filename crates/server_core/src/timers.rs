//! Delayed one-shot callbacks driven by the tick loop.
//!
//! Timers scheduled while a tick is running are staged and only join the
//! active set at the next tick boundary, so nothing scheduled during tick N
//! is advanced or fired during tick N.

use crate::effects::Effects;

/// Identifier of a scheduled timer. Carries no cancellation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

pub type TimerFn = Box<dyn FnOnce(&mut Effects<'_>)>;

pub struct Timer {
    pub handle: TimerHandle,
    pub duration: f32,
    pub elapsed: f32,
    callback: TimerFn,
}

impl Timer {
    pub fn fire(self, fx: &mut Effects<'_>) {
        (self.callback)(fx);
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("handle", &self.handle)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct TimerScheduler {
    active: Vec<Timer>,
    staged: Vec<Timer>,
    next_id: u64,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, duration: f32, callback: TimerFn) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.staged.push(Timer { handle, duration: duration.max(0.0), elapsed: 0.0, callback });
        handle
    }

    /// Merge timers scheduled since the last boundary into the active set.
    pub fn promote_staged(&mut self) {
        self.active.append(&mut self.staged);
    }

    /// Add `dt_s` to every active timer and remove the ones that are due, in
    /// scheduling order. The caller fires them.
    pub fn advance(&mut self, dt_s: f32) -> Vec<Timer> {
        let mut due = Vec::new();
        let mut keep = Vec::with_capacity(self.active.len());
        for mut t in self.active.drain(..) {
            t.elapsed += dt_s;
            if t.elapsed >= t.duration {
                due.push(t);
            } else {
                keep.push(t);
            }
        }
        self.active = keep;
        due
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.staged.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> TimerFn {
        Box::new(|_fx| {})
    }

    #[test]
    fn staged_timers_do_not_advance_until_promoted() {
        let mut s = TimerScheduler::new();
        s.schedule(0.0, noop());
        assert!(s.advance(1.0).is_empty());
        s.promote_staged();
        assert_eq!(s.advance(0.0).len(), 1);
        assert!(s.is_empty());
    }

    #[test]
    fn fires_once_when_elapsed_reaches_duration() {
        let mut s = TimerScheduler::new();
        let h = s.schedule(0.1, noop());
        s.promote_staged();
        assert!(s.advance(0.05).is_empty());
        let due = s.advance(0.05);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].handle, h);
        assert!(s.advance(10.0).is_empty());
    }

    #[test]
    fn due_timers_keep_scheduling_order() {
        let mut s = TimerScheduler::new();
        let a = s.schedule(0.5, noop());
        let b = s.schedule(0.1, noop());
        s.promote_staged();
        let due: Vec<_> = s.advance(1.0).into_iter().map(|t| t.handle).collect();
        assert_eq!(due, vec![a, b]);
    }
}
