use std::time::Duration;
use tokio::time::Instant;

/// A delay pinned to the instant it was armed.
///
/// The timer is passive: it never fires on its own, owners poll it with the
/// current time or hand its deadline to the clock loop to sleep on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinnedTimeDelay {
    start_time: Instant,
    delay: Duration,
}

impl PinnedTimeDelay {
    pub fn new(start_time: Instant, delay: Duration) -> Self { Self { start_time, delay } }
    pub fn get_end(&self) -> Instant { self.start_time + self.delay }
    pub fn is_elapsed(&self, now: Instant) -> bool { now >= self.get_end() }
    pub fn time_left(&self, now: Instant) -> Duration { self.get_end().saturating_duration_since(now) }
}

/// A single re-armable, cancellable slot for one pending action.
///
/// Arming an already armed timer replaces the pending deadline, so at most one
/// action of a kind is ever outstanding. The payload names which action is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledSlot<T: Copy> {
    pending: Option<(PinnedTimeDelay, T)>,
}

impl<T: Copy> Default for ScheduledSlot<T> {
    fn default() -> Self { Self { pending: None } }
}

impl<T: Copy> ScheduledSlot<T> {
    pub fn arm(&mut self, now: Instant, delay: Duration, action: T) {
        self.pending = Some((PinnedTimeDelay::new(now, delay), action));
    }

    /// Drops the pending action, returning it if one was armed.
    pub fn cancel(&mut self) -> Option<T> { self.pending.take().map(|(_, action)| action) }

    pub fn is_armed(&self) -> bool { self.pending.is_some() }

    pub fn pending(&self) -> Option<T> { self.pending.map(|(_, action)| action) }

    pub fn deadline(&self) -> Option<Instant> { self.pending.map(|(delay, _)| delay.get_end()) }

    pub fn time_left(&self, now: Instant) -> Option<Duration> {
        self.pending.map(|(delay, _)| delay.time_left(now))
    }

    /// Takes the pending action if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((delay, action)) if delay.is_elapsed(now) => {
                self.pending = None;
                Some(action)
            }
            _ => None,
        }
    }
}
