//! Single-slot delayed trigger used for auto-generation while typing.

use std::time::{Duration, Instant};

pub const AUTO_GENERATE_DELAY: Duration = Duration::from_millis(250);

/// Holds at most one pending deadline. Scheduling again replaces it, so the
/// trigger only fires once input has been quiet for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(AUTO_GENERATE_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Time left until the pending deadline, zero if already due.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Returns `true` exactly once per deadline, when `now` has reached it.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.schedule(start);

        assert!(!debouncer.fire_if_due(start + Duration::from_millis(249)));
        assert!(debouncer.fire_if_due(start + Duration::from_millis(250)));
        assert!(!debouncer.fire_if_due(start + Duration::from_millis(600)));
        assert_eq!(debouncer.remaining(start), None);
    }

    #[test]
    fn rescheduling_pushes_the_deadline_back() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(200));

        assert!(!debouncer.fire_if_due(start + Duration::from_millis(300)));
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(300)),
            Some(Duration::from_millis(150))
        );
        assert!(debouncer.fire_if_due(start + Duration::from_millis(450)));
    }

    #[test]
    fn cancel_drops_pending_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.schedule(start);
        debouncer.cancel();

        assert_eq!(debouncer.remaining(start), None);
        assert!(!debouncer.fire_if_due(start + Duration::from_secs(1)));
    }
}
