use std::time::{Duration, Instant};

/// Quiet period before a typed query is acted on.
pub const DEBOUNCE_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Holds back a changing value until it has been stable for `quiet`.
///
/// Time is passed in by the caller, so the debouncer owns no timer and
/// nothing can fire once it is cancelled or dropped.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value if it has been stable for the quiet period.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, at)) if now.saturating_duration_since(at) >= self.quiet => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// When the pending value becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.quiet)
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_emits_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DEBOUNCE_QUIET_PERIOD);
        debouncer.push("bat", start);

        assert_eq!(debouncer.poll(start + ms(499)), None);
        assert_eq!(debouncer.poll(start + ms(500)), Some("bat"));
        assert_eq!(debouncer.poll(start + ms(2000)), None);
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_push_resets_timer() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));
        debouncer.push("b", start);
        debouncer.push("ba", start + ms(300));

        assert_eq!(debouncer.poll(start + ms(600)), None);
        assert_eq!(debouncer.deadline(), Some(start + ms(800)));
        assert_eq!(debouncer.poll(start + ms(800)), Some("ba"));
    }

    #[test]
    fn test_cancel_discards_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));
        debouncer.push("batman", start);
        debouncer.cancel();

        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(start + ms(10_000)), None);
    }

    proptest! {
        #[test]
        fn burst_emits_only_last_value(gaps in proptest::collection::vec(0u64..500, 1..20)) {
            let quiet = ms(500);
            let start = Instant::now();
            let mut debouncer = Debouncer::new(quiet);
            let mut now = start;
            let mut emitted = Vec::new();

            for (i, gap) in gaps.iter().enumerate() {
                now += ms(*gap);
                if let Some(v) = debouncer.poll(now) {
                    emitted.push(v);
                }
                debouncer.push(i, now);
            }
            prop_assert!(emitted.is_empty());

            prop_assert_eq!(debouncer.poll(now + quiet - ms(1)), None);
            prop_assert_eq!(debouncer.poll(now + quiet), Some(gaps.len() - 1));
            prop_assert_eq!(debouncer.poll(now + quiet * 4), None);
        }
    }
}
