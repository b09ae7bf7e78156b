//! Cancelable one-shot timer driven by the host clock
//!
//! Only the scroll-into-view side effect goes through here; focus and
//! highlight state never wait on it.

/// Holds at most one pending value; scheduling again replaces it.
#[derive(Debug, Clone)]
pub struct DebounceTimer<T> {
    delay_ms: f64,
    pending: Option<(T, f64)>,
}

impl<T> DebounceTimer<T> {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Replace any pending value with `value`, due `delay_ms` after `now_ms`
    pub fn schedule(&mut self, value: T, now_ms: f64) {
        self.pending = Some((value, now_ms + self.delay_ms));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// When the pending value becomes due, if any
    pub fn deadline(&self) -> Option<f64> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Take the pending value if its deadline has passed
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        match self.pending {
            Some((_, due)) if now_ms >= due => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay_once() {
        let mut timer = DebounceTimer::new(100.0);
        timer.schedule(3usize, 1000.0);

        assert_eq!(timer.poll(1050.0), None);
        assert_eq!(timer.poll(1100.0), Some(3));
        assert_eq!(timer.poll(1200.0), None);
    }

    #[test]
    fn test_latest_schedule_wins() {
        let mut timer = DebounceTimer::new(100.0);
        timer.schedule(1usize, 0.0);
        timer.schedule(2usize, 80.0);

        // The first deadline passed, but it was superseded
        assert_eq!(timer.poll(120.0), None);
        assert_eq!(timer.poll(180.0), Some(2));
    }

    #[test]
    fn test_cancel() {
        let mut timer = DebounceTimer::new(50.0);
        timer.schedule("x", 0.0);
        assert_eq!(timer.deadline(), Some(50.0));
        timer.cancel();
        assert_eq!(timer.deadline(), None);
        assert_eq!(timer.poll(1000.0), None);
    }
}
