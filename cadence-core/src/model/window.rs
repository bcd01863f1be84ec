use chrono::{DateTime, Duration, Utc};

/// Trailing observation window over the outcome store.
///
/// Jobs take the window explicitly instead of reading the clock internally,
/// so batch runs are deterministic and tests can drive time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailingWindow {
    /// Inclusive end of the window (normally the batch run's `now`).
    pub until: DateTime<Utc>,
    /// Number of trailing days covered.
    pub days: u32,
}

impl TrailingWindow {
    pub fn new(until: DateTime<Utc>, days: u32) -> Self {
        Self { until, days }
    }

    /// Inclusive start of the window.
    pub fn start(&self) -> DateTime<Utc> {
        self.until - Duration::days(i64::from(self.days))
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start() && at <= self.until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_bounds() {
        let until = Utc::now();
        let w = TrailingWindow::new(until, 180);
        assert!(w.contains(until));
        assert!(w.contains(until - Duration::days(180)));
        assert!(!w.contains(until - Duration::days(181)));
        assert!(!w.contains(until + Duration::seconds(1)));
    }
}
