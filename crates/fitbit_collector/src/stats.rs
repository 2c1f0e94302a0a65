use std::time::Duration;

/// Counters for one collection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionStats {
    /// Dates fully collected
    pub dates: usize,
    /// Provider calls issued
    pub calls: usize,
    /// Calls that had to wait for the quota window
    pub throttled_calls: usize,
    /// Total time spent waiting on the quota
    pub waited: Duration,
    pub activity_rows: usize,
    pub summary_rows: usize,
    pub intraday_rows: usize,
    pub elapsed: Duration,
}

impl CollectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_wait(&mut self, waited: Duration) {
        self.calls += 1;
        if !waited.is_zero() {
            self.throttled_calls += 1;
            self.waited += waited;
        }
    }

    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            dates = self.dates,
            calls = self.calls,
            throttled_calls = self.throttled_calls,
            waited = format!("{:.1}s", self.waited.as_secs_f64()),
            activity_rows = self.activity_rows,
            summary_rows = self.summary_rows,
            intraday_rows = self.intraday_rows,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "collection finished"
        );
    }
}
