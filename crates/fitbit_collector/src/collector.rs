//! The collection run: walk a date range, call the provider twice per date
//! under the quota, reshape, accumulate, and write the files once at the end.

use fitbit_client::{DetailLevel, FitbitClient, IntradayMetric};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::accumulator::Accumulator;
use crate::dates::DateRange;
use crate::error::{CollectorError, CollectorResult, Operation};
use crate::rate_limit::RateLimiter;
use crate::sink::{self, OutputFiles};
use crate::stats::CollectionStats;
use crate::transforms;

pub const RATE_LIMIT_WAIT: &str = "collector_rate_limit_wait_seconds";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectOptions {
    pub metric: IntradayMetric,
    pub detail: DetailLevel,
    pub fill_inactive: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            metric: IntradayMetric::Steps,
            detail: DetailLevel::OneMinute,
            fill_inactive: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub files: OutputFiles,
    pub stats: CollectionStats,
}

pub struct Collector {
    client: Arc<dyn FitbitClient>,
    limiter: RateLimiter,
    options: CollectOptions,
}

impl Collector {
    pub fn new(
        client: Arc<dyn FitbitClient>,
        limiter: RateLimiter,
        options: CollectOptions,
    ) -> Self {
        Self {
            client,
            limiter,
            options,
        }
    }

    /// Fetch and reshape every date of `range` in ascending order.
    ///
    /// Stops at the first failed call; nothing collected so far is returned.
    pub async fn collect(
        &mut self,
        range: &DateRange,
    ) -> CollectorResult<(Accumulator, CollectionStats)> {
        let started = Instant::now();
        let mut acc = Accumulator::new();
        let mut stats = CollectionStats::new();
        let CollectOptions {
            metric,
            detail,
            fill_inactive,
        } = self.options;

        tracing::info!(
            start = %range.start(),
            end = %range.end(),
            dates = range.len(),
            max_calls_per_window = self.limiter.max_calls(),
            metric = %metric,
            detail = %detail,
            "starting collection"
        );

        for date in range.iter() {
            self.throttle(&mut stats).await;
            let daily = self
                .client
                .get_daily_activity(date)
                .await
                .map_err(|e| CollectorError::fetch(date, Operation::DailyActivity, e))?;

            self.throttle(&mut stats).await;
            let series = self
                .client
                .get_intraday_series(metric, date, detail)
                .await
                .map_err(|e| CollectorError::fetch(date, Operation::IntradaySeries, e))?;

            let record = transforms::daily_record(date, &daily, &series, detail, fill_inactive);
            tracing::debug!(
                date = %date,
                activities = record.activities.len(),
                samples = record.intraday.len(),
                "collected date"
            );
            acc.push(record);
            stats.dates += 1;
        }

        stats.activity_rows = acc.activities().len();
        stats.summary_rows = acc.summaries().len();
        stats.intraday_rows = acc.intraday().len();
        stats.elapsed = started.elapsed();
        Ok((acc, stats))
    }

    /// Collect `range` and write the three datasets into `out_dir`.
    pub async fn run(
        &mut self,
        range: &DateRange,
        out_dir: &Path,
    ) -> CollectorResult<CollectionReport> {
        let (acc, stats) = self.collect(range).await?;
        let files = OutputFiles::in_dir(out_dir, range, self.options.metric);
        sink::write_all(out_dir, &files, &acc)?;
        tracing::info!(
            activities = %files.activities.display(),
            summary = %files.summary.display(),
            intraday = %files.intraday.display(),
            "wrote datasets"
        );
        Ok(CollectionReport { files, stats })
    }

    async fn throttle(&mut self, stats: &mut CollectionStats) {
        let waited = self.limiter.acquire().await;
        if waited > Duration::ZERO {
            metrics::histogram!(RATE_LIMIT_WAIT).record(waited.as_secs_f64());
        }
        stats.record_wait(waited);
    }
}

impl CollectionReport {
    pub fn paths(&self) -> [&PathBuf; 3] {
        [&self.files.activities, &self.files.summary, &self.files.intraday]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailingClient, StubClient};
    use chrono::NaiveDate;

    fn range(days: u32) -> DateRange {
        let start = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        DateRange::new(start, start + chrono::Days::new(u64::from(days - 1))).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn issues_two_calls_per_date_in_order() {
        let stub = Arc::new(StubClient::default());
        let mut collector = Collector::new(
            stub.clone(),
            RateLimiter::per_hour(150).unwrap(),
            CollectOptions::default(),
        );
        let (acc, stats) = collector.collect(&range(5)).await.unwrap();

        assert_eq!(stub.calls().len(), 10);
        assert_eq!(stats.calls, 10);
        assert_eq!(stats.dates, 5);
        assert_eq!(acc.days(), 5);
        let dates: Vec<_> = acc.summaries().iter().map(|s| s.date.clone()).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        // Daily first, then intraday, for each date.
        assert_eq!(stub.calls()[0].0, "daily");
        assert_eq!(stub.calls()[1].0, "intraday");
        assert_eq!(stub.calls()[1].1, stub.calls()[0].1);
    }

    #[tokio::test(start_paused = true)]
    async fn small_quota_delays_but_never_skips() {
        let stub = Arc::new(StubClient::default());
        let mut collector = Collector::new(
            stub.clone(),
            RateLimiter::per_hour(3).unwrap(),
            CollectOptions::default(),
        );
        let (acc, stats) = collector.collect(&range(4)).await.unwrap();

        assert_eq!(acc.days(), 4);
        assert_eq!(stub.calls().len(), 8);
        // 8 calls at 3 per hour: admitted at 0h, 1h and 2h.
        assert_eq!(stats.throttled_calls, 2);
        assert!(stats.waited >= Duration::from_secs(2 * 3600));
    }

    #[tokio::test(start_paused = true)]
    async fn first_failure_halts_the_run() {
        let client = Arc::new(FailingClient::on(NaiveDate::from_ymd_opt(2020, 5, 3).unwrap()));
        let mut collector = Collector::new(
            client.clone(),
            RateLimiter::per_hour(150).unwrap(),
            CollectOptions::default(),
        );
        let dir = tempfile::tempdir().unwrap();
        let err = collector
            .run(&range(5), dir.path())
            .await
            .expect_err("should fail");
        match err {
            CollectorError::Fetch {
                date, operation, ..
            } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2020, 5, 3).unwrap());
                assert_eq!(operation, Operation::DailyActivity);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Two full dates plus the failing call, then nothing.
        assert_eq!(client.call_count(), 5);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
