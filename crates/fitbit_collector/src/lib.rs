//! Rate-limited collection of Fitbit activity data into flat CSV files.
//!
//! A [`Collector`] walks a [`DateRange`], asks the provider for the daily
//! activity summary and one intraday series per date while staying under a
//! sliding hourly call quota, and writes three datasets at the end of the run:
//! logged activities, daily summaries and intraday samples.

pub mod accumulator;
pub mod collector;
pub mod config;
pub mod dates;
pub mod error;
pub mod rate_limit;
pub mod records;
pub mod sink;
pub mod stats;
pub mod transforms;

mod test_utils;

pub use accumulator::Accumulator;
pub use collector::{CollectOptions, CollectionReport, Collector};
pub use config::{CollectorConfig, Overrides};
pub use dates::DateRange;
pub use error::{CollectorError, CollectorResult, Operation};
pub use rate_limit::RateLimiter;
pub use records::{ActivityEventRow, CsvRow, DailyRecord, DaySummaryRow, IntradayRow};
pub use sink::OutputFiles;
pub use stats::CollectionStats;
