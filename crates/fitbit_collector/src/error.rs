//! Custom error types for the collector.

use chrono::NaiveDate;
use fitbit_client::FitbitError;
use std::path::PathBuf;
use thiserror::Error;

/// Which provider call failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    DailyActivity,
    IntradaySeries,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::DailyActivity => f.write_str("daily activity"),
            Operation::IntradaySeries => f.write_str("intraday series"),
        }
    }
}

/// Collector errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("{operation} for {date} failed: {source}")]
    Fetch {
        date: NaiveDate,
        operation: Operation,
        #[source]
        source: FitbitError,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl CollectorError {
    pub(crate) fn fetch(date: NaiveDate, operation: Operation, source: FitbitError) -> Self {
        CollectorError::Fetch {
            date,
            operation,
            source,
        }
    }
}

/// Result type alias for collector operations.
pub type CollectorResult<T> = Result<T, CollectorError>;
