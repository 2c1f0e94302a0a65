//! Environment-based collector settings.

use fitbit_client::{DetailLevel, IntradayMetric};
use std::path::PathBuf;

use crate::collector::CollectOptions;
use crate::error::{CollectorError, CollectorResult};

pub const DEFAULT_MAX_CALLS_PER_HOUR: u32 = 150;

/// Command-line values layered over the environment. `None` keeps the
/// environment's value; `fill_inactive` can only switch the placeholder on.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_calls_per_hour: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub metric: Option<IntradayMetric>,
    pub detail: Option<DetailLevel>,
    pub fill_inactive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    pub max_calls_per_hour: u32,
    pub output_dir: PathBuf,
    pub metric: IntradayMetric,
    pub detail: DetailLevel,
    pub fill_inactive: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_calls_per_hour: DEFAULT_MAX_CALLS_PER_HOUR,
            output_dir: PathBuf::from("data"),
            metric: IntradayMetric::Steps,
            detail: DetailLevel::OneMinute,
            fill_inactive: false,
        }
    }
}

impl CollectorConfig {
    pub fn from_env() -> CollectorResult<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    pub fn from_env_with<F>(mut get: F) -> CollectorResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = get("FITBIT_MAX_CALLS_PER_HOUR") {
            cfg.max_calls_per_hour = raw.trim().parse().map_err(|e| {
                CollectorError::Config(format!("FITBIT_MAX_CALLS_PER_HOUR {raw:?}: {e}"))
            })?;
        }
        if let Some(dir) = get("FITBIT_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("FITBIT_INTRADAY_METRIC") {
            cfg.metric = raw.parse().map_err(CollectorError::Config)?;
        }
        if let Some(raw) = get("FITBIT_INTRADAY_DETAIL") {
            cfg.detail = raw.parse().map_err(CollectorError::Config)?;
        }
        if let Some(raw) = get("FITBIT_FILL_INACTIVE") {
            cfg.fill_inactive = matches!(
                raw.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply command-line overrides and validate the result.
    pub fn with_overrides(mut self, overrides: Overrides) -> CollectorResult<Self> {
        if let Some(max) = overrides.max_calls_per_hour {
            self.max_calls_per_hour = max;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(metric) = overrides.metric {
            self.metric = metric;
        }
        if let Some(detail) = overrides.detail {
            self.detail = detail;
        }
        self.fill_inactive |= overrides.fill_inactive;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> CollectorResult<()> {
        if self.max_calls_per_hour == 0 {
            return Err(CollectorError::Config(
                "max calls per hour must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            metric: self.metric,
            detail: self.detail,
            fill_inactive: self.fill_inactive,
        }
    }
}
