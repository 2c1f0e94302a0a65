//! Minimal `FitbitClient` trait and typed records for the Fitbit Web API.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod auth;
pub mod config;
pub mod http_client;
pub mod observability;
pub mod utils;

#[derive(Debug, Error)]
pub enum FitbitError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rate limited by provider (retry after {retry_after:?}s): {body}")]
    RateLimited {
        retry_after: Option<u64>,
        body: String,
    },
    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("decoding {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing field `{0}` in response")]
    MissingField(String),
    #[error("token store error: {0}")]
    TokenStore(String),
}

impl FitbitError {
    /// Map a non-success status code that has no dedicated variant.
    pub fn from_status(status: u16, body: String) -> Self {
        FitbitError::Api { status, body }
    }
}

/// Resource whose intraday time series can be requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntradayMetric {
    Steps,
    Calories,
    Distance,
    Floors,
    Elevation,
}

impl IntradayMetric {
    /// Path segment used by the API, also the `activities-{name}-intraday` key.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntradayMetric::Steps => "steps",
            IntradayMetric::Calories => "calories",
            IntradayMetric::Distance => "distance",
            IntradayMetric::Floors => "floors",
            IntradayMetric::Elevation => "elevation",
        }
    }
}

impl fmt::Display for IntradayMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntradayMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "steps" => Ok(IntradayMetric::Steps),
            "calories" => Ok(IntradayMetric::Calories),
            "distance" => Ok(IntradayMetric::Distance),
            "floors" => Ok(IntradayMetric::Floors),
            "elevation" => Ok(IntradayMetric::Elevation),
            other => Err(format!("unknown intraday metric: {other}")),
        }
    }
}

/// Sampling interval of an intraday series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DetailLevel {
    #[default]
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::OneMinute => "1min",
            DetailLevel::FiveMinutes => "5min",
            DetailLevel::FifteenMinutes => "15min",
        }
    }

    pub fn minutes(&self) -> u32 {
        match self {
            DetailLevel::OneMinute => 1,
            DetailLevel::FiveMinutes => 5,
            DetailLevel::FifteenMinutes => 15,
        }
    }

    /// Number of samples in a complete day at this interval.
    pub fn samples_per_day(&self) -> usize {
        (24 * 60 / self.minutes()) as usize
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1min" | "1" => Ok(DetailLevel::OneMinute),
            "5min" | "5" => Ok(DetailLevel::FiveMinutes),
            "15min" | "15" => Ok(DetailLevel::FifteenMinutes),
            other => Err(format!("unsupported detail level: {other}")),
        }
    }
}

/// One logged activity from the daily activity endpoint.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggedActivity {
    #[serde(default)]
    pub log_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    /// Milliseconds.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub steps: Option<i64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub calories: Option<i64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ActivityDistance {
    pub activity: String,
    pub distance: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDaySummary {
    pub steps: i64,
    pub sedentary_minutes: i64,
    pub lightly_active_minutes: i64,
    pub fairly_active_minutes: i64,
    pub very_active_minutes: i64,
    pub calories_out: i64,
    #[serde(default)]
    pub activity_calories: Option<i64>,
    #[serde(rename = "caloriesBMR", default)]
    pub calories_bmr: Option<i64>,
    #[serde(default)]
    pub resting_heart_rate: Option<i64>,
    #[serde(default)]
    pub floors: Option<i64>,
    #[serde(default)]
    pub distances: Vec<ActivityDistance>,
}

impl ActivityDaySummary {
    /// The `total` entry of the per-activity distance breakdown.
    pub fn total_distance(&self) -> Option<f64> {
        self.distances
            .iter()
            .find(|d| d.activity == "total")
            .map(|d| d.distance)
    }
}

/// Response of `GET /1/user/-/activities/date/{date}.json`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DailyActivity {
    #[serde(default)]
    pub activities: Vec<LoggedActivity>,
    pub summary: ActivityDaySummary,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct IntradaySample {
    /// `HH:MM:SS`, local to the user.
    pub time: String,
    #[serde(deserialize_with = "deserialize_number")]
    pub value: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntradaySeries {
    #[serde(default)]
    pub dataset: Vec<IntradaySample>,
    #[serde(default)]
    pub dataset_interval: Option<u32>,
    #[serde(default)]
    pub dataset_type: Option<String>,
}

/// Values arrive as JSON numbers on intraday endpoints but as strings on the
/// aggregate ones; accept both.
fn deserialize_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom(format!("number out of range: {n}"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| D::Error::custom(format!("expected numeric string, got {s:?}: {e}"))),
        other => Err(D::Error::custom(format!(
            "expected number or string, got {other}"
        ))),
    }
}

#[async_trait]
pub trait FitbitClient: Send + Sync + 'static {
    /// Daily activity summary and logged activities for `date`.
    async fn get_daily_activity(&self, date: NaiveDate) -> Result<DailyActivity, FitbitError>;

    /// Intraday series of `metric` on `date` at the given sampling interval.
    async fn get_intraday_series(
        &self,
        metric: IntradayMetric,
        date: NaiveDate,
        detail: DetailLevel,
    ) -> Result<IntradaySeries, FitbitError>;
}
