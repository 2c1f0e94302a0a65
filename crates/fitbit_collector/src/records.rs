//! Flat row types written to the output files.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};

/// A row type with a fixed column set.
///
/// `HEADER` lists the columns in serialization order, so a header can be
/// written for a dataset that ended up with no rows.
pub trait CsvRow: Serialize + DeserializeOwned {
    const HEADER: &'static [&'static str];
}

/// One logged activity (walk, run, ...) on a date.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityEventRow {
    pub date: String,
    pub name: String,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub duration_min: Option<u64>,
    pub steps: Option<i64>,
    pub distance_km: Option<f64>,
    pub calories: Option<i64>,
    pub log_id: Option<i64>,
}

impl CsvRow for ActivityEventRow {
    const HEADER: &'static [&'static str] = &[
        "date",
        "name",
        "description",
        "start_time",
        "duration_min",
        "steps",
        "distance_km",
        "calories",
        "log_id",
    ];
}

/// Aggregate figures for one date.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DaySummaryRow {
    pub date: String,
    pub steps: i64,
    pub sedentary_minutes: i64,
    pub lightly_active_minutes: i64,
    pub fairly_active_minutes: i64,
    pub very_active_minutes: i64,
    pub calories_out: i64,
    pub activity_calories: Option<i64>,
    pub calories_bmr: Option<i64>,
    pub resting_heart_rate: Option<i64>,
    pub distance_km: Option<f64>,
    pub floors: Option<i64>,
}

impl CsvRow for DaySummaryRow {
    const HEADER: &'static [&'static str] = &[
        "date",
        "steps",
        "sedentary_minutes",
        "lightly_active_minutes",
        "fairly_active_minutes",
        "very_active_minutes",
        "calories_out",
        "activity_calories",
        "calories_bmr",
        "resting_heart_rate",
        "distance_km",
        "floors",
    ];
}

/// One intraday sample.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntradayRow {
    pub date: String,
    pub time: String,
    pub timestamp: String,
    #[serde(serialize_with = "serialize_compact")]
    pub value: f64,
}

impl CsvRow for IntradayRow {
    const HEADER: &'static [&'static str] = &["date", "time", "timestamp", "value"];
}

/// Whole numbers are written without a fractional part (`12`, not `12.0`).
fn serialize_compact<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Everything collected for one date.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyRecord {
    pub activities: Vec<ActivityEventRow>,
    pub summary: DaySummaryRow,
    pub intraday: Vec<IntradayRow>,
}
