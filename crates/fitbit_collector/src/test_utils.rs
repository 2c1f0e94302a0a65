//! Shared test utilities and stub `FitbitClient` implementations used by unit tests.
#![cfg(test)]

use async_trait::async_trait;
use chrono::NaiveDate;
use fitbit_client::utils::api_date;
use fitbit_client::{
    DailyActivity, DetailLevel, FitbitClient, FitbitError, IntradayMetric, IntradaySeries,
};
use serde_json::json;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn daily_fixture(date: NaiveDate) -> DailyActivity {
    serde_json::from_value(json!({
        "activities": [{
            "logId": 1,
            "name": "Walk",
            "startDate": api_date(date),
            "startTime": "08:15",
            "duration": 1_845_000,
            "steps": 2100,
            "calories": 120
        }],
        "summary": {
            "steps": 9000,
            "sedentaryMinutes": 700,
            "lightlyActiveMinutes": 200,
            "fairlyActiveMinutes": 20,
            "veryActiveMinutes": 15,
            "caloriesOut": 2400,
            "restingHeartRate": 58,
            "distances": [{"activity": "total", "distance": 6.4}]
        }
    }))
    .expect("daily fixture")
}

pub fn intraday_fixture(samples: usize) -> IntradaySeries {
    let dataset: Vec<_> = (0..samples)
        .map(|m| json!({"time": format!("{:02}:{:02}:00", m / 60, m % 60), "value": m % 7}))
        .collect();
    serde_json::from_value(json!({
        "dataset": dataset,
        "datasetInterval": 1,
        "datasetType": "minute"
    }))
    .expect("intraday fixture")
}

/// Answers every call with the fixtures and records what was asked.
#[derive(Default)]
pub struct StubClient {
    calls: Mutex<Vec<(&'static str, NaiveDate)>>,
}

impl StubClient {
    pub fn calls(&self) -> Vec<(&'static str, NaiveDate)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FitbitClient for StubClient {
    async fn get_daily_activity(&self, date: NaiveDate) -> Result<DailyActivity, FitbitError> {
        self.calls.lock().unwrap().push(("daily", date));
        Ok(daily_fixture(date))
    }

    async fn get_intraday_series(
        &self,
        _metric: IntradayMetric,
        date: NaiveDate,
        _detail: DetailLevel,
    ) -> Result<IntradaySeries, FitbitError> {
        self.calls.lock().unwrap().push(("intraday", date));
        Ok(intraday_fixture(3))
    }
}

/// Like [`StubClient`] but the daily call for `fail_on` returns a server error.
pub struct FailingClient {
    fail_on: NaiveDate,
    calls: AtomicUsize,
}

impl FailingClient {
    pub fn on(fail_on: NaiveDate) -> Self {
        Self {
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FitbitClient for FailingClient {
    async fn get_daily_activity(&self, date: NaiveDate) -> Result<DailyActivity, FitbitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if date == self.fail_on {
            return Err(FitbitError::from_status(500, "boom".into()));
        }
        Ok(daily_fixture(date))
    }

    async fn get_intraday_series(
        &self,
        _metric: IntradayMetric,
        _date: NaiveDate,
        _detail: DetailLevel,
    ) -> Result<IntradaySeries, FitbitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(intraday_fixture(3))
    }
}
