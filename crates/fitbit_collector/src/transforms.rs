use chrono::NaiveDate;
use fitbit_client::utils::{api_date, millis_to_minutes};
use fitbit_client::{DailyActivity, DetailLevel, IntradaySeries, LoggedActivity};

use crate::records::{ActivityEventRow, DailyRecord, DaySummaryRow, IntradayRow};

/// Logged activities of one date as rows.
///
/// Durations are converted from milliseconds to whole minutes. An activity
/// without its own start date takes the requested `date`. When
/// `fill_inactive` is set, a date with nothing logged yields a single
/// zero-step "Inactive" walk so every date shows up in the events file.
pub fn activity_rows(
    date: NaiveDate,
    activities: &[LoggedActivity],
    fill_inactive: bool,
) -> Vec<ActivityEventRow> {
    let day = api_date(date);
    if activities.is_empty() && fill_inactive {
        return vec![ActivityEventRow {
            date: day,
            name: "Walk".into(),
            description: Some("Inactive".into()),
            start_time: None,
            duration_min: None,
            steps: Some(0),
            distance_km: None,
            calories: None,
            log_id: None,
        }];
    }
    activities
        .iter()
        .map(|a| ActivityEventRow {
            date: a.start_date.clone().unwrap_or_else(|| day.clone()),
            name: a.name.clone(),
            description: a.description.clone().filter(|d| !d.is_empty()),
            start_time: a.start_time.clone(),
            duration_min: a.duration.map(millis_to_minutes),
            steps: a.steps,
            distance_km: a.distance,
            calories: a.calories,
            log_id: a.log_id,
        })
        .collect()
}

pub fn summary_row(date: NaiveDate, daily: &DailyActivity) -> DaySummaryRow {
    let s = &daily.summary;
    DaySummaryRow {
        date: api_date(date),
        steps: s.steps,
        sedentary_minutes: s.sedentary_minutes,
        lightly_active_minutes: s.lightly_active_minutes,
        fairly_active_minutes: s.fairly_active_minutes,
        very_active_minutes: s.very_active_minutes,
        calories_out: s.calories_out,
        activity_calories: s.activity_calories,
        calories_bmr: s.calories_bmr,
        resting_heart_rate: s.resting_heart_rate,
        distance_km: s.total_distance(),
        floors: s.floors,
    }
}

/// Intraday samples as rows, in provider order. Missing minutes stay missing.
pub fn intraday_rows(
    date: NaiveDate,
    series: &IntradaySeries,
    detail: DetailLevel,
) -> Vec<IntradayRow> {
    let day = api_date(date);
    let expected = detail.samples_per_day();
    if series.dataset.len() < expected {
        tracing::debug!(
            date = %day,
            samples = series.dataset.len(),
            expected,
            "intraday series shorter than a full day"
        );
    }
    series
        .dataset
        .iter()
        .map(|s| IntradayRow {
            date: day.clone(),
            time: s.time.clone(),
            timestamp: format!("{}T{}", day, s.time),
            value: s.value,
        })
        .collect()
}

/// Reshape both responses for `date` into one record.
pub fn daily_record(
    date: NaiveDate,
    daily: &DailyActivity,
    series: &IntradaySeries,
    detail: DetailLevel,
    fill_inactive: bool,
) -> DailyRecord {
    DailyRecord {
        activities: activity_rows(date, &daily.activities, fill_inactive),
        summary: summary_row(date, daily),
        intraday: intraday_rows(date, series, detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 5, 1).unwrap()
    }

    fn daily(activities: serde_json::Value) -> DailyActivity {
        serde_json::from_value(json!({
            "activities": activities,
            "summary": {
                "steps": 9000,
                "sedentaryMinutes": 700,
                "lightlyActiveMinutes": 200,
                "fairlyActiveMinutes": 20,
                "veryActiveMinutes": 15,
                "caloriesOut": 2400,
                "caloriesBMR": 1600,
                "distances": [
                    {"activity": "tracker", "distance": 6.1},
                    {"activity": "total", "distance": 6.4}
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn activity_duration_is_rounded_to_minutes() {
        let d = daily(json!([
            {"name": "Walk", "startTime": "08:15", "duration": 1_845_000, "steps": 2100, "description": ""},
            {"name": "Run", "startDate": "2020-04-30", "duration": 1_200_000}
        ]));
        let rows = activity_rows(date(), &d.activities, false);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].duration_min, Some(31));
        assert_eq!(rows[0].date, "2020-05-01");
        assert_eq!(rows[0].description, None);
        assert_eq!(rows[1].duration_min, Some(20));
        assert_eq!(rows[1].date, "2020-04-30");
    }

    #[test]
    fn inactive_day_placeholder_only_when_enabled() {
        let d = daily(json!([]));
        assert!(activity_rows(date(), &d.activities, false).is_empty());
        let rows = activity_rows(date(), &d.activities, true);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Walk");
        assert_eq!(rows[0].description.as_deref(), Some("Inactive"));
        assert_eq!(rows[0].steps, Some(0));
    }

    #[test]
    fn summary_uses_total_distance() {
        let row = summary_row(date(), &daily(json!([])));
        assert_eq!(row.date, "2020-05-01");
        assert_eq!(row.distance_km, Some(6.4));
        assert_eq!(row.resting_heart_rate, None);
        assert_eq!(row.calories_bmr, Some(1600));
    }

    #[test]
    fn intraday_rows_carry_timestamps_and_keep_gaps() {
        let series: IntradaySeries = serde_json::from_value(json!({
            "dataset": [
                {"time": "00:00:00", "value": 0},
                {"time": "00:02:00", "value": 14}
            ],
            "datasetInterval": 1,
            "datasetType": "minute"
        }))
        .unwrap();
        let rows = intraday_rows(date(), &series, DetailLevel::OneMinute);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].timestamp, "2020-05-01T00:02:00");
        assert_eq!(rows[1].value, 14.0);
    }
}
