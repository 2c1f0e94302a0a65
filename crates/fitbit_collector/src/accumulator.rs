use crate::records::{ActivityEventRow, DailyRecord, DaySummaryRow, IntradayRow};

/// Append-only buffers for the three datasets of a run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Accumulator {
    activities: Vec<ActivityEventRow>,
    summaries: Vec<DaySummaryRow>,
    intraday: Vec<IntradayRow>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DailyRecord) {
        self.activities.extend(record.activities);
        self.summaries.push(record.summary);
        self.intraday.extend(record.intraday);
    }

    pub fn activities(&self) -> &[ActivityEventRow] {
        &self.activities
    }

    pub fn summaries(&self) -> &[DaySummaryRow] {
        &self.summaries
    }

    pub fn intraday(&self) -> &[IntradayRow] {
        &self.intraday
    }

    /// Dates accumulated so far (one summary per date).
    pub fn days(&self) -> usize {
        self.summaries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, events: usize, samples: usize) -> DailyRecord {
        DailyRecord {
            activities: (0..events)
                .map(|i| ActivityEventRow {
                    date: date.into(),
                    name: format!("a{i}"),
                    description: None,
                    start_time: None,
                    duration_min: Some(10),
                    steps: None,
                    distance_km: None,
                    calories: None,
                    log_id: None,
                })
                .collect(),
            summary: DaySummaryRow {
                date: date.into(),
                steps: 1,
                sedentary_minutes: 0,
                lightly_active_minutes: 0,
                fairly_active_minutes: 0,
                very_active_minutes: 0,
                calories_out: 0,
                activity_calories: None,
                calories_bmr: None,
                resting_heart_rate: None,
                distance_km: None,
                floors: None,
            },
            intraday: (0..samples)
                .map(|m| IntradayRow {
                    date: date.into(),
                    time: format!("00:{m:02}:00"),
                    timestamp: format!("{date}T00:{m:02}:00"),
                    value: m as f64,
                })
                .collect(),
        }
    }

    #[test]
    fn push_appends_in_order() {
        let mut acc = Accumulator::new();
        acc.push(record("2020-05-01", 2, 3));
        acc.push(record("2020-05-02", 0, 2));
        assert_eq!(acc.days(), 2);
        assert_eq!(acc.activities().len(), 2);
        assert_eq!(acc.intraday().len(), 5);
        assert_eq!(acc.summaries()[1].date, "2020-05-02");
        assert_eq!(acc.intraday()[3].date, "2020-05-02");
    }
}
