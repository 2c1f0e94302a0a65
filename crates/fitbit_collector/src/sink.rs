//! CSV output: one file per dataset, named by dataset and date range.

use fitbit_client::IntradayMetric;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::accumulator::Accumulator;
use crate::dates::DateRange;
use crate::error::{CollectorError, CollectorResult};
use crate::records::{ActivityEventRow, CsvRow, DaySummaryRow, IntradayRow};

/// Paths of the three files produced by one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFiles {
    pub activities: PathBuf,
    pub summary: PathBuf,
    pub intraday: PathBuf,
}

impl OutputFiles {
    pub fn in_dir(dir: &Path, range: &DateRange, metric: IntradayMetric) -> Self {
        let label = range.label();
        Self {
            activities: dir.join(format!("activities_{label}.csv")),
            summary: dir.join(format!("daily_summary_{label}.csv")),
            intraday: dir.join(format!("intraday_{metric}_{label}.csv")),
        }
    }
}

/// Write all three datasets, creating `dir` when needed.
pub fn write_all(dir: &Path, files: &OutputFiles, acc: &Accumulator) -> CollectorResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| CollectorError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    write_rows::<ActivityEventRow>(&files.activities, acc.activities())?;
    write_rows::<DaySummaryRow>(&files.summary, acc.summaries())?;
    write_rows::<IntradayRow>(&files.intraday, acc.intraday())?;
    Ok(())
}

/// Write `rows` with a header line, even when `rows` is empty.
pub fn write_rows<T: CsvRow>(path: &Path, rows: &[T]) -> CollectorResult<()> {
    let csv_err = |source| CollectorError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|source| CollectorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    wtr.write_record(T::HEADER).map_err(csv_err)?;
    for row in rows {
        wtr.serialize(row).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| CollectorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "wrote csv");
    Ok(())
}

/// Read a file produced by [`write_rows`] back into rows.
pub fn read_rows<T: CsvRow>(path: &Path) -> CollectorResult<Vec<T>> {
    let csv_err = |source| CollectorError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers = rdr.headers().map_err(csv_err)?.clone();
    if headers.iter().ne(T::HEADER.iter().copied()) {
        return Err(CollectorError::Validation(format!(
            "{}: unexpected columns {:?}",
            path.display(),
            headers.iter().collect::<Vec<_>>()
        )));
    }
    rdr.deserialize::<T>().map(|r| r.map_err(csv_err)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(date: &str, name: &str) -> ActivityEventRow {
        ActivityEventRow {
            date: date.into(),
            name: name.into(),
            description: Some("Morning, brisk".into()),
            start_time: Some("08:15".into()),
            duration_min: Some(31),
            steps: Some(2100),
            distance_km: Some(1.6),
            calories: None,
            log_id: Some(77),
        }
    }

    #[test]
    fn file_names_include_dataset_and_range() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 5, 10).unwrap(),
        )
        .unwrap();
        let files = OutputFiles::in_dir(Path::new("out"), &range, IntradayMetric::Steps);
        assert_eq!(
            files.activities,
            PathBuf::from("out/activities_2020-05-01_2020-05-10.csv")
        );
        assert_eq!(
            files.summary,
            PathBuf::from("out/daily_summary_2020-05-01_2020-05-10.csv")
        );
        assert_eq!(
            files.intraday,
            PathBuf::from("out/intraday_steps_2020-05-01_2020-05-10.csv")
        );
    }

    #[test]
    fn rows_survive_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activities.csv");
        let rows = vec![event("2020-05-01", "Walk"), event("2020-05-02", "Run")];
        write_rows(&path, &rows).unwrap();

        let back: Vec<ActivityEventRow> = read_rows(&path).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn empty_dataset_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_rows::<ActivityEventRow>(&path, &[]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), ActivityEventRow::HEADER.join(","));
        let back: Vec<ActivityEventRow> = read_rows(&path).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn reading_with_the_wrong_row_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activities.csv");
        write_rows(&path, &[event("2020-05-01", "Walk")]).unwrap();
        let res: CollectorResult<Vec<IntradayRow>> = read_rows(&path);
        assert!(matches!(res, Err(CollectorError::Validation(_))));
    }
}
