//! Daily readings from a CSV file
//!
//! The file needs a header row with a date column (`date`, `Date`,
//! `timestamp` or `Timestamp`) and a reading column (`aqi`, `AQI` or
//! `value`). Other columns are ignored. Rows may appear in any order; they
//! are sorted chronologically before the series is built.

use crate::error::{ReportError, Result};
use aqi_forecast::{ForecastError, SeriesSource, TimeSeries};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct CsvReading {
    #[serde(alias = "Date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "AQI", alias = "value")]
    aqi: f64,
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (read as UTC) and bare dates
/// (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ts));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| Utc.from_utc_datetime(&ts))
}

/// Parse readings from any reader holding CSV text
pub fn read_series<R: Read>(reader: R, label: &str) -> Result<TimeSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line());
        let reading: CsvReading = record.deserialize(Some(&headers))?;
        let timestamp = parse_timestamp(&reading.date).ok_or_else(|| ReportError::Date {
            line,
            value: reading.date.clone(),
        })?;
        points.push((timestamp, reading.aqi));
    }

    if points.is_empty() {
        return Err(ReportError::Empty(label.to_string()));
    }

    points.sort_by_key(|(timestamp, _)| *timestamp);
    debug!(rows = points.len(), source = label, "readings loaded");
    Ok(TimeSeries::from_points(points)?)
}

/// A CSV file of readings
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file, keeping the loader's own error type
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<TimeSeries> {
        let file = std::fs::File::open(&self.path)?;
        read_series(file, &self.path.display().to_string())
    }
}

impl SeriesSource for CsvSource {
    fn fetch(&self) -> aqi_forecast::Result<TimeSeries> {
        self.load().map_err(|err| match err {
            ReportError::Forecast(inner) => inner,
            other => ForecastError::DataError(other.to_string()),
        })
    }
}
