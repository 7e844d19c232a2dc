use aqi_sentinel::{
    AqiPipeline, AqiReport, CsvSource, ForecastError, PipelineConfig, ReportError, SeriesSource,
};
use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_readings(days: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,aqi").unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for i in 0..days {
        let day = start + Duration::days(i as i64);
        let aqi = 140.0 + 40.0 * (i as f64 / 8.0).sin() + (i % 4) as f64 * 3.0;
        writeln!(file, "{},{aqi:.1}", day.format("%Y-%m-%d")).unwrap();
    }
    file.flush().unwrap();
    file
}

fn pipeline() -> AqiPipeline {
    AqiPipeline::new(PipelineConfig::default().with_seed(21)).unwrap()
}

#[test]
fn test_report_from_csv() {
    let file = write_readings(45);
    let series = CsvSource::new(file.path()).load().unwrap();
    assert_eq!(series.len(), 45);
    assert_eq!(series.cadence(), Duration::days(1));

    let report = AqiReport::build("readings.csv", &series, &pipeline(), 30).unwrap();
    assert_eq!(report.observations, 45);
    assert_eq!(report.recent.len(), 30);
    assert_eq!(report.recent.last().map(|r| r.timestamp), series.timestamps().last().copied());
    assert!(report.headline.starts_with("Predicted average AQI (next 7 steps): "));

    let json = report.to_json().unwrap();
    assert!(json.contains("\"headline\""));
    assert!(json.contains("\"anomalies\""));
}

#[test]
fn test_pipeline_reads_csv_source() {
    let file = write_readings(20);
    let source = CsvSource::new(file.path());

    let from_source = pipeline().run_source(&source).unwrap();
    let direct = pipeline().run(&source.fetch().unwrap()).unwrap();
    assert_eq!(from_source, direct);
}

#[test]
fn test_missing_file() {
    let source = CsvSource::new("/definitely/not/here.csv");
    assert!(matches!(source.load(), Err(ReportError::Io(_))));
    assert!(matches!(source.fetch(), Err(ForecastError::DataError(_))));
}

#[test]
fn test_short_file_reports_unavailable_forecast() {
    let file = write_readings(4);
    let series = CsvSource::new(file.path()).load().unwrap();
    let report = AqiReport::build("short.csv", &series, &pipeline(), 30).unwrap();

    assert_eq!(report.headline, "Predicted average AQI: data unavailable");
    assert_eq!(report.recent.len(), 4);
    assert!(!report.analysis.hybrid.is_available());
}
