use aqi_sentinel::cli::Cli;
use aqi_sentinel::ReportError;
use chrono::{Duration, NaiveDate};
use clap::Parser;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn write_readings(days: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,aqi").unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    for i in 0..days {
        let day = start + Duration::days(i as i64);
        writeln!(file, "{},{}", day.format("%Y-%m-%d"), 60 + (i * 7) % 23).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_defaults() {
    let cli = Cli::try_parse_from(["aqi_report", "readings.csv"]).unwrap();
    assert_eq!(cli.readings, PathBuf::from("readings.csv"));
    assert_eq!(cli.recent, 30);
    assert_eq!(cli.config, None);
    assert_eq!(cli.seed, None);
}

#[test]
fn test_flags_in_both_spellings() {
    let cli =
        Cli::try_parse_from(["aqi_report", "readings.csv", "--recent=5", "--seed", "9"]).unwrap();
    assert_eq!(cli.recent, 5);
    assert_eq!(cli.seed, Some(9));
    assert_eq!(cli.pipeline_config().unwrap().seed, Some(9));
}

#[test]
fn test_misused_flags_are_rejected() {
    assert!(Cli::try_parse_from(["aqi_report", "readings.csv", "--sead", "9"]).is_err());
    assert!(Cli::try_parse_from(["aqi_report", "readings.csv", "--recent", "many"]).is_err());
    assert!(Cli::try_parse_from(["aqi_report", "readings.csv", "--seed"]).is_err());
    assert!(Cli::try_parse_from(["aqi_report"]).is_err());
}

#[test]
fn test_seed_overrides_config_file() {
    let mut config = NamedTempFile::new().unwrap();
    write!(config, r#"{{ "horizon": 3, "seed": 1 }}"#).unwrap();
    config.flush().unwrap();

    let path = config.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["aqi_report", "x.csv", "--config", path, "--seed", "4"]).unwrap();
    let pipeline_config = cli.pipeline_config().unwrap();
    assert_eq!(pipeline_config.horizon, 3);
    assert_eq!(pipeline_config.seed, Some(4));
}

#[test]
fn test_run_prints_report() {
    let readings = write_readings(25);
    let path = readings.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["aqi_report", path, "--recent", "5", "--seed", "2"]).unwrap();

    let json = cli.run().unwrap();
    let report: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(report["observations"], 25);
    assert_eq!(report["recent"].as_array().map(Vec::len), Some(5));
}

#[test]
fn test_run_reports_missing_file() {
    let cli = Cli::try_parse_from(["aqi_report", "/no/such/readings.csv"]).unwrap();
    assert!(matches!(cli.run(), Err(ReportError::Io(_))));
}
