//! Command-line interface of the `aqi_report` binary

use crate::csv_source::CsvSource;
use crate::error::Result;
use crate::report::{AqiReport, DEFAULT_RECENT_READINGS};
use aqi_forecast::{AqiPipeline, PipelineConfig};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Forecast and anomaly report for a CSV of AQI readings
#[derive(Debug, Parser)]
#[command(name = "aqi_report")]
#[command(about = "Forecast and anomaly report for a CSV of AQI readings", long_about = None)]
#[command(version)]
pub struct Cli {
    /// CSV file with a date column and an AQI column
    pub readings: PathBuf,

    /// Pipeline configuration as JSON; missing fields take their defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of latest readings echoed in the report
    #[arg(short, long, default_value_t = DEFAULT_RECENT_READINGS)]
    pub recent: usize,

    /// Seed for the trend heuristic noise; overrides the config file
    #[arg(short, long)]
    pub seed: Option<u64>,
}

impl Cli {
    /// The pipeline configuration these arguments describe
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => PipelineConfig::default(),
        };
        Ok(match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        })
    }

    /// Load the readings, run the pipeline and render the report as JSON
    pub fn run(&self) -> Result<String> {
        let pipeline = AqiPipeline::new(self.pipeline_config()?)?;
        let series = CsvSource::new(&self.readings).load()?;
        let source = self.readings.display().to_string();
        AqiReport::build(source, &series, &pipeline, self.recent)?.to_json()
    }
}

fn load_config(path: &Path) -> Result<PipelineConfig> {
    let json = std::fs::read_to_string(path)?;
    Ok(PipelineConfig::from_json_str(&json)?)
}
