//! End-to-end analysis of one series: forecasts, hybrid and anomalies

use crate::anomaly::AnomalyReport;
use crate::config::PipelineConfig;
use crate::data::{SeriesSource, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::hybrid::combine_outcomes;
use crate::models::{ForecastModel, ModelOutcome, TrainedForecastModel};
use crate::runner::train_with_timeout;
use serde::Serialize;
use tracing::{info, instrument};

/// Everything one pipeline run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    /// ARIMA forecast or the reason it is missing
    pub statistical: ModelOutcome,
    /// Trend heuristic forecast or the reason it is missing
    pub heuristic: ModelOutcome,
    /// Average of the two, or whichever one exists
    pub hybrid: ModelOutcome,
    /// Mean of the hybrid forecast over the horizon
    pub predicted_mean: Option<f64>,
    /// Rolling-deviation anomalies over the input
    pub anomalies: AnomalyReport,
}

impl PipelineReport {
    /// Pretty-printed JSON rendering
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| ForecastError::DataError(format!("Could not serialize report: {err}")))
    }
}

/// Stateless runner for [`PipelineConfig`]
#[derive(Debug, Clone)]
pub struct AqiPipeline {
    config: PipelineConfig,
}

impl AqiPipeline {
    /// Create a pipeline after validating the configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch a series from `source` and analyze it
    pub fn run_source<S: SeriesSource + ?Sized>(&self, source: &S) -> Result<PipelineReport> {
        let series = source.fetch()?;
        self.run(&series)
    }

    /// Analyze one series
    #[instrument(skip(self, series), fields(n = series.len()))]
    pub fn run(&self, series: &TimeSeries) -> Result<PipelineReport> {
        let statistical = self.statistical_forecast(series);
        let heuristic = self.heuristic_forecast(series);
        let hybrid = combine_outcomes(&statistical, &heuristic);
        let predicted_mean = hybrid.forecast().and_then(|f| f.mean());
        let anomalies = self.config.anomaly_detector()?.detect(series)?;

        info!(
            statistical = statistical.is_available(),
            heuristic = heuristic.is_available(),
            hybrid = hybrid.is_available(),
            anomalies = anomalies.len(),
            "pipeline run finished"
        );

        Ok(PipelineReport {
            statistical,
            heuristic,
            hybrid,
            predicted_mean,
            anomalies,
        })
    }

    /// ARIMA forecast, fitted off the calling thread under the configured deadline
    pub fn statistical_forecast(&self, series: &TimeSeries) -> ModelOutcome {
        let model = self.config.arima_model();
        let name = model.name().to_string();
        let result = train_with_timeout(model, series.clone(), self.config.fit_timeout())
            .and_then(|trained| trained.forecast(self.config.horizon));
        ModelOutcome::from_result(name, result)
    }

    /// Trend heuristic forecast
    pub fn heuristic_forecast(&self, series: &TimeSeries) -> ModelOutcome {
        match self.config.trend_model() {
            Ok(model) => model.outcome(series, self.config.horizon),
            Err(reason) => ModelOutcome::from_result("TrendFollowing", Err(reason)),
        }
    }
}
