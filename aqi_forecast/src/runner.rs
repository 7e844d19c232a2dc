//! Bounded-time model training
//!
//! A statistical fit can stall on pathological input. [`train_with_timeout`]
//! runs it on a worker thread and gives up waiting after a deadline; the
//! worker is detached and its late result discarded.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::ForecastModel;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Train `model` on `series` on a background thread, waiting at most `timeout`.
pub fn train_with_timeout<M>(model: M, series: TimeSeries, timeout: Duration) -> Result<M::Trained>
where
    M: ForecastModel + Send + 'static,
    M::Trained: Send + 'static,
{
    let name = model.name().to_string();
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name(format!("fit-{name}"))
        .spawn(move || {
            // The receiver is gone once the caller has timed out.
            let _ = tx.send(model.train(&series));
        })
        .map_err(|err| {
            ForecastError::ModelFitFailure(format!("could not start fit worker: {err}"))
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            debug!(model = %name, "fit worker finished");
            result
        }
        Err(RecvTimeoutError::Timeout) => {
            warn!(model = %name, ?timeout, "abandoning slow fit");
            Err(ForecastError::FitTimeout(timeout))
        }
        Err(RecvTimeoutError::Disconnected) => Err(ForecastError::ModelFitFailure(format!(
            "fit worker for {name} exited without a result"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ForecastResult, TrainedForecastModel};
    use chrono::{TimeZone, Utc};

    #[derive(Debug, Clone)]
    struct SleepyModel {
        delay: Duration,
        panic: bool,
    }

    #[derive(Debug)]
    struct SleepyTrained;

    impl TrainedForecastModel for SleepyTrained {
        fn forecast(&self, _horizon: usize) -> Result<ForecastResult> {
            ForecastResult::new("sleepy", vec![], vec![])
        }

        fn name(&self) -> &str {
            "sleepy"
        }
    }

    impl ForecastModel for SleepyModel {
        type Trained = SleepyTrained;

        fn train(&self, _data: &TimeSeries) -> Result<SleepyTrained> {
            thread::sleep(self.delay);
            if self.panic {
                panic!("fit blew up");
            }
            Ok(SleepyTrained)
        }

        fn name(&self) -> &str {
            "sleepy"
        }
    }

    fn series() -> TimeSeries {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        TimeSeries::new(vec![t], vec![1.0]).unwrap()
    }

    #[test]
    fn test_fast_fit_completes() {
        let model = SleepyModel {
            delay: Duration::ZERO,
            panic: false,
        };
        assert!(train_with_timeout(model, series(), Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_slow_fit_is_abandoned() {
        let model = SleepyModel {
            delay: Duration::from_millis(500),
            panic: false,
        };
        let timeout = Duration::from_millis(20);
        let result = train_with_timeout(model, series(), timeout);
        assert!(matches!(result, Err(ForecastError::FitTimeout(t)) if t == timeout));
    }

    #[test]
    fn test_panicking_fit_is_reported() {
        let model = SleepyModel {
            delay: Duration::ZERO,
            panic: true,
        };
        let result = train_with_timeout(model, series(), Duration::from_secs(5));
        assert!(matches!(result, Err(ForecastError::ModelFitFailure(_))));
    }
}
