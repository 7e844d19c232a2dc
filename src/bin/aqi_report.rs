//! Forecast and anomaly report for a CSV of AQI readings.
//!
//! The report is printed to stdout as JSON. Set `RUST_LOG` (for example
//! `RUST_LOG=aqi_forecast=debug`) to see fit details on stderr.

use aqi_sentinel::cli::Cli;
use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aqi_sentinel=info,aqi_forecast=warn".into()),
        )
        .init();

    match cli.run() {
        Ok(json) => println!("{json}"),
        Err(err) => {
            error!(%err, "report failed");
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
