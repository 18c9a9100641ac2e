use std::path::{Path, PathBuf};

use log::{error, info};

use climate_pipeline::config::{self, PipelineConfig};
use climate_pipeline::errors::PipelineError;
use climate_pipeline::metrics::METRICS;
use climate_pipeline::mold::RiskLevel;
use climate_pipeline::store::{MemStore, ObservationStore, PgStore};
use climate_pipeline::{aggregate, db, ingest, report, season, time_operation};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        error!("Pipeline run failed: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), PipelineError> {
    let data_path = std::env::args().nth(1).map(PathBuf::from).ok_or_else(|| {
        PipelineError::Config("usage: climate_pipeline <readings-file>".to_string())
    })?;

    let config = match std::env::var("CLIMATE_PIPELINE_CONFIG") {
        Ok(path) => config::load_config(&path)?,
        Err(_) => PipelineConfig::default(),
    };

    // The storage handle is scoped to this run and passed into each stage.
    match std::env::var("DATABASE_URL") {
        Ok(_) => {
            let pool = db::create_pool()?;
            run_with_store(&PgStore::new(pool), &data_path, &config).await
        }
        Err(_) => {
            info!("DATABASE_URL not set; keeping observations in memory for this run");
            run_with_store(&MemStore::new(), &data_path, &config).await
        }
    }
}

async fn run_with_store<S: ObservationStore>(
    store: &S,
    data_path: &Path,
    config: &PipelineConfig,
) -> Result<(), PipelineError> {
    let summary = time_operation!(
        "ingestion",
        ingest::ingest_file(store, data_path, config.delimiter_byte(), config.batch_size).await
    )?;

    for location in &summary.locations {
        let aggregates = aggregate::daily_aggregates(store, location, None).await?;

        println!("\n=== {location} ===");
        println!("Warmest days:");
        for agg in report::warmest_days(&aggregates) {
            if let Some(t) = agg.avg_temperature_c {
                println!("  {}  {:>6.1} C", agg.date, t);
            }
        }
        println!("Most humid days:");
        for agg in report::most_humid_days(&aggregates) {
            if let Some(h) = agg.avg_humidity_percent {
                println!("  {}  {:>6.1} %", agg.date, h);
            }
        }
        println!("Highest mold risk days:");
        for agg in report::highest_mold_risk_days(&aggregates) {
            if let Some(risk) = agg.mold_risk {
                println!(
                    "  {}  {:>6.2} ({})",
                    agg.date,
                    risk,
                    RiskLevel::from_risk(risk)
                );
            }
        }

        let result = season::season_report(location, &aggregates, &config.autumn, &config.winter);
        println!("{}", result.message);
        match result.autumn_start {
            Some(date) => println!("Autumn start: {date}"),
            None => println!("Autumn start: no qualifying run found"),
        }
        match result.winter_start {
            Some(date) => println!("Winter start: {date}"),
            None => println!("Winter start: no qualifying run found"),
        }
    }

    METRICS.lock().print_summary();
    Ok(())
}
