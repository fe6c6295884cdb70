use log::{error, info, warn};
use time::OffsetDateTime;
use tokio::time::{sleep, Duration};

use rooftop_wx_etl::config::Config;
use rooftop_wx_etl::refresh::Pipeline;
use rooftop_wx_etl::snapshot::{write_snapshot, Snapshot};
use rooftop_wx_etl::units::UnitRegistry;
use rooftop_wx_etl::utils::{duration_to_seconds, format_timestamp};

async fn publish(snapshot: &Snapshot, units: &UnitRegistry, config: &Config) {
    let json = match snapshot.to_json(units) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize snapshot: {}", e);
            return;
        }
    };

    if let Err(e) = write_snapshot(&config.snapshot_path, &json).await {
        error!(
            "Failed to write snapshot to {}: {}",
            config.snapshot_path.display(),
            e
        );
    } else {
        info!("Snapshot written to {}", config.snapshot_path.display());
    }
}

fn log_summary(snapshot: &Snapshot) {
    let current = &snapshot.current;
    info!("Refresh summary:");
    info!("  Observation rows: {}", snapshot.observations.len());
    if let (Some(first), Some(last)) = (snapshot.observations.first(), snapshot.observations.last())
    {
        info!("  Observation span: {} to {}", first.time, last.time);
    }
    info!("  Forecast steps: {}", snapshot.forecast.len());
    info!(
        "  Current conditions: {}, {}°F, {} hPa, {}% humidity",
        current.description, current.temperature, current.pressure, current.humidity
    );
    info!(
        "  Wind: {} mph from {}°",
        current.wind_speed, current.wind_direction
    );

    // Warning if no data collected
    if snapshot.observations.is_empty() {
        warn!("No sensor observations in this window!");
    }
}

async fn main_loop(pipeline: Pipeline, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting rooftop weather refresh service");

    loop {
        let start_time = OffsetDateTime::now_utc();
        info!("Starting refresh at: {}", format_timestamp(&start_time));

        match pipeline.refresh(start_time).await {
            Ok(snapshot) => {
                log_summary(&snapshot);
                publish(&snapshot, pipeline.units(), &config).await;
            }
            Err(e) => {
                // Previous snapshot stays in place for the dashboard
                error!("Refresh failed [{}]: {}", e.category(), e);
            }
        }

        if config.run_once {
            return Ok(());
        }

        // Wait until next refresh should start
        let elapsed = duration_to_seconds(OffsetDateTime::now_utc() - start_time);
        let interval = config.refresh_interval.as_secs();
        if elapsed < interval {
            let wait_time = interval - elapsed;
            info!("Waiting {} seconds until next refresh", wait_time);
            sleep(Duration::from_secs(wait_time)).await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let pipeline = match Pipeline::new(config.clone()) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return Err(e.into());
        }
    };

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
                // Keep the sender alive so the loop is not cancelled
                std::future::pending::<()>().await;
            }
        }
    });

    // Run main loop or wait for shutdown signal
    tokio::select! {
        result = main_loop(pipeline, config) => {
            match result {
                Ok(_) => info!("Program completed successfully"),
                Err(e) => error!("Fatal error: {}", e),
            }
        }
        _ = &mut rx => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    Ok(())
}
