mod cli;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use geoweather_core::Config;
use geoweather_locations::{LocationLoader, LocationStore};
use geoweather_observations::{Observation, ObservationStore};
use geoweather_provider::WeatherClient;
use geoweather_sync::{ObservationSink, SyncOptions, SyncOrchestrator, SyncRunResult};

#[tokio::main]
async fn main() -> Result<()> {
    geoweather_core::init()?;

    let cli = Cli::parse();
    let (config, _validation) = Config::load_validated()?;

    match cli.command {
        Command::Load { file } => load(&config, &file),
        Command::Sync { watch } => sync(&config, watch).await,
        Command::Snapshot => snapshot(&config),
        Command::History { location } => history(&config, &location),
        Command::Locations => locations(&config),
    }
}

fn open_location_store(config: &Config) -> Result<LocationStore> {
    LocationStore::new(&config.stores.locations_db).with_context(|| {
        format!(
            "Failed to open location store at {}",
            config.stores.locations_db
        )
    })
}

fn open_observation_store(config: &Config) -> Result<ObservationStore> {
    ObservationStore::new(&config.stores.observations_db)
        .map_err(|e| anyhow!("{} ({e})", e.user_message()))
}

fn load(config: &Config, file: &Path) -> Result<()> {
    let store = open_location_store(config)?;
    let loader = LocationLoader::new(&store);

    let source = std::fs::File::open(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let report = loader
        .load_csv(source)
        .map_err(|e| anyhow!("{} ({e})", e.user_message()))?;

    println!(
        "Loaded {} of {} rows ({} missing, {} invalid, {} duplicates dropped)",
        report.persisted,
        report.input_rows,
        report.missing_dropped,
        report.invalid_dropped,
        report.duplicates_dropped
    );
    Ok(())
}

async fn sync(config: &Config, watch: bool) -> Result<()> {
    let api_key = config.provider.effective_api_key().context(
        "No API key configured. Set provider.api_key in the config file \
         or the GEOWEATHER_API_KEY environment variable.",
    )?;

    let client = WeatherClient::with_base_url(&api_key, &config.provider.base_url)
        .units(&config.provider.units);

    let location_store = open_location_store(config)?;
    let observation_store = Arc::new(open_observation_store(config)?);

    let options = SyncOptions {
        batch_cap: config.sync.batch_cap as usize,
        workers: config.sync.workers,
        deadline: (config.sync.run_deadline_secs > 0)
            .then(|| Duration::from_secs(config.sync.run_deadline_secs)),
    };
    let orchestrator = SyncOrchestrator::new(
        Arc::new(client),
        observation_store as Arc<dyn ObservationSink>,
        options,
    );

    run_once(&orchestrator, &location_store).await?;

    if watch {
        if config.sync.refresh_minutes == 0 {
            anyhow::bail!("`sync --watch` requires sync.refresh_minutes > 0");
        }

        let period = Duration::from_secs(u64::from(config.sync.refresh_minutes) * 60);
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // first tick fires immediately; that run just happened

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutting down");
                    break;
                }
                _ = interval.tick() => {
                    run_once(&orchestrator, &location_store).await?;
                }
            }
        }
    }

    Ok(())
}

async fn run_once(
    orchestrator: &SyncOrchestrator,
    source: &LocationStore,
) -> Result<SyncRunResult> {
    let result = orchestrator
        .run_from_source(source)
        .await
        .map_err(|e| anyhow!("{} ({e})", e.user_message()))?;

    println!(
        "Sync complete: {} attempted, {} succeeded, {} failed",
        result.attempted, result.succeeded, result.failed
    );
    for failure in &result.failures {
        println!("  {}: {}", failure.location_key, failure.reason);
    }

    Ok(result)
}

fn snapshot(config: &Config) -> Result<()> {
    let store = open_observation_store(config)?;
    let entries = store
        .latest_snapshot()
        .map_err(|e| anyhow!("{} ({e})", e.user_message()))?;

    if entries.is_empty() {
        println!("No observations yet. Run `geoweather sync` first.");
        return Ok(());
    }

    for obs in &entries {
        println!("{}", format_observation(obs));
    }
    Ok(())
}

fn history(config: &Config, location: &str) -> Result<()> {
    let store = open_observation_store(config)?;
    let entries = store
        .history(location)
        .map_err(|e| anyhow!("{} ({e})", e.user_message()))?;

    if entries.is_empty() {
        println!("No observations for {}.", location);
        return Ok(());
    }

    for obs in &entries {
        println!("{}", format_observation(obs));
    }
    Ok(())
}

fn locations(config: &Config) -> Result<()> {
    let store = open_observation_store(config)?;
    let keys = store
        .location_keys()
        .map_err(|e| anyhow!("{} ({e})", e.user_message()))?;

    if keys.is_empty() {
        println!("No tracked locations yet.");
        return Ok(());
    }

    for key in keys {
        println!("{}", key);
    }
    Ok(())
}

fn format_observation(obs: &Observation) -> String {
    let temperature = obs
        .temperature
        .map(|t| format!("{:.1}", t))
        .unwrap_or_else(|| "-".to_string());
    let condition = obs.condition.as_deref().unwrap_or("-");

    format!(
        "{:<24} {:>7}  {:<20} {}",
        obs.location_key,
        temperature,
        condition,
        obs.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}
