use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use sat_o_view::catalog::{CelestrakSource, ElementCache};
use sat_o_view::config::Config;
use sat_o_view::propagate::frames::{geodetic_from_ecef, scene_to_ecef};
use sat_o_view::registry::SatelliteRegistry;
use sat_o_view::snapshot::SnapshotSink;
use sat_o_view::web::run_server;

#[derive(Parser)]
#[command(name = "sat-o-view")]
#[command(about = "Live satellite positions for real-time display")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file
    Validate { config: String },
    /// Run the frame loop and the state API
    Serve { config: String },
    /// Fetch once and print where everything is
    Inspect {
        config: String,
        /// Instant to propagate to (RFC3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Serve { config } => serve(&config).await,
        Commands::Inspect { config, at } => inspect(&config, at.unwrap_or_else(Utc::now)).await,
    }
}

fn load(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            None
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };
    println!("Config is valid");
    println!("  groups: {}", config.catalog.groups.join(", "));
    println!("  max satellites: {}", config.registry.max_satellites);
    println!(
        "  orbit path: {} steps of {}",
        config.orbit_path.steps,
        humantime::format_duration(config.orbit_path.step)
    );
    println!("  frame rate: {} fps", config.frame.fps);
    println!("  bind: {}", config.web.bind);
    ExitCode::SUCCESS
}

async fn serve(path: &str) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };
    match run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn inspect(path: &str, at: DateTime<Utc>) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };
    let settings = match config.registry_settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let source = match CelestrakSource::new(
        config.catalog.base_url.clone(),
        config.catalog.request_timeout,
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error creating catalog client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut cache = ElementCache::with_bucket(source, config.catalog.cache_bucket);
    let objects = cache.fetch_all(&config.catalog.groups, at).await;

    let mut registry = SatelliteRegistry::new(SnapshotSink::default(), settings);
    registry.ingest(objects, at);
    let viewport = config.viewport();
    let visible = registry.update_labels(&config.camera().transform(&viewport), &viewport);

    println!("Positions at {}", at.to_rfc3339());
    println!(
        "{:>6}  {:<24} {:<15} {:>9} {:>10} {:>9}",
        "id", "name", "category", "lat", "lon", "alt km"
    );
    for sat in registry.iter() {
        let geodetic = sat
            .position
            .as_ref()
            .and_then(|p| geodetic_from_ecef(scene_to_ecef(p)));
        match geodetic {
            Some(g) => println!(
                "{:>6}  {:<24} {:<15} {:>9.3} {:>10.3} {:>9.1}",
                sat.norad_id(),
                sat.object.name(),
                sat.object.category.as_ref(),
                g.latitude_deg,
                g.longitude_deg,
                g.altitude_km
            ),
            None => println!(
                "{:>6}  {:<24} {:<15} {:>9}",
                sat.norad_id(),
                sat.object.name(),
                sat.object.category.as_ref(),
                "no fix"
            ),
        }
    }

    let info = registry.debug_info();
    println!();
    println!("Tracked: {} ({} without fix)", info.tracked, info.without_fix);
    for (category, count) in &info.categories {
        println!("  {}: {}", category, count);
    }
    println!("Orbit paths: {}", info.orbit_paths);
    println!("Visible labels: {}", visible);
    println!(
        "Distinct positions: {}{}",
        info.distinct_positions,
        if info.stacked { " (all stacked)" } else { "" }
    );
    println!(
        "Errors: {} creation, {} propagation",
        info.creation_errors, info.propagation_failures
    );

    let stats = cache.stats();
    println!(
        "Cache: {} entries, {} records, {} network fetches ({} failed)",
        stats.entries, stats.records, stats.network_fetches, stats.failed_fetches
    );
    ExitCode::SUCCESS
}
