//! Group Walk - headless simulation runner
//!
//! Loads a scenario, builds the street map, runs the requested number of
//! rounds and optionally writes per-round device snapshots as JSON.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use group_walk::core::{Result, ScenarioConfig};
use group_walk::movement::{leader_of, Role};
use group_walk::simulation::{DeviceRecord, Network, RoundReport};
use group_walk::spatial::StreetMap;

/// Headless group movement simulation
#[derive(Parser, Debug)]
#[command(name = "group-walk")]
#[command(about = "Simulate groups of devices roaming a street map")]
struct Args {
    /// Scenario file (TOML); the built-in four-group scenario if omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// ASCII street map (`#` = obstacle); generated city blocks if omitted
    #[arg(long)]
    map: Option<PathBuf>,

    /// Number of rounds to run
    #[arg(long, default_value_t = 300)]
    rounds: u64,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write device snapshots to this JSON file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Rounds between two logged snapshots
    #[arg(long, default_value_t = 1)]
    log_every: u64,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// One logged snapshot
#[derive(Serialize)]
struct RoundLog {
    report: RoundReport,
    devices: Vec<DeviceRecord>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut scenario = match &args.scenario {
        Some(path) => ScenarioConfig::load(path)?,
        None => ScenarioConfig::default(),
    };
    if let Some(seed) = args.seed {
        scenario.simulation.seed = seed;
    }

    let map = match &args.map {
        Some(path) => StreetMap::load(path, scenario.map.cell_size)?,
        None => StreetMap::city_blocks(scenario.simulation.world, &scenario.map),
    };
    tracing::info!(
        street_cells = map.street_cell_count(),
        seed = scenario.simulation.seed,
        "street map ready"
    );

    let mut network = Network::new(scenario.simulation.clone(), map, &scenario.groups)?;

    let log_every = args.log_every.max(1);
    let mut logs = Vec::new();
    for _ in 0..args.rounds {
        let report = network.run_round();
        if args.output.is_some() && report.round % log_every == 0 {
            logs.push(RoundLog {
                report,
                devices: network.snapshot(),
            });
        }
    }

    if let Some(path) = &args.output {
        std::fs::write(path, serde_json::to_string_pretty(&logs)?)?;
        println!("Snapshots written to {}", path.display());
    }

    print_summary(&network.snapshot(), scenario.simulation.group_capacity);
    Ok(())
}

/// Leader position and follower spread per group
fn print_summary(devices: &[DeviceRecord], group_capacity: u64) {
    println!("\n--- Group Summary ---");
    for leader in devices.iter().filter(|d| d.role == Role::Leader) {
        let followers: Vec<&DeviceRecord> = devices
            .iter()
            .filter(|d| d.id != leader.id && leader_of(d.id, group_capacity) == leader.id)
            .collect();

        let spread = if followers.is_empty() {
            0.0
        } else {
            followers
                .iter()
                .map(|f| f.position.distance(&leader.position))
                .sum::<f64>()
                / followers.len() as f64
        };

        println!(
            "Group {:>3}: leader at {}, {} followers, mean distance {:.1} m",
            leader.id.0 / group_capacity,
            leader.position,
            followers.len(),
            spread
        );
    }
}
