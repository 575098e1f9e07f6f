#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless light bike campaign.
//!
//! The player is steered by the autopilot, so a run needs no input device.
//! Each finished round is reported on stdout; diagnostics go to stderr.

mod campaign;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use light_bike_simulation::{PlayerControl, Simulation};
use light_bike_system_progression::Progression;
use tracing_subscriber::EnvFilter;

use crate::campaign::Plan;

#[derive(Debug, Parser)]
#[command(
    name = "light-bike",
    version,
    about = "Run a headless light bike campaign with an autopiloted player"
)]
struct Args {
    /// Seed for every random choice; drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Level the campaign starts at.
    #[arg(long, default_value_t = 1)]
    start_level: u32,
    /// Maximum number of rounds to play before stopping.
    #[arg(long, default_value_t = 1)]
    rounds: u32,
    /// Display name of the player.
    #[arg(long, default_value = "Player")]
    player_name: String,
    /// TOML file overriding the default configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Emit one JSON document per round instead of a summary line.
    #[arg(long)]
    json: bool,
    /// Pace ticks at the configured interval instead of running flat out.
    #[arg(long)]
    realtime: bool,
}

/// Entry point for the light bike command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = config::load(args.config.as_deref())?;
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "starting campaign");

    let mut progression = Progression::new(config.progression, args.start_level);
    let mut simulation = Simulation::seeded(config, seed);
    simulation.set_player_control(PlayerControl::Autopilot);

    let plan = Plan {
        player_name: args.player_name,
        rounds: args.rounds,
        realtime: args.realtime,
    };
    let reports = campaign::run(&mut simulation, &mut progression, &plan)?;

    for report in &reports {
        if args.json {
            let line = serde_json::to_string(report).context("failed to encode round report")?;
            println!("{line}");
        } else {
            println!("{}", report.summary());
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
