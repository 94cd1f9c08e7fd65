//! Command line driver for the EcoSim grass/rabbit simulation.

mod render;
mod runner;
mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ecosim_core::{DisplayConfig, SimConfig, UiMode};
use ecosim_world::World;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UiArg {
    /// Status lines only
    None,
    /// Paced text frames
    Ascii,
}

impl From<UiArg> for UiMode {
    fn from(arg: UiArg) -> Self {
        match arg {
            UiArg::None => UiMode::None,
            UiArg::Ascii => UiMode::Ascii,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ecosim")]
#[command(version)]
#[command(about = "Rabbits grazing on a regrowing grass grid")]
struct Cli {
    /// Load simulation parameters from a JSON file instead of the flags below
    #[arg(long)]
    config: Option<PathBuf>,

    /// Width of the simulation grid
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    width: i32,

    /// Height of the simulation grid
    #[arg(long, default_value_t = 15, allow_negative_numbers = true)]
    height: i32,

    /// Maximum rabbits sharing one tile
    #[arg(long, default_value_t = 1)]
    tile_capacity: u32,

    /// Total simulation ticks to run
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Print one status line every K ticks
    #[arg(long, default_value_t = 1)]
    render_every: u64,

    /// Initial number of rabbits
    #[arg(long, default_value_t = 20)]
    rabbits: usize,

    /// Grass regrowth delay in ticks
    #[arg(long, default_value_t = 10)]
    regrow: u32,

    /// Random seed; a fresh one is drawn and logged when absent
    #[arg(long, env = "ECOSIM_SEED")]
    seed: Option<u64>,

    /// How the run is displayed
    #[arg(long, value_enum, default_value_t = UiArg::Ascii)]
    ui: UiArg,

    /// Frames drawn per second
    #[arg(long, default_value_t = 60.0, allow_negative_numbers = true)]
    fps: f64,

    /// Simulation ticks per second in paced mode
    #[arg(long, default_value_t = 8.0, allow_negative_numbers = true)]
    tps: f64,

    /// Initial energy of each rabbit
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    energy_start: i32,

    /// Energy cost of moving one tile
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    move_cost: i32,

    /// Energy cost of staying put
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    idle_cost: i32,

    /// Energy gained when eating grass
    #[arg(long, default_value_t = 4, allow_negative_numbers = true)]
    eat_gain: i32,

    /// Minimum energy to reproduce
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    repro_threshold: i32,

    /// Energy deducted from a parent giving birth
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    repro_cost: i32,

    /// Energy given to a newborn (defaults to the reproduction cost)
    #[arg(long, allow_negative_numbers = true)]
    infant_energy: Option<i32>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn sim_config(&self) -> Result<SimConfig> {
        let Some(path) = &self.config else {
            return Ok(SimConfig {
                width: self.width,
                height: self.height,
                tile_capacity: self.tile_capacity,
                ticks: self.ticks,
                seed: self.seed,
                regrow_delay: self.regrow,
                rabbits: self.rabbits,
                energy_start: self.energy_start,
                move_cost: self.move_cost,
                idle_cost: self.idle_cost,
                eat_gain: self.eat_gain,
                repro_threshold: self.repro_threshold,
                repro_cost: self.repro_cost,
                infant_energy: self.infant_energy,
            });
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config: SimConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }

    fn display_config(&self) -> DisplayConfig {
        DisplayConfig {
            render_every: self.render_every,
            ui: self.ui.into(),
            fps: self.fps,
            tps: self.tps,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init_telemetry(cli.verbose, cli.log_json)?;

    let sim_config = cli.sim_config()?;
    let display_config = cli.display_config();
    display_config
        .validate()
        .context("invalid display configuration")?;
    let world = World::new(sim_config).context("invalid simulation configuration")?;

    info!(
        seed = world.seed(),
        ui = ?display_config.ui,
        "Starting EcoSim; rerun with --seed {} to reproduce",
        world.seed()
    );

    let stop = Arc::new(AtomicBool::new(false));
    tokio::spawn(stop_on_ctrl_c(stop.clone()));

    let summary = match display_config.ui {
        UiMode::None => {
            let headless_config = display_config.clone();
            let stop = stop.clone();
            tokio::task::spawn_blocking(move || {
                runner::run_headless(world, &headless_config, &stop)
            })
            .await??
        }
        UiMode::Ascii => runner::run_paced(world, &display_config, stop).await?,
    };

    println!("{}", summary.coverage.summary_line());

    Ok(())
}

async fn stop_on_ctrl_c(stop: Arc<AtomicBool>) {
    if signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received; stopping at the next tick boundary");
        stop.store(true, Ordering::Relaxed);
    }
}
