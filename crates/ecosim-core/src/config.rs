//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters consumed by the tick engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Width of the world grid
    pub width: i32,
    /// Height of the world grid
    pub height: i32,
    /// Maximum number of rabbits that may share one tile
    pub tile_capacity: u32,
    /// Number of ticks to run the simulation
    pub ticks: u64,
    /// Random seed for reproducibility; `None` draws a fresh one
    pub seed: Option<u64>,
    /// Ticks a tile stays bare after being grazed
    pub regrow_delay: u32,
    /// Initial rabbit population
    pub rabbits: usize,
    /// Starting energy for the initial population
    pub energy_start: i32,
    /// Energy cost to move one tile
    pub move_cost: i32,
    /// Energy cost to stay put
    pub idle_cost: i32,
    /// Energy gained from eating grass
    pub eat_gain: i32,
    /// Minimum energy required to reproduce
    pub repro_threshold: i32,
    /// Energy deducted from the parent on reproduction
    pub repro_cost: i32,
    /// Energy given to a newborn; falls back to `repro_cost`
    pub infant_energy: Option<i32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 15,
            tile_capacity: 1,
            ticks: 200,
            seed: None,
            regrow_delay: 10,
            rabbits: 20,
            energy_start: 5,
            move_cost: 1,
            idle_cost: 0,
            eat_gain: 4,
            repro_threshold: 10,
            repro_cost: 5,
            infant_energy: None,
        }
    }
}

impl SimConfig {
    pub fn total_tiles(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }

    pub fn effective_infant_energy(&self) -> i32 {
        self.infant_energy.unwrap_or(self.repro_cost)
    }

    /// Check every range precondition. The engine refuses to start on the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.width < 1 || self.height < 1 {
            return Err(Error::Validation(
                "width and height must be at least 1".to_string(),
            ));
        }
        // Tile indices are computed in i32
        if self.width.checked_mul(self.height).is_none() {
            return Err(Error::Validation(format!(
                "grid of {}x{} tiles is too large",
                self.width, self.height
            )));
        }
        if self.tile_capacity < 1 {
            return Err(Error::Validation(
                "tile capacity must be at least 1".to_string(),
            ));
        }
        if self.ticks < 1 {
            return Err(Error::Validation(
                "ticks to simulate cannot be less than 1".to_string(),
            ));
        }
        if self.rabbits > self.total_tiles() {
            return Err(Error::Validation(format!(
                "number of rabbits ({}) exceeds the number of cells ({})",
                self.rabbits,
                self.total_tiles()
            )));
        }

        let non_negative = [
            ("energy_start", self.energy_start),
            ("move_cost", self.move_cost),
            ("idle_cost", self.idle_cost),
            ("eat_gain", self.eat_gain),
            ("repro_threshold", self.repro_threshold),
            ("repro_cost", self.repro_cost),
            ("infant_energy", self.effective_infant_energy()),
        ];
        for (name, value) in non_negative {
            if value < 0 {
                return Err(Error::Validation(format!(
                    "{} cannot be negative (got {})",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// How the presentation layer shows the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    /// Status lines only, unpaced
    None,
    /// Paced text frames of the grid
    Ascii,
}

/// Presentation parameters. Never read by the engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Print one status line every K ticks
    pub render_every: u64,
    pub ui: UiMode,
    /// Frames drawn per second in paced mode
    pub fps: f64,
    /// Simulation ticks per second in paced mode
    pub tps: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            render_every: 1,
            ui: UiMode::Ascii,
            fps: 60.0,
            tps: 8.0,
        }
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.render_every < 1 {
            return Err(Error::Validation(
                "render interval cannot be less than 1".to_string(),
            ));
        }
        self.frame_period()?;
        self.tick_period()?;
        Ok(())
    }

    /// Time between two drawn frames
    pub fn frame_period(&self) -> Result<Duration> {
        period_of("fps", self.fps)
    }

    /// Time between two simulation ticks in paced mode
    pub fn tick_period(&self) -> Result<Duration> {
        period_of("tps", self.tps)
    }
}

/// Interval for `rate` events per second. Tokio intervals panic on a zero period.
fn period_of(name: &str, rate: f64) -> Result<Duration> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(Error::Validation(format!(
            "{} must be a positive finite number (got {})",
            name, rate
        )));
    }
    match Duration::try_from_secs_f64(1.0 / rate) {
        Ok(period) if !period.is_zero() => Ok(period),
        _ => Err(Error::Validation(format!(
            "{} of {} gives an unusable interval",
            name, rate
        ))),
    }
}
