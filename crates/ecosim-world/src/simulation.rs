//! Tick engine for the grass/rabbit world.

use crate::grid::Grid;
use crate::lottery::resolve_contention;
use crate::movement::propose_moves;
use crate::rabbit::Rabbit;
use crate::snapshot::{RunSummary, Snapshot, TickReport};
use ecosim_core::{
    coverage_fraction, CoverageStats, Direction, Error, Position, Result, SimConfig,
};
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, event, info, instrument, trace, Level};

/// Lifecycle of a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Constructed, no tick run yet
    Idle,
    Running,
    /// The configured tick count was reached; `step` now fails
    Finished,
}

/// Owns the grid, the rabbit population and the single RNG stream.
pub struct World {
    grid: Grid,
    rabbits: Vec<Rabbit>,
    config: SimConfig,
    rng: ChaCha8Rng,
    seed: u64,
    tick: u64,
    state: EngineState,
    coverage: CoverageStats,
    total_births: u64,
    total_deaths: u64,
    total_reverted: u64,
}

impl World {
    /// Validate `config` and scatter the initial population over distinct tiles.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let grid = Grid::new(config.width, config.height, config.tile_capacity);
        let positions: Vec<Position> = index::sample(&mut rng, grid.len(), config.rabbits)
            .into_iter()
            .map(|i| grid.index_to_pos(i))
            .collect();

        Self::populate(config, seed, rng, grid, &positions)
    }

    /// Build a world with rabbits at explicit positions, each with `energy_start`.
    ///
    /// Positions may repeat up to the tile capacity. `config.rabbits` is ignored.
    pub fn with_rabbits(config: SimConfig, positions: &[Position]) -> Result<Self> {
        SimConfig {
            rabbits: 0,
            ..config.clone()
        }
        .validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = Grid::new(config.width, config.height, config.tile_capacity);

        Self::populate(config, seed, rng, grid, positions)
    }

    fn populate(
        config: SimConfig,
        seed: u64,
        rng: ChaCha8Rng,
        mut grid: Grid,
        positions: &[Position],
    ) -> Result<Self> {
        let mut rabbits = Vec::with_capacity(positions.len());
        for &pos in positions {
            if !grid.contains(pos) {
                return Err(Error::Validation(format!(
                    "rabbit placed outside the grid at {}",
                    pos
                )));
            }
            if !grid.has_room(pos) {
                return Err(Error::Validation(format!(
                    "too many rabbits placed on tile {}",
                    pos
                )));
            }
            grid.occupy(pos);
            rabbits.push(Rabbit::new(pos, config.energy_start));
        }

        info!(
            seed = seed,
            width = config.width,
            height = config.height,
            tile_capacity = config.tile_capacity,
            rabbits = rabbits.len(),
            ticks = config.ticks,
            "World created"
        );

        Ok(Self {
            grid,
            rabbits,
            config,
            rng,
            seed,
            tick: 0,
            state: EngineState::Idle,
            coverage: CoverageStats::new(),
            total_births: 0,
            total_deaths: 0,
            total_reverted: 0,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rabbits(&self) -> &[Rabbit] {
        &self.rabbits
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Seed actually used, including a freshly drawn one
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == EngineState::Finished
    }

    pub fn coverage(&self) -> &CoverageStats {
        &self.coverage
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            width: self.grid.width,
            height: self.grid.height,
            timers: self.grid.timers(),
            rabbits: self.rabbits.clone(),
            grass: self.grid.grass_count(),
        }
    }

    /// Run until the configured tick count is reached
    #[instrument(skip(self), fields(seed = self.seed, ticks = self.config.ticks))]
    pub fn run(&mut self) -> Result<RunSummary> {
        info!("Starting simulation for {} ticks", self.config.ticks);

        while !self.is_finished() {
            self.step()?;
        }

        let summary = self.summary();
        info!(
            event = "run_summary",
            ticks = summary.ticks,
            final_population = summary.final_population,
            total_births = summary.total_births,
            total_deaths = summary.total_deaths,
            total_reverted = summary.total_reverted,
            avg_coverage = summary.coverage.average(),
            min_coverage = summary.coverage.min(),
            max_coverage = summary.coverage.max(),
            "Simulation complete"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            ticks: self.tick,
            final_population: self.rabbits.len(),
            total_births: self.total_births,
            total_deaths: self.total_deaths,
            total_reverted: self.total_reverted,
            coverage: self.coverage.clone(),
        }
    }

    /// Advance the world by one tick.
    ///
    /// Passes run in a fixed order: propose, resolve, move, graze, regrow,
    /// reproduce, cull. Fails with `InvalidState` once the run is finished,
    /// leaving the world untouched.
    pub fn step(&mut self) -> Result<TickReport> {
        if self.is_finished() {
            return Err(Error::InvalidState(format!(
                "simulation already finished after {} ticks",
                self.tick
            )));
        }
        self.state = EngineState::Running;

        let mut report = TickReport {
            tick: self.tick + 1,
            ..Default::default()
        };

        // Proposals and lottery both read the pre-tick state
        let current: Vec<Position> = self.rabbits.iter().map(|r| r.position).collect();
        let proposals = propose_moves(
            &self.rabbits,
            self.grid.width,
            self.grid.height,
            &mut self.rng,
        );
        let grid = &self.grid;
        let resolution = resolve_contention(
            &current,
            &proposals,
            |pos| grid.get(pos).free_capacity,
            &mut self.rng,
        );
        report.moves_reverted = resolution.reverted;
        report.moves_granted = self.apply_moves(&resolution.targets);

        report.grass_eaten = self.graze_and_regrow();

        let (births, failed_spawns) = self.reproduce();
        report.births = births;
        report.failed_spawns = failed_spawns;

        report.deaths = self.cull();

        self.tick += 1;
        report.population = self.rabbits.len();
        report.grass = self.grid.grass_count();
        self.coverage
            .record(coverage_fraction(report.grass, self.grid.len()));

        self.total_births += report.births as u64;
        self.total_deaths += report.deaths as u64;
        self.total_reverted += report.moves_reverted as u64;

        if self.tick >= self.config.ticks {
            self.state = EngineState::Finished;
        }

        #[cfg(debug_assertions)]
        if let Err(e) = self.check_invariants() {
            panic!("{}", e);
        }

        debug!(
            tick = report.tick,
            moves_granted = report.moves_granted,
            moves_reverted = report.moves_reverted,
            grass_eaten = report.grass_eaten,
            births = report.births,
            failed_spawns = report.failed_spawns,
            deaths = report.deaths,
            population = report.population,
            grass = report.grass,
            "Tick complete"
        );
        if report.moves_reverted > 0 {
            event!(
                Level::DEBUG,
                counter_name = "moves_reverted",
                counter_value = report.moves_reverted,
                tick = report.tick,
                "Lottery revert counter"
            );
        }
        if report.births > 0 {
            event!(
                Level::DEBUG,
                counter_name = "births",
                counter_value = report.births,
                tick = report.tick,
                "Birth counter"
            );
        }
        if report.deaths > 0 {
            event!(
                Level::DEBUG,
                counter_name = "deaths",
                counter_value = report.deaths,
                tick = report.tick,
                "Death counter"
            );
        }
        if self.tick % 100 == 0 {
            info!(
                "Tick {}/{}: {} rabbits alive, coverage {:.1}%",
                self.tick,
                self.config.ticks,
                report.population,
                self.coverage.current() * 100.0
            );
        }

        Ok(report)
    }

    /// Pay move or idle costs and relocate. Returns the number of moves made.
    fn apply_moves(&mut self, targets: &[Position]) -> usize {
        let mut moved = 0;
        for (rabbit, &target) in self.rabbits.iter_mut().zip(targets) {
            if target == rabbit.position {
                rabbit.spend_energy(self.config.idle_cost);
                continue;
            }
            self.grid.release(rabbit.position);
            rabbit.spend_energy(self.config.move_cost);
            rabbit.move_to(target);
            self.grid.occupy(target);
            moved += 1;
        }
        moved
    }

    /// Every rabbit on grass eats, then every other tile regrows one tick.
    /// Returns the number of meals.
    fn graze_and_regrow(&mut self) -> usize {
        let mut fresh = vec![false; self.grid.len()];
        let mut meals = 0;

        for rabbit in &mut self.rabbits {
            let index = self.grid.pos_to_index(rabbit.position);
            if self.grid.get_mut(rabbit.position).graze(self.config.regrow_delay) {
                rabbit.add_energy(self.config.eat_gain);
                fresh[index] = true;
                meals += 1;
            }
        }

        self.grid.regrow(&fresh);
        meals
    }

    /// Parents at or above the threshold pay the cost and try to place one
    /// infant on a shuffled free neighbour, else on their own tile.
    /// Infants join the population after the pass. Returns (births, failed).
    fn reproduce(&mut self) -> (usize, usize) {
        let threshold = self.config.repro_threshold;
        let cost = self.config.repro_cost;
        let infant_energy = self.config.effective_infant_energy();

        let mut infants = Vec::new();
        let mut failed = 0;

        for parent in &mut self.rabbits {
            if parent.energy < threshold {
                continue;
            }
            parent.spend_energy(cost);

            let mut directions = Direction::CARDINAL;
            directions.shuffle(&mut self.rng);

            let grid = &self.grid;
            let site = directions
                .iter()
                .map(|&direction| parent.position.step(direction))
                .find(|&pos| grid.has_room(pos))
                .or_else(|| grid.has_room(parent.position).then_some(parent.position));

            match site {
                Some(pos) => {
                    self.grid.occupy(pos);
                    infants.push(Rabbit::new(pos, infant_energy));
                }
                None => {
                    failed += 1;
                    trace!(
                        position_x = parent.position.x,
                        position_y = parent.position.y,
                        tick = self.tick + 1,
                        "Reproduction failed: no free tile"
                    );
                }
            }
        }

        let births = infants.len();
        self.rabbits.extend(infants);
        (births, failed)
    }

    /// Remove rabbits with no energy left, freeing their tiles
    fn cull(&mut self) -> usize {
        let before = self.rabbits.len();
        let grid = &mut self.grid;
        self.rabbits.retain(|rabbit| {
            if rabbit.is_alive() {
                true
            } else {
                grid.release(rabbit.position);
                false
            }
        });
        before - self.rabbits.len()
    }

    /// Cross-check capacity bookkeeping against where rabbits actually stand.
    pub fn check_invariants(&self) -> Result<()> {
        let mut counts = vec![0u32; self.grid.len()];
        for (slot, rabbit) in self.rabbits.iter().enumerate() {
            if !self.grid.contains(rabbit.position) {
                return Err(Error::InvariantViolation(format!(
                    "rabbit {} is outside the grid at {}",
                    slot, rabbit.position
                )));
            }
            counts[self.grid.pos_to_index(rabbit.position)] += 1;
        }

        let capacity = self.grid.capacity();
        for ((pos, tile), count) in self.grid.iter().zip(counts) {
            if tile.free_capacity > capacity {
                return Err(Error::InvariantViolation(format!(
                    "tile {} has {} free slots, capacity is {}",
                    pos, tile.free_capacity, capacity
                )));
            }
            if count != capacity - tile.free_capacity {
                return Err(Error::InvariantViolation(format!(
                    "tile {} holds {} rabbits but accounts for {}",
                    pos,
                    count,
                    capacity - tile.free_capacity
                )));
            }
        }

        Ok(())
    }
}
