//! Read-only views of the world handed to presentation code.

use crate::rabbit::Rabbit;
use ecosim_core::{coverage_fraction, CoverageStats, Position};
use serde::{Deserialize, Serialize};

/// State of the world after a completed tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    /// Regrow timers, row-major
    pub timers: Vec<u32>,
    pub rabbits: Vec<Rabbit>,
    pub grass: usize,
}

impl Snapshot {
    pub fn total_tiles(&self) -> usize {
        self.timers.len()
    }

    pub fn coverage(&self) -> f64 {
        coverage_fraction(self.grass, self.total_tiles())
    }

    pub fn timer_at(&self, pos: Position) -> u32 {
        self.timers[(pos.y * self.width + pos.x) as usize]
    }

    /// `tick=<n> rabbits=<count> grass=<g>/<total> coverage=<pct>%`
    pub fn status_line(&self) -> String {
        format!(
            "tick={} rabbits={} grass={}/{} coverage={:.1}%",
            self.tick,
            self.rabbits.len(),
            self.grass,
            self.total_tiles(),
            self.coverage() * 100.0
        )
    }
}

/// Per-tick bookkeeping returned by `World::step`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub moves_granted: usize,
    /// Proposals forced to stay by the lottery
    pub moves_reverted: usize,
    pub grass_eaten: usize,
    pub births: usize,
    /// Parents that paid the reproduction cost but found no free tile
    pub failed_spawns: usize,
    pub deaths: usize,
    pub population: usize,
    pub grass: usize,
}

/// Totals for a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks: u64,
    pub final_population: usize,
    pub total_births: u64,
    pub total_deaths: u64,
    pub total_reverted: u64,
    pub coverage: CoverageStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_format() {
        let snapshot = Snapshot {
            tick: 12,
            width: 4,
            height: 2,
            timers: vec![0, 0, 3, 0, 1, 0, 0, 2],
            rabbits: vec![
                Rabbit::new(Position::new(0, 0), 3),
                Rabbit::new(Position::new(3, 1), 1),
            ],
            grass: 5,
        };

        assert_eq!(
            snapshot.status_line(),
            "tick=12 rabbits=2 grass=5/8 coverage=62.5%"
        );
        assert_eq!(snapshot.timer_at(Position::new(3, 1)), 2);
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = Snapshot {
            tick: 0,
            width: 1,
            height: 1,
            timers: vec![0],
            rabbits: vec![],
            grass: 1,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
