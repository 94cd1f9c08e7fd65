//! Text frames for the paced display mode.

use ecosim_core::Position;
use ecosim_world::Snapshot;
use std::collections::HashSet;
use std::fmt::Write;

const GRID_INDENT: &str = "  ";
const PANEL_GAP: &str = "    ";
const SPARK_BARS: [char; 5] = ['▁', '▂', '▃', '▅', '▇'];
const HISTOGRAM_BINS: usize = 5;
const LEGEND: &str = "Legend: \" grass  . dirt  r rabbit(dirt)  R rabbit(grass)";

/// Clears the terminal and homes the cursor
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Energy distribution of the living population
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyStats {
    pub population: usize,
    pub mean: f64,
    pub min: i32,
    pub max: i32,
    pub histogram: [usize; HISTOGRAM_BINS],
}

impl EnergyStats {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let energies: Vec<i32> = snapshot.rabbits.iter().map(|r| r.energy).collect();
        let mut histogram = [0; HISTOGRAM_BINS];

        let (Some(&min), Some(&max)) = (energies.iter().min(), energies.iter().max()) else {
            return Self {
                population: 0,
                mean: 0.0,
                min: 0,
                max: 0,
                histogram,
            };
        };

        if min == max {
            histogram[HISTOGRAM_BINS / 2] = energies.len();
        } else {
            let span = (max - min) as f64;
            for &energy in &energies {
                let bin = ((energy - min) as f64 * HISTOGRAM_BINS as f64 / span) as usize;
                histogram[bin.min(HISTOGRAM_BINS - 1)] += 1;
            }
        }

        Self {
            population: energies.len(),
            mean: energies.iter().map(|&e| e as f64).sum::<f64>() / energies.len() as f64,
            min,
            max,
            histogram,
        }
    }

    /// One bar per histogram bin, scaled to the fullest bin
    pub fn sparkline(&self) -> String {
        let top = self.histogram.iter().copied().max().unwrap_or(0);
        if top == 0 {
            return "-".repeat(HISTOGRAM_BINS);
        }
        let levels = (SPARK_BARS.len() - 1) as f64;
        self.histogram
            .iter()
            .map(|&count| SPARK_BARS[(levels * count as f64 / top as f64).round() as usize])
            .collect()
    }

    fn panel_lines(&self) -> Vec<String> {
        vec![
            "── Stats ───────────────".to_string(),
            format!("pop:     {:>5}", self.population),
            format!("E μ:     {:>5.1}", self.mean),
            format!("E min:   {:>5}", self.min),
            format!("E max:   {:>5}", self.max),
            format!("E hist:  {}", self.sparkline()),
            "────────────────────────".to_string(),
        ]
    }
}

/// Glyph for one tile
fn tile_glyph(has_grass: bool, has_rabbit: bool) -> char {
    match (has_rabbit, has_grass) {
        (true, true) => 'R',
        (true, false) => 'r',
        (false, true) => '"',
        (false, false) => '.',
    }
}

/// Draw one full frame: status header, grid with energy panel, legend.
pub fn render_frame(snapshot: &Snapshot, fps_estimate: f64) -> String {
    let occupied: HashSet<_> = snapshot.rabbits.iter().map(|r| r.position).collect();
    let panel = EnergyStats::from_snapshot(snapshot).panel_lines();

    let mut frame = String::new();
    let _ = writeln!(
        frame,
        "EcoSim | tick: {:>4} | rabbits: {:>3} | grass: {}/{} | fps≈{:04.1}",
        snapshot.tick,
        snapshot.rabbits.len(),
        snapshot.grass,
        snapshot.total_tiles(),
        fps_estimate
    );

    let rows = (snapshot.height.max(0) as usize).max(panel.len());
    for y in 0..rows {
        let mut line = String::from(GRID_INDENT);
        if (y as i32) < snapshot.height {
            for x in 0..snapshot.width {
                let pos = Position::new(x, y as i32);
                line.push(tile_glyph(snapshot.timer_at(pos) == 0, occupied.contains(&pos)));
            }
        } else {
            line.push_str(&" ".repeat(snapshot.width.max(0) as usize));
        }
        if let Some(panel_line) = panel.get(y) {
            line.push_str(PANEL_GAP);
            line.push_str(panel_line);
        }
        let _ = writeln!(frame, "{}", line.trim_end());
    }

    frame.push('\n');
    frame.push_str(LEGEND);
    frame.push('\n');
    frame
}
