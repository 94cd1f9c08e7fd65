//! Drives a world to completion and feeds the presentation layer.

use crate::render::{render_frame, CLEAR_SCREEN};
use anyhow::Result;
use ecosim_core::DisplayConfig;
use ecosim_world::{RunSummary, Snapshot, World};
use parking_lot::RwLock;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Run unpaced, printing a status line every `render_every` ticks.
///
/// A stop request is honoured between ticks.
pub fn run_headless(
    mut world: World,
    display_config: &DisplayConfig,
    stop: &AtomicBool,
) -> Result<RunSummary> {
    let mut out = std::io::stdout().lock();

    while !world.is_finished() {
        if stop.load(Ordering::Relaxed) {
            warn!(tick = world.tick(), "Stopping early on request");
            break;
        }
        let report = world.step()?;
        if report.tick % display_config.render_every == 0 {
            writeln!(out, "{}", world.snapshot().status_line())?;
        }
    }

    Ok(finish(&world))
}

/// Run at `tps` ticks per second while a separate task redraws at `fps`.
///
/// The simulation publishes a snapshot only after a tick completes, so the
/// renderer never sees a half-applied tick.
pub async fn run_paced(
    mut world: World,
    display_config: &DisplayConfig,
    stop: Arc<AtomicBool>,
) -> Result<RunSummary> {
    let tick_period = display_config.tick_period()?;
    let frame_period = display_config.frame_period()?;

    let published = Arc::new(RwLock::new(world.snapshot()));
    let done = Arc::new(AtomicBool::new(false));

    let renderer = tokio::spawn(frame_loop(
        published.clone(),
        done.clone(),
        frame_period,
        display_config.render_every,
    ));

    let mut ticks = interval(tick_period);
    // No catch-up bursts after a stall
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while !world.is_finished() {
        ticks.tick().await;
        if stop.load(Ordering::Relaxed) {
            warn!(tick = world.tick(), "Stopping early on request");
            break;
        }
        world.step()?;
        *published.write() = world.snapshot();
    }

    done.store(true, Ordering::Relaxed);
    renderer.await?;

    // Final frame always shows the last tick
    draw(&world.snapshot(), display_config.fps)?;

    Ok(finish(&world))
}

async fn frame_loop(
    published: Arc<RwLock<Snapshot>>,
    done: Arc<AtomicBool>,
    frame_period: Duration,
    render_every: u64,
) {
    let mut frames = interval(frame_period);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last_drawn = None;
    let mut prev_frame = Instant::now();

    while !done.load(Ordering::Relaxed) {
        frames.tick().await;
        let snapshot = published.read().clone();
        if last_drawn == Some(snapshot.tick) || snapshot.tick % render_every != 0 {
            continue;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(prev_frame).as_secs_f64().max(1e-6);
        prev_frame = now;

        if let Err(e) = draw(&snapshot, 1.0 / elapsed) {
            warn!("Failed to draw frame: {}", e);
            return;
        }
        last_drawn = Some(snapshot.tick);
    }
}

fn draw(snapshot: &Snapshot, fps_estimate: f64) -> Result<()> {
    let mut out = std::io::stdout().lock();
    write!(out, "{}{}", CLEAR_SCREEN, render_frame(snapshot, fps_estimate))?;
    out.flush()?;
    Ok(())
}

fn finish(world: &World) -> RunSummary {
    let summary = world.summary();
    info!(
        event = "run_summary",
        seed = summary.seed,
        ticks = summary.ticks,
        final_population = summary.final_population,
        total_births = summary.total_births,
        total_deaths = summary.total_deaths,
        total_reverted = summary.total_reverted,
        "Simulation complete"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecosim_core::{SimConfig, UiMode};

    #[test]
    fn test_headless_runs_to_completion() {
        let config = SimConfig {
            width: 6,
            height: 4,
            rabbits: 5,
            ticks: 12,
            seed: Some(3),
            ..Default::default()
        };
        let display_config = DisplayConfig {
            ui: UiMode::None,
            render_every: 4,
            ..Default::default()
        };
        let world = World::new(config).unwrap();
        let summary = run_headless(world, &display_config, &AtomicBool::new(false)).unwrap();

        assert_eq!(summary.ticks, 12);
        assert_eq!(summary.coverage.samples(), 12);
    }

    #[test]
    fn test_headless_stop_request() {
        let config = SimConfig {
            seed: Some(3),
            ..Default::default()
        };
        let world = World::new(config).unwrap();
        let summary = run_headless(world, &DisplayConfig::default(), &AtomicBool::new(true)).unwrap();

        assert_eq!(summary.ticks, 0);
    }

    #[tokio::test]
    async fn test_paced_runs_to_completion() {
        let config = SimConfig {
            width: 4,
            height: 3,
            rabbits: 2,
            ticks: 5,
            seed: Some(8),
            ..Default::default()
        };
        let display_config = DisplayConfig {
            tps: 1000.0,
            fps: 500.0,
            ..Default::default()
        };
        let world = World::new(config).unwrap();
        let summary = run_paced(world, &display_config, Arc::new(AtomicBool::new(false)))
            .await
            .unwrap();

        assert_eq!(summary.ticks, 5);
    }

    #[tokio::test]
    async fn test_paced_rejects_unusable_rates() {
        let config = SimConfig {
            width: 4,
            height: 3,
            rabbits: 2,
            ticks: 5,
            seed: Some(8),
            ..Default::default()
        };

        for display_config in [
            DisplayConfig {
                tps: 1e12,
                ..Default::default()
            },
            DisplayConfig {
                fps: f64::INFINITY,
                ..Default::default()
            },
            DisplayConfig {
                tps: 1e-300,
                ..Default::default()
            },
        ] {
            let world = World::new(config.clone()).unwrap();
            let result = run_paced(world, &display_config, Arc::new(AtomicBool::new(false))).await;
            assert!(result.is_err());
        }
    }
}
