//! World simulation engine.
//!
//! This module implements the bounded 2D grid where rabbits graze, compete
//! for tile space, breed and starve.

pub mod grid;
pub mod lottery;
pub mod movement;
pub mod rabbit;
pub mod simulation;
pub mod snapshot;

pub use grid::Grid;
pub use lottery::{resolve_contention, Resolution};
pub use movement::propose_moves;
pub use rabbit::Rabbit;
pub use simulation::{EngineState, World};
pub use snapshot::{RunSummary, Snapshot, TickReport};
