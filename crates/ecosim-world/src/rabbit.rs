//! Rabbit state.

use ecosim_core::Position;
use serde::{Deserialize, Serialize};

/// A rabbit in the simulation.
///
/// Rabbits have no identity beyond their slot in the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rabbit {
    pub position: Position,
    pub energy: i32,
}

impl Rabbit {
    pub fn new(position: Position, energy: i32) -> Self {
        Self { position, energy }
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0
    }

    pub fn add_energy(&mut self, amount: i32) {
        self.energy += amount;
    }

    /// Energy may go negative; the cull pass removes the rabbit afterwards.
    pub fn spend_energy(&mut self, amount: i32) {
        self.energy -= amount;
    }

    pub fn move_to(&mut self, new_position: Position) {
        self.position = new_position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rabbit_creation() {
        let rabbit = Rabbit::new(Position::new(5, 5), 10);
        assert_eq!(rabbit.position, Position::new(5, 5));
        assert_eq!(rabbit.energy, 10);
        assert!(rabbit.is_alive());
    }

    #[test]
    fn test_energy_management() {
        let mut rabbit = Rabbit::new(Position::new(0, 0), 3);

        rabbit.add_energy(4);
        assert_eq!(rabbit.energy, 7);

        rabbit.spend_energy(7);
        assert_eq!(rabbit.energy, 0);
        assert!(!rabbit.is_alive());

        rabbit.spend_energy(2);
        assert_eq!(rabbit.energy, -2);
    }

    #[test]
    fn test_move_to() {
        let mut rabbit = Rabbit::new(Position::new(0, 0), 1);
        rabbit.move_to(Position::new(1, 0));
        assert_eq!(rabbit.position, Position::new(1, 0));
    }
}
