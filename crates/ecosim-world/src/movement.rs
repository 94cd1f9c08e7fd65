//! Random-walk move proposals.

use crate::rabbit::Rabbit;
use ecosim_core::{Direction, Position};
use rand::Rng;

/// Draw one cardinal direction per rabbit, in population order.
///
/// A step that would leave the grid degrades to staying put. Exactly one
/// draw is consumed per rabbit either way.
pub fn propose_moves<R: Rng + ?Sized>(
    rabbits: &[Rabbit],
    width: i32,
    height: i32,
    rng: &mut R,
) -> Vec<Position> {
    rabbits
        .iter()
        .map(|rabbit| {
            let direction = Direction::CARDINAL[rng.gen_range(0..Direction::CARDINAL.len())];
            let candidate = rabbit.position.step(direction);
            if candidate.in_bounds(width, height) {
                candidate
            } else {
                rabbit.position
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_proposals_are_adjacent_and_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let rabbits: Vec<Rabbit> = (0..5)
            .flat_map(|x| (0..5).map(move |y| Rabbit::new(Position::new(x, y), 1)))
            .collect();

        for _ in 0..20 {
            let proposals = propose_moves(&rabbits, 5, 5, &mut rng);
            assert_eq!(proposals.len(), rabbits.len());
            for (rabbit, target) in rabbits.iter().zip(&proposals) {
                assert!(target.in_bounds(5, 5));
                assert!(rabbit.position.manhattan_distance(target) <= 1);
            }
        }
    }

    #[test]
    fn test_single_tile_grid_always_stays() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let rabbits = vec![Rabbit::new(Position::new(0, 0), 1)];
        for _ in 0..10 {
            assert_eq!(
                propose_moves(&rabbits, 1, 1, &mut rng),
                vec![Position::new(0, 0)]
            );
        }
    }

    #[test]
    fn test_same_seed_same_proposals() {
        let rabbits = vec![
            Rabbit::new(Position::new(1, 1), 1),
            Rabbit::new(Position::new(2, 2), 1),
        ];
        let mut a = ChaCha8Rng::seed_from_u64(9);
        let mut b = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(
            propose_moves(&rabbits, 4, 4, &mut a),
            propose_moves(&rabbits, 4, 4, &mut b)
        );
    }

    #[test]
    fn test_no_rabbits_no_draws() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(propose_moves(&[], 3, 3, &mut rng).is_empty());
    }
}
