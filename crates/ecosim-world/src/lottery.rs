//! Contention resolution for simultaneous moves.
//!
//! All proposals of a tick are resolved together against the capacity each
//! tile had at the start of the tick. Rabbits proposing to stay where they
//! are keep their slot and never compete. Newcomers to a tile compete for its
//! free slots; when there are more newcomers than slots, a uniform draw
//! without replacement picks the winners and everyone else stays put.

use ecosim_core::Position;
use rand::seq::index;
use rand::Rng;
use std::collections::HashMap;
use tracing::trace;

/// Outcome of resolving one tick's proposals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Final target per rabbit, in population order
    pub targets: Vec<Position>,
    /// Proposals overridden to "stay" because the tile was full
    pub reverted: usize,
}

impl Resolution {
    /// Rabbits whose final target differs from where they stand
    pub fn granted_moves(&self, current: &[Position]) -> usize {
        self.targets
            .iter()
            .zip(current)
            .filter(|(target, here)| target != here)
            .count()
    }
}

/// Resolve proposals against per-tile free capacity.
///
/// `current[i]` and `proposals[i]` belong to the same rabbit. `free_slots`
/// reports a tile's free capacity as it was before any move of this tick.
/// Tiles are visited in order of first appearance in the population and
/// the RNG is only drawn from for over-subscribed tiles.
pub fn resolve_contention<R, F>(
    current: &[Position],
    proposals: &[Position],
    free_slots: F,
    rng: &mut R,
) -> Resolution
where
    R: Rng + ?Sized,
    F: Fn(Position) -> u32,
{
    assert_eq!(
        current.len(),
        proposals.len(),
        "one proposal per rabbit is required"
    );

    // Newcomers grouped by target, tiles kept in first-seen order
    let mut order: Vec<Position> = Vec::new();
    let mut newcomers: HashMap<Position, Vec<usize>> = HashMap::new();
    for (slot, (&here, &target)) in current.iter().zip(proposals).enumerate() {
        if here == target {
            continue;
        }
        newcomers
            .entry(target)
            .or_insert_with(|| {
                order.push(target);
                Vec::new()
            })
            .push(slot);
    }

    let mut targets = proposals.to_vec();
    let mut reverted = 0;

    for tile in order {
        let candidates = &newcomers[&tile];
        let slots = free_slots(tile) as usize;
        if candidates.len() <= slots {
            continue;
        }

        let mut admitted = vec![false; candidates.len()];
        if slots > 0 {
            for winner in index::sample(rng, candidates.len(), slots).into_iter() {
                admitted[winner] = true;
            }
        }

        for (&rabbit, admitted) in candidates.iter().zip(admitted) {
            if !admitted {
                targets[rabbit] = current[rabbit];
                reverted += 1;
            }
        }

        trace!(
            tile_x = tile.x,
            tile_y = tile.y,
            candidates = candidates.len(),
            slots = slots,
            "Lottery drawn for over-subscribed tile"
        );
    }

    Resolution { targets, reverted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn neighbours_of(center: Position) -> Vec<Position> {
        vec![
            center.add(-1, 0),
            center.add(1, 0),
            center.add(0, -1),
            center.add(0, 1),
        ]
    }

    #[test]
    fn test_empty_proposals() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let resolution = resolve_contention(&[], &[], |_| 1, &mut rng);
        assert!(resolution.targets.is_empty());
        assert_eq!(resolution.reverted, 0);
    }

    #[test]
    fn test_under_capacity_all_granted() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let center = Position::new(1, 1);
        let current = neighbours_of(center);
        let proposals = vec![center; 4];

        let resolution = resolve_contention(&current, &proposals, |_| 4, &mut rng);
        assert_eq!(resolution.targets, proposals);
        assert_eq!(resolution.granted_moves(&current), 4);
    }

    #[test]
    fn test_oversubscribed_tile_admits_exactly_free_slots() {
        let center = Position::new(1, 1);
        let current = neighbours_of(center);
        let proposals = vec![center; 4];

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let resolution = resolve_contention(&current, &proposals, |_| 2, &mut rng);

            let winners = resolution
                .targets
                .iter()
                .filter(|&&target| target == center)
                .count();
            assert_eq!(winners, 2);
            assert_eq!(resolution.reverted, 2);

            // Losers stay where they were
            for (target, here) in resolution.targets.iter().zip(&current) {
                assert!(target == &center || target == here);
            }
        }
    }

    #[test]
    fn test_winners_vary_with_seed() {
        let center = Position::new(1, 1);
        let current = neighbours_of(center);
        let proposals = vec![center; 4];

        let mut outcomes = HashSet::new();
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            outcomes.insert(resolve_contention(&current, &proposals, |_| 1, &mut rng).targets);
        }
        assert!(outcomes.len() > 1);
    }

    #[test]
    fn test_same_seed_same_winners() {
        let center = Position::new(1, 1);
        let current = neighbours_of(center);
        let proposals = vec![center; 4];

        let mut a = ChaCha8Rng::seed_from_u64(11);
        let mut b = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(
            resolve_contention(&current, &proposals, |_| 1, &mut a),
            resolve_contention(&current, &proposals, |_| 1, &mut b)
        );
    }

    #[test]
    fn test_stayer_does_not_compete() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let center = Position::new(1, 1);
        // Resident stays, one newcomer, no free slot left
        let current = vec![center, Position::new(0, 1)];
        let proposals = vec![center, center];

        let resolution = resolve_contention(&current, &proposals, |_| 0, &mut rng);
        assert_eq!(resolution.targets, vec![center, Position::new(0, 1)]);
        assert_eq!(resolution.reverted, 1);
    }

    #[test]
    fn test_full_tile_reverts_all_without_drawing() {
        let center = Position::new(1, 1);
        let current = neighbours_of(center);
        let proposals = vec![center; 4];

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut untouched = rng.clone();
        let resolution = resolve_contention(&current, &proposals, |_| 0, &mut rng);

        assert_eq!(resolution.targets, current);
        assert_eq!(resolution.reverted, 4);
        assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
    }

    #[test]
    fn test_tiles_resolved_independently() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let a = Position::new(0, 0);
        let b = Position::new(5, 5);
        let current = vec![a.add(1, 0), a.add(0, 1), b.add(1, 0)];
        let proposals = vec![a, a, b];

        let resolution = resolve_contention(&current, &proposals, |_| 1, &mut rng);
        assert_eq!(resolution.reverted, 1);
        assert_eq!(resolution.targets[2], b);
    }

    proptest! {
        #[test]
        fn proptest_never_exceeds_free_slots(
            seed in any::<u64>(),
            contenders in 1usize..12,
            slots in 0u32..6,
        ) {
            let target = Position::new(0, 0);
            let current: Vec<Position> = (1..=contenders as i32).map(|i| Position::new(i, 0)).collect();
            let proposals = vec![target; contenders];
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let resolution = resolve_contention(&current, &proposals, |_| slots, &mut rng);
            let admitted = resolution.targets.iter().filter(|&&t| t == target).count();

            prop_assert_eq!(admitted, contenders.min(slots as usize));
            prop_assert_eq!(resolution.reverted, contenders - admitted);
        }
    }
}
