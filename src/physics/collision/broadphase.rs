//! Broad phase collision detection algorithms
//! are responsible for detecting pairs of possibly intersecting objects
//! for further, more accurate narrow phase inspection.

use crate::physics::Body;

use itertools::Itertools;

/// A broad phase algorithm.
pub trait BroadPhase {
    /// Returns pairs of indices into a list of `count` bodies that may intersect.
    /// Every pair must be ordered so that `pair[0] < pair[1]`.
    fn pairs(count: usize) -> Box<dyn Iterator<Item = [usize; 2]>>;

    /// Cheap rejection test run on every pair just before narrow phase,
    /// using the bodies' current positions.
    #[inline]
    fn may_collide(a: &Body, b: &Body) -> bool {
        a.aabb().overlaps(&b.aabb())
    }
}

/// The simplest possible broad phase algorithm,
/// which pairs every object with every other object.
/// Very inefficient, but can work for small systems.
///
/// Pairs are produced lazily in lexicographic order:
/// `[0, 1], [0, 2], .., [0, n-1], [1, 2], ..`
pub struct BruteForce;

impl BroadPhase for BruteForce {
    fn pairs(count: usize) -> Box<dyn Iterator<Item = [usize; 2]>> {
        Box::new((0..count).tuple_combinations().map(|(i, j)| [i, j]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyConfig;

    #[test]
    fn brute_force_pairs_in_order() {
        itertools::assert_equal(
            BruteForce::pairs(4),
            [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]],
        );
        assert_eq!(BruteForce::pairs(0).count(), 0);
        assert_eq!(BruteForce::pairs(1).count(), 0);
        assert_eq!(BruteForce::pairs(10).count(), 45);
    }

    #[test]
    fn touching_bodies_are_rejected() {
        let body = |x: f64| {
            BodyConfig::default()
                .with_position([x, 0.0])
                .with_size([10.0, 10.0])
                .build()
                .unwrap()
        };
        assert!(!BruteForce::may_collide(&body(0.0), &body(10.0)));
        assert!(BruteForce::may_collide(&body(0.0), &body(9.0)));
        assert!(BruteForce::may_collide(&body(9.0), &body(0.0)));
    }
}
