use super::Body;

use thunderdome as td;

/// Key type to look up a body stored in a [`BodySet`][self::BodySet].
///
/// Keys are generational: once the body is removed the key never resolves again,
/// even if its slot is reused by a later insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyKey(pub(crate) td::Index);

impl BodyKey {
    /// Get the underlying [`thunderdome::Index`][thunderdome::Index] of this key.
    /// Useful for creating your own mappings from bodies to other things.
    #[inline]
    pub fn index(&self) -> td::Index {
        self.0
    }
}

/// The registry of simulated bodies.
///
/// Insertion and removal are O(1). Iteration happens in slot order,
/// which is deterministic for a given sequence of insertions and removals
/// and determines the order in which collision pairs are resolved.
#[derive(Clone, Debug, Default)]
pub struct BodySet {
    bodies: td::Arena<Body>,
}

impl BodySet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a body, returning the key it can be looked up with.
    #[inline]
    pub fn insert(&mut self, body: Body) -> BodyKey {
        BodyKey(self.bodies.insert(body))
    }

    /// Remove a body, returning it if it still existed.
    #[inline]
    pub fn remove(&mut self, key: BodyKey) -> Option<Body> {
        self.bodies.remove(key.0)
    }

    /// Access a body, if it still exists.
    #[inline]
    pub fn get(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key.0)
    }

    /// Mutably access a body, if it still exists.
    #[inline]
    pub fn get_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        self.bodies.get_mut(key.0)
    }

    /// Mutably access two distinct bodies at once.
    ///
    /// # Panics
    /// Panics if both keys point to the same slot.
    #[inline]
    pub fn get2_mut(&mut self, a: BodyKey, b: BodyKey) -> (Option<&mut Body>, Option<&mut Body>) {
        self.bodies.get2_mut(a.0, b.0)
    }

    #[inline]
    pub fn contains(&self, key: BodyKey) -> bool {
        self.bodies.contains(key.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.len() == 0
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyKey, &Body)> {
        self.bodies.iter().map(|(k, b)| (BodyKey(k), b))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyKey, &mut Body)> {
        self.bodies.iter_mut().map(|(k, b)| (BodyKey(k), b))
    }

    /// Bodies taking part in the physics simulation, in slot order.
    pub fn physics_bodies(&self) -> impl Iterator<Item = (BodyKey, &Body)> {
        self.iter().filter(|(_, b)| b.physics_enabled)
    }

    /// A point-in-time list of the keys of all physics-enabled bodies.
    ///
    /// The physics pipeline works from this list so that membership stays fixed
    /// for the whole pass while the bodies themselves are mutated in place.
    pub fn physics_keys(&self) -> Vec<BodyKey> {
        self.physics_bodies().map(|(k, _)| k).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyConfig;

    fn body_at(x: f64) -> Body {
        BodyConfig::default().with_position([x, 0.0]).build().unwrap()
    }

    #[test]
    fn removed_keys_go_stale() {
        let mut set = BodySet::new();
        let a = set.insert(body_at(0.0));
        let b = set.insert(body_at(1.0));
        assert_eq!(set.len(), 2);

        assert!(set.remove(a).is_some());
        assert!(set.remove(a).is_none());
        assert!(set.get(a).is_none());
        assert!(set.contains(b));

        // slot reuse must not resurrect the old key
        let c = set.insert(body_at(2.0));
        assert!(set.get(a).is_none());
        assert_eq!(set.get(c).unwrap().position.x, 2.0);
    }

    #[test]
    fn physics_keys_skip_disabled_bodies() {
        let mut set = BodySet::new();
        let a = set.insert(body_at(0.0));
        let _decor = set.insert(
            BodyConfig::default()
                .with_physics(false)
                .build()
                .unwrap(),
        );
        let c = set.insert(body_at(2.0));
        itertools::assert_equal(set.physics_keys(), [a, c]);
    }

    #[test]
    fn get2_mut_gives_both_bodies() {
        let mut set = BodySet::new();
        let a = set.insert(body_at(0.0));
        let b = set.insert(body_at(1.0));
        if let (Some(ba), Some(bb)) = set.get2_mut(a, b) {
            std::mem::swap(&mut ba.position, &mut bb.position);
        }
        assert_eq!(set.get(a).unwrap().position.x, 1.0);
        assert_eq!(set.get(b).unwrap().position.x, 0.0);
    }
}
