use crate::math::{self as m, Unit};

use std::collections::HashMap;

//

pub mod body;
pub use body::{Body, BodyConfig, BodyConfigError, Mass, Material};

pub mod body_set;
pub use body_set::{BodyKey, BodySet};

pub mod collision;
use collision::{narrowphase, BroadPhase, BruteForce};
pub use collision::{Contact, ContactModel};

pub mod integrator;

pub mod solver;
pub use solver::ContactImpulse;

//

/// How many times contacts are detected and resolved per step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStrategy {
    /// Every overlapping pair is resolved once, in pair order.
    /// Later pairs see the corrections made by earlier ones.
    #[default]
    SinglePass,
    /// Repeat detection and resolution over all pairs several times.
    /// Stacks settle faster, at the cost of more work per step
    /// and behaviour that differs from the single pass.
    Iterative { passes: usize },
}

/// Simulation-wide physics parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-types", serde(default))]
pub struct PhysicsConfig {
    /// Downward acceleration applied to every dynamic body, in units per second squared.
    /// Positive y points down the screen.
    pub gravity: f64,
    /// Restitution given to bodies created from [`body_defaults`][Self::body_defaults].
    pub default_restitution: f64,
    /// Friction given to bodies created from [`body_defaults`][Self::body_defaults].
    pub default_friction: f64,
    pub contact_model: ContactModel,
    pub strategy: SolverStrategy,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let material = Material::default();
        PhysicsConfig {
            gravity: 600.0,
            default_restitution: material.restitution,
            default_friction: material.friction,
            contact_model: ContactModel::default(),
            strategy: SolverStrategy::default(),
        }
    }
}

impl PhysicsConfig {
    #[inline]
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    #[inline]
    pub fn with_default_material(mut self, material: Material) -> Self {
        self.default_restitution = material.restitution;
        self.default_friction = material.friction;
        self
    }

    #[inline]
    pub fn with_contact_model(mut self, model: ContactModel) -> Self {
        self.contact_model = model;
        self
    }

    #[inline]
    pub fn with_strategy(mut self, strategy: SolverStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// A body configuration using this simulation's default material.
    pub fn body_defaults(&self) -> BodyConfig {
        BodyConfig::default()
            .with_restitution(self.default_restitution)
            .with_friction(self.default_friction)
    }
}

/// Produced by the physics step for every pair of bodies that collided.
#[derive(Clone, Copy, Debug)]
pub struct ContactEvent {
    pub bodies: [BodyKey; 2],
    /// Points from `bodies[0]` toward `bodies[1]`.
    pub normal: Unit<m::Vec2>,
    /// Penetration depth when the contact was detected.
    pub depth: f64,
    /// Total impulse applied to resolve the contact.
    /// Zero if both bodies are static or they were already separating.
    pub impulse: ContactImpulse,
}

impl ContactEvent {
    #[inline]
    pub fn involves(&self, body: BodyKey) -> bool {
        self.bodies.contains(&body)
    }

    /// The body on the other side of the contact, if `body` is part of it.
    pub fn other(&self, body: BodyKey) -> Option<BodyKey> {
        match self.bodies {
            [a, b] if a == body => Some(b),
            [a, b] if b == body => Some(a),
            _ => None,
        }
    }

    /// The contact normal facing away from the given body.
    pub fn normal_from(&self, body: BodyKey) -> Option<Unit<m::Vec2>> {
        match self.bodies {
            [a, _] if a == body => Some(self.normal),
            [_, b] if b == body => Some(-self.normal),
            _ => None,
        }
    }
}

/// The physics pipeline: integration, collision detection and contact resolution.
#[derive(Clone, Debug, Default)]
pub struct Physics {
    pub config: PhysicsConfig,
    contacts: Vec<ContactEvent>,
}

impl Physics {
    pub fn new(config: PhysicsConfig) -> Self {
        Physics {
            config,
            contacts: Vec::new(),
        }
    }

    /// Move bodies, detect collisions and resolve them.
    ///
    /// Physics-enabled bodies are integrated first. Then every pair of them,
    /// in slot order, is tested against the bodies' current positions and resolved
    /// immediately, so a body touching several others is corrected sequentially.
    ///
    /// Returns the contacts that occurred, also available from
    /// [`contacts`][Self::contacts] until the next step.
    pub fn step(&mut self, bodies: &mut BodySet, dt: f64) -> &[ContactEvent] {
        self.contacts.clear();
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("skipping physics step with invalid dt {dt}");
            return &self.contacts;
        }

        {
            let _span = tracy_span!("integrate");
            integrator::integrate_all(bodies, self.config.gravity, dt);
        }

        let _span = tracy_span!("collide");
        let keys = bodies.physics_keys();
        let passes = match self.config.strategy {
            SolverStrategy::SinglePass => 1,
            SolverStrategy::Iterative { passes } => passes.max(1),
        };
        // position of each colliding pair in self.contacts,
        // so that repeated passes add up into a single event
        let mut event_idxs: HashMap<[usize; 2], usize> = HashMap::new();

        for _pass in 0..passes {
            for pair in BruteForce::pairs(keys.len()) {
                let (Some(a), Some(b)) = bodies.get2_mut(keys[pair[0]], keys[pair[1]]) else {
                    continue;
                };
                if !BruteForce::may_collide(a, b) {
                    continue;
                }

                let contact = narrowphase::contact(a, b, self.config.contact_model);
                let impulse = solver::resolve_contact(a, b, &contact).unwrap_or_default();

                match event_idxs.get(&pair) {
                    Some(&idx) => {
                        let evt = &mut self.contacts[idx];
                        evt.impulse.normal += impulse.normal;
                        evt.impulse.tangent += impulse.tangent;
                        evt.impulse.separating &= impulse.separating;
                    }
                    None => {
                        event_idxs.insert(pair, self.contacts.len());
                        self.contacts.push(ContactEvent {
                            bodies: [keys[pair[0]], keys[pair[1]]],
                            normal: contact.normal,
                            depth: contact.depth,
                            impulse,
                        });
                    }
                }
            }
        }

        log::trace!(
            "physics step: {} bodies, {} contacts, dt {dt}",
            keys.len(),
            self.contacts.len()
        );
        &self.contacts
    }

    /// Contacts produced by the latest step.
    #[inline]
    pub fn contacts(&self) -> &[ContactEvent] {
        &self.contacts
    }

    /// Bodies that were in contact with the given body during the latest step.
    pub fn bodies_touching(&self, body: BodyKey) -> impl Iterator<Item = BodyKey> + '_ {
        self.contacts.iter().filter_map(move |c| c.other(body))
    }

    /// Find the first body, in slot order, whose bounds contain the given point.
    pub fn query_point(&self, bodies: &BodySet, point: m::Vec2) -> Option<BodyKey> {
        bodies
            .iter()
            .find(|(_, b)| b.contains_point(point))
            .map(|(k, _)| k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use approx::assert_relative_eq;

    fn boxed(x: f64, y: f64) -> BodyConfig {
        BodyConfig::default()
            .with_position([x, y])
            .with_size([10.0, 10.0])
    }

    #[test]
    fn head_on_collision_swaps_velocities() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(
            boxed(0.0, 0.0)
                .with_velocity([10.0, 0.0])
                .with_restitution(1.0)
                .build()
                .unwrap(),
        );
        let b = bodies.insert(
            boxed(9.0, 0.0)
                .with_velocity([-10.0, 0.0])
                .with_restitution(1.0)
                .build()
                .unwrap(),
        );
        let mut physics = Physics::new(PhysicsConfig::default().with_gravity(0.0));

        let contacts = physics.step(&mut bodies, 0.0);

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].bodies, [a, b]);
        assert_relative_eq!(bodies.get(a).unwrap().velocity.x, -10.0);
        assert_relative_eq!(bodies.get(b).unwrap().velocity.x, 10.0);
        itertools::assert_equal(physics.bodies_touching(a), [b]);
        itertools::assert_equal(physics.bodies_touching(b), [a]);
    }

    #[test]
    fn resting_contact_settles() {
        let (gravity, dt) = (600.0, 0.016);
        let mut bodies = BodySet::new();
        let ground = bodies.insert(
            BodyConfig::default()
                .with_position([-50.0, 10.0])
                .with_size([100.0, 10.0])
                .static_body()
                .with_restitution(0.0)
                .build()
                .unwrap(),
        );
        let block = bodies.insert(boxed(0.0, 0.0).with_restitution(0.0).build().unwrap());
        let mut physics = Physics::new(PhysicsConfig::default().with_gravity(gravity));

        for frame in 0..300 {
            physics.step(&mut bodies, dt);
            let b = bodies.get(block).unwrap();
            if frame > 0 {
                assert_relative_eq!(b.velocity.y, 0.0, epsilon = 1e-9);
                // never sinks into the ground
                assert!(b.bottom() <= 10.0 + 1e-9, "sank to {}", b.bottom());
                assert!(b.bottom() >= 10.0 - 1e-9, "floating at {}", b.bottom());
            }
        }
        let g = bodies.get(ground).unwrap();
        assert_eq!(g.position, Vec2::new(-50.0, 10.0));
        assert_eq!(g.velocity, Vec2::zero());
    }

    #[test]
    fn later_pairs_see_earlier_corrections() {
        // three boxes in a row, the middle one overlapping both neighbours
        let mut bodies = BodySet::new();
        let left = bodies.insert(boxed(0.0, 0.0).build().unwrap());
        let middle = bodies.insert(boxed(9.0, 0.0).build().unwrap());
        let right = bodies.insert(boxed(18.0, 0.0).build().unwrap());
        let mut physics = Physics::new(PhysicsConfig::default().with_gravity(0.0));

        physics.step(&mut bodies, 0.0);

        // pair order: (left, middle), (left, right), (middle, right).
        // resolving (left, middle) pushes middle to 9.5, deepening its overlap with right to 1.5
        let events = physics.contacts();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].bodies, [left, middle]);
        assert_relative_eq!(events[0].depth, 1.0);
        assert_eq!(events[1].bodies, [middle, right]);
        assert_relative_eq!(events[1].depth, 1.5);
        assert_relative_eq!(bodies.get(left).unwrap().position.x, -0.5);
        assert_relative_eq!(bodies.get(middle).unwrap().position.x, 8.75);
        assert_relative_eq!(bodies.get(right).unwrap().position.x, 18.75);
    }

    #[test]
    fn iterative_strategy_separates_more() {
        let setup = || {
            let mut bodies = BodySet::new();
            for i in 0..4 {
                bodies.insert(boxed(i as f64 * 8.0, 0.0).build().unwrap());
            }
            bodies
        };
        let max_overlap = |bodies: &BodySet| {
            let list: Vec<&Body> = bodies.iter().map(|(_, b)| b).collect();
            list.windows(2)
                .map(|w| w[0].aabb().overlap_x(&w[1].aabb()))
                .fold(0.0_f64, f64::max)
        };

        let mut single = setup();
        Physics::new(PhysicsConfig::default().with_gravity(0.0)).step(&mut single, 0.0);
        let mut iterative = setup();
        Physics::new(
            PhysicsConfig::default()
                .with_gravity(0.0)
                .with_strategy(SolverStrategy::Iterative { passes: 8 }),
        )
        .step(&mut iterative, 0.0);

        assert!(max_overlap(&iterative) < max_overlap(&single));
    }

    #[test]
    fn disabled_and_removed_bodies_are_ignored() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(boxed(0.0, 0.0).build().unwrap());
        let ghost = bodies.insert(boxed(5.0, 0.0).with_physics(false).build().unwrap());
        let removed = bodies.insert(boxed(2.0, 0.0).build().unwrap());
        bodies.remove(removed);
        let mut physics = Physics::new(PhysicsConfig::default().with_gravity(0.0));

        assert!(physics.step(&mut bodies, 0.1).is_empty());
        assert_eq!(bodies.get(a).unwrap().position, Vec2::zero());
        assert_eq!(bodies.get(ghost).unwrap().position, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn invalid_dt_is_skipped() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(boxed(0.0, 0.0).build().unwrap());
        let mut physics = Physics::default();
        physics.step(&mut bodies, f64::NAN);
        physics.step(&mut bodies, -1.0);
        physics.step(&mut bodies, f64::INFINITY);
        assert_eq!(bodies.get(a).unwrap().position, Vec2::zero());
        assert_eq!(bodies.get(a).unwrap().velocity, Vec2::zero());
    }

    #[test]
    fn contact_event_perspective() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(boxed(0.0, 0.0).build().unwrap());
        let b = bodies.insert(boxed(0.0, 9.0).build().unwrap());
        let c = bodies.insert(boxed(100.0, 0.0).build().unwrap());
        let mut physics = Physics::new(PhysicsConfig::default().with_gravity(0.0));
        let evt = physics.step(&mut bodies, 0.0)[0];

        assert!(evt.involves(a) && evt.involves(b) && !evt.involves(c));
        assert_eq!(evt.other(a), Some(b));
        assert_eq!(evt.other(c), None);
        assert_eq!(*evt.normal_from(a).unwrap(), Vec2::new(0.0, 1.0));
        assert_eq!(*evt.normal_from(b).unwrap(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn point_query_finds_body() {
        let mut bodies = BodySet::new();
        let _a = bodies.insert(boxed(0.0, 0.0).build().unwrap());
        let b = bodies.insert(boxed(20.0, 0.0).build().unwrap());
        let physics = Physics::default();
        assert_eq!(physics.query_point(&bodies, Vec2::new(25.0, 5.0)), Some(b));
        assert_eq!(physics.query_point(&bodies, Vec2::new(15.0, 5.0)), None);
    }

    #[test]
    fn body_defaults_use_configured_material() {
        let config = PhysicsConfig::default().with_default_material(Material {
            restitution: 0.1,
            friction: 0.4,
        });
        let body = config.body_defaults().build().unwrap();
        assert_eq!(body.material.restitution, 0.1);
        assert_eq!(body.material.friction, 0.4);
    }

    #[cfg(feature = "serde-types")]
    #[test]
    fn config_from_ron() {
        let config: PhysicsConfig =
            ron::from_str("(gravity: 9.81, strategy: Iterative(passes: 4))").unwrap();
        assert_eq!(config.gravity, 9.81);
        assert_eq!(config.strategy, SolverStrategy::Iterative { passes: 4 });
        assert_eq!(config.contact_model, ContactModel::MinimumAxis);
    }
}
