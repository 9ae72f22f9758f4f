use super::{Behaviour, Lifecycle, UpdateContext};
use crate::math::Vec2;

/// A short-lived point moving in a straight line, fading out over its lifetime.
///
/// Particles don't take part in physics.
/// They remove themselves from the scene once their lifetime is exceeded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Seconds since the particle was created.
    pub age: f64,
    /// Seconds the particle stays visible.
    pub lifetime: f64,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, lifetime: f64) -> Self {
        Particle {
            position,
            velocity,
            age: 0.0,
            lifetime,
        }
    }

    pub fn advance(&mut self, dt: f64) {
        self.age += dt;
        self.position += self.velocity * dt;
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.age <= self.lifetime
    }

    /// Goes linearly from 1 when created to 0 at the end of the lifetime.
    pub fn opacity(&self) -> f64 {
        if self.lifetime > 0.0 {
            (1.0 - self.age / self.lifetime).max(0.0)
        } else {
            0.0
        }
    }
}

impl Behaviour for Particle {
    fn update(&mut self, ctx: &mut UpdateContext) -> Lifecycle {
        self.advance(ctx.dt);
        if self.is_alive() {
            Lifecycle::Keep
        } else {
            Lifecycle::Remove
        }
    }
}
