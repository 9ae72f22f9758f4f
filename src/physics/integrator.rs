use super::{Body, BodySet};

/// Advance a single body by one timestep with semi-implicit Euler:
/// velocity is updated first and the new velocity moves the body.
///
/// Gravity is added to the body's own vertical acceleration.
/// Static bodies are not accelerated, but still move with whatever velocity they were given.
/// Bodies without physics enabled are left untouched.
#[inline]
pub fn integrate(body: &mut Body, gravity: f64, dt: f64) {
    if !body.physics_enabled {
        return;
    }
    if !body.is_static() {
        body.velocity.x += body.acceleration.x * dt;
        body.velocity.y += (body.acceleration.y + gravity) * dt;
    }
    body.position.x += body.velocity.x * dt;
    body.position.y += body.velocity.y * dt;
}

/// Integrate every body in the set.
pub fn integrate_all(bodies: &mut BodySet, gravity: f64, dt: f64) {
    for (_, body) in bodies.iter_mut() {
        integrate(body, gravity, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{math::Vec2, physics::BodyConfig};

    #[test]
    fn matches_repeated_update_rule() {
        let (gravity, dt) = (600.0, 0.016);
        let (ax, ay) = (3.0, -50.0);
        let mut body = BodyConfig::default()
            .with_position([1.0, 2.0])
            .with_velocity([4.0, -30.0])
            .with_acceleration([ax, ay])
            .build()
            .unwrap();

        let (mut x, mut y, mut vx, mut vy) = (1.0_f64, 2.0_f64, 4.0_f64, -30.0_f64);
        for _ in 0..100 {
            integrate(&mut body, gravity, dt);
            vx += ax * dt;
            vy += (ay + gravity) * dt;
            x += vx * dt;
            y += vy * dt;
            // same operations in the same order, so bit-exact
            assert_eq!(body.velocity, Vec2::new(vx, vy));
            assert_eq!(body.position, Vec2::new(x, y));
        }
    }

    #[test]
    fn constant_velocity_without_forces() {
        let mut body = BodyConfig::default()
            .with_velocity([2.0, 0.5])
            .build()
            .unwrap();
        for _ in 0..4 {
            integrate(&mut body, 0.0, 0.25);
        }
        assert_eq!(body.velocity, Vec2::new(2.0, 0.5));
        assert_eq!(body.position, Vec2::new(2.0, 0.5));
    }

    #[test]
    fn disabled_bodies_do_not_move() {
        let mut bodies = BodySet::new();
        let key = bodies.insert(
            BodyConfig::default()
                .with_velocity([1.0, 1.0])
                .with_physics(false)
                .build()
                .unwrap(),
        );
        integrate_all(&mut bodies, 600.0, 1.0);
        let body = bodies.get(key).unwrap();
        assert_eq!(body.position, Vec2::zero());
        assert_eq!(body.velocity, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn static_bodies_ignore_gravity() {
        let mut ground = BodyConfig::default().static_body().build().unwrap();
        integrate(&mut ground, 600.0, 1.0);
        assert_eq!(ground.velocity, Vec2::zero());
        assert_eq!(ground.position, Vec2::zero());

        // a moving platform keeps its velocity
        let mut platform = BodyConfig::default()
            .static_body()
            .with_velocity([2.0, 0.0])
            .with_acceleration([5.0, 5.0])
            .build()
            .unwrap();
        integrate(&mut platform, 600.0, 0.5);
        assert_eq!(platform.velocity, Vec2::new(2.0, 0.0));
        assert_eq!(platform.position, Vec2::new(1.0, 0.0));
    }
}
