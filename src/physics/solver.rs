//! Impulse-based contact resolution.
//!
//! Each contact is resolved exactly once, directly on the bodies:
//! first the overlap is removed by moving the bodies apart in proportion to their
//! inverse masses, then a normal impulse with restitution and a Coulomb friction
//! impulse are applied to their velocities.

use super::{collision::Contact, Body};
use crate::math as m;

/// The impulses that were applied while resolving a contact.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContactImpulse {
    /// Magnitude of the impulse along the contact normal, never negative.
    pub normal: f64,
    /// Signed impulse along the contact tangent, at most `friction * normal` in magnitude.
    pub tangent: f64,
    /// The bodies were already moving apart, so only the overlap was corrected.
    pub separating: bool,
}

/// Resolve a contact between two bodies.
///
/// `contact.normal` must point from `a` toward `b`.
/// Returns `None` without touching either body if both are immovable.
///
/// Sliding velocity for friction is measured after the normal impulse.
/// Since bodies don't rotate, the normal impulse never changes it,
/// so this is the same as solving both impulses simultaneously.
pub fn resolve_contact(a: &mut Body, b: &mut Body, contact: &Contact) -> Option<ContactImpulse> {
    let inv_masses = [a.inverse_mass(), b.inverse_mass()];
    let inv_mass_sum = inv_masses[0] + inv_masses[1];
    if inv_mass_sum <= 0.0 {
        return None;
    }
    let normal = *contact.normal;

    // position correction, split by each body's share of inverse mass
    let correction = normal * (contact.depth / inv_mass_sum);
    a.position -= correction * inv_masses[0];
    b.position += correction * inv_masses[1];

    let relative_vel = b.velocity - a.velocity;
    let normal_vel = relative_vel.dot(normal);
    if normal_vel > 0.0 {
        return Some(ContactImpulse {
            separating: true,
            ..Default::default()
        });
    }

    // restitution

    let restitution = a.material.restitution_with(&b.material);
    let impulse_n = -(1.0 + restitution) * normal_vel / inv_mass_sum;
    a.velocity -= normal * (impulse_n * inv_masses[0]);
    b.velocity += normal * (impulse_n * inv_masses[1]);

    // friction

    let tangent = m::left_normal(normal);
    let tangent_vel = (b.velocity - a.velocity).dot(tangent);
    let friction = a.material.friction_with(&b.material);
    let max_coulomb = impulse_n * friction;
    // max/min instead of clamp so a degenerate bound can't panic
    let impulse_t = (-tangent_vel / inv_mass_sum)
        .max(-max_coulomb)
        .min(max_coulomb);
    a.velocity -= tangent * (impulse_t * inv_masses[0]);
    b.velocity += tangent * (impulse_t * inv_masses[1]);

    Some(ContactImpulse {
        normal: impulse_n,
        tangent: impulse_t,
        separating: false,
    })
}
