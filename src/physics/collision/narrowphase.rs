//! Narrow phase: exact overlap depth and contact normal for a pair of boxes.

use super::Contact;
use crate::{
    math::{self as m, Unit},
    physics::Body,
};

/// How the contact normal between two overlapping boxes is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub enum ContactModel {
    /// Push the boxes apart along the axis with the smaller overlap.
    /// The normal is always exactly horizontal or vertical.
    #[default]
    MinimumAxis,
    /// Push the boxes apart along the line between their centers.
    /// Gives diagonal normals when boxes meet corner to corner.
    CenterLine,
}

/// Checks two bodies for intersection.
///
/// Returns `None` if their bounding boxes do not strictly overlap.
pub fn intersection_check(a: &Body, b: &Body, model: ContactModel) -> Option<Contact> {
    if a.aabb().overlaps(&b.aabb()) {
        Some(contact(a, b, model))
    } else {
        None
    }
}

/// Compute the contact between two bodies that are known to overlap.
pub fn contact(a: &Body, b: &Body, model: ContactModel) -> Contact {
    match model {
        ContactModel::MinimumAxis => minimum_axis(a, b),
        ContactModel::CenterLine => center_line(a, b),
    }
}

//
// MINIMUM AXIS
//

fn minimum_axis(a: &Body, b: &Body) -> Contact {
    let (aabb_a, aabb_b) = (a.aabb(), b.aabb());
    let overlap_x = aabb_a.overlap_x(&aabb_b);
    let overlap_y = aabb_a.overlap_y(&aabb_b);
    let (ca, cb) = (a.center(), b.center());

    if overlap_x < overlap_y {
        let sign = if ca.x < cb.x { 1.0 } else { -1.0 };
        Contact {
            normal: Unit::new_unchecked(m::Vec2::new(sign, 0.0)),
            depth: overlap_x,
        }
    } else {
        let sign = if ca.y < cb.y { 1.0 } else { -1.0 };
        Contact {
            normal: Unit::new_unchecked(m::Vec2::new(0.0, sign)),
            depth: overlap_y,
        }
    }
}

//
// CENTER LINE
//

fn center_line(a: &Body, b: &Body) -> Contact {
    let (aabb_a, aabb_b) = (a.aabb(), b.aabb());
    let dist = b.center() - a.center();

    let normal = if dist.mag_sq() < f64::EPSILON {
        // same position, consider penetration to be on x axis
        Unit::unit_x()
    } else {
        Unit::new_normalize(dist)
    };

    // distance along the normal that removes the overlap on at least one axis
    let along_x = (normal.x != 0.0).then(|| aabb_a.overlap_x(&aabb_b) / normal.x.abs());
    let along_y = (normal.y != 0.0).then(|| aabb_a.overlap_y(&aabb_b) / normal.y.abs());
    let depth = match (along_x, along_y) {
        (Some(x), Some(y)) => x.min(y),
        (Some(d), None) | (None, Some(d)) => d,
        (None, None) => 0.0,
    };

    Contact {
        normal,
        depth: depth.max(0.0),
    }
}
