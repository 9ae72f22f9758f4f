pub mod broadphase;
pub use broadphase::{BroadPhase, BruteForce};

pub mod narrowphase;
pub use narrowphase::{intersection_check, ContactModel};

use crate::math::{self as m, Unit};

/// An intersection between two bodies, alive for a single resolution step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// The normal, pointing from the first body toward the second.
    pub normal: Unit<m::Vec2>,
    /// How far the bodies need to move apart along the normal to stop overlapping.
    pub depth: f64,
}
