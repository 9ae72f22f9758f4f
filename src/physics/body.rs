use crate::math::{self as m, Vec2, AABB};

use thiserror::Error;

/// A body is an axis-aligned box that moves, typically under gravity,
/// and collides with other physics-enabled bodies.
///
/// Bodies are created from a validated [`BodyConfig`][self::BodyConfig].
/// Edges and center are always computed from the current position and size.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    /// Top-left corner of the bounding box.
    pub position: Vec2,
    pub velocity: Vec2,
    /// Constant acceleration added on top of gravity every step.
    pub acceleration: Vec2,
    size: Vec2,
    mass: Mass,
    pub material: Material,
    /// Bodies without this flag are left alone by the integrator and never collide.
    pub physics_enabled: bool,
}

impl Body {
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.size.y
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.position.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.position.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.position.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    #[inline]
    pub fn aabb(&self) -> AABB {
        AABB::from_top_left(self.position, self.size)
    }

    #[inline]
    pub fn mass(&self) -> Mass {
        self.mass
    }

    #[inline]
    pub fn inverse_mass(&self) -> f64 {
        self.mass.inv()
    }

    /// Static bodies have infinite mass and are never moved by collisions.
    #[inline]
    pub fn is_static(&self) -> bool {
        matches!(self.mass, Mass::Infinite)
    }

    /// Linear momentum, zero for static bodies.
    pub fn momentum(&self) -> Vec2 {
        match self.mass {
            Mass::Finite { mass, .. } => self.velocity * mass,
            Mass::Infinite => Vec2::zero(),
        }
    }

    /// True if the point lies inside the body's bounds or on its edges.
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.aabb().contains_point(p)
    }

    /// Change the extents of the body. Rejects non-positive or non-finite sizes.
    pub fn set_size(&mut self, size: Vec2) -> Result<(), BodyConfigError> {
        validate_size(size)?;
        self.size = size;
        Ok(())
    }

    /// Change the mass of the body. A mass of exactly zero makes it static.
    pub fn set_mass(&mut self, mass: f64) -> Result<(), BodyConfigError> {
        self.mass = Mass::try_from(mass)?;
        Ok(())
    }
}

/// Mass of a body, which can be infinite.
///
/// This stores both a mass value and its inverse, because calculating inverse mass
/// is expensive and needed a lot in physics calculations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mass {
    Finite { mass: f64, inverse: f64 },
    Infinite,
}

impl TryFrom<f64> for Mass {
    type Error = BodyConfigError;

    /// Zero means infinite mass, negative or non-finite values are rejected.
    fn try_from(mass: f64) -> Result<Self, Self::Error> {
        if !mass.is_finite() || mass < 0.0 {
            Err(BodyConfigError::InvalidMass(mass))
        } else if mass == 0.0 {
            Ok(Mass::Infinite)
        } else {
            Ok(Mass::Finite {
                mass,
                inverse: 1.0 / mass,
            })
        }
    }
}

impl Mass {
    /// Get the inverse of the mass, which is zero if the mass is infinite.
    #[inline]
    pub fn inv(&self) -> f64 {
        match self {
            Mass::Finite { inverse, .. } => *inverse,
            Mass::Infinite => 0.0,
        }
    }
}

/// Determines how the surface of a body responds to collisions.
///
/// Each body has its own coefficients; pairs combine them with
/// [`restitution_with`][Self::restitution_with] and [`friction_with`][Self::friction_with].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// 0 is fully inelastic, 1 is fully elastic.
    pub restitution: f64,
    pub friction: f64,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            restitution: 0.8,
            friction: 0.0,
        }
    }
}

impl Material {
    /// Get the restitution coefficient between this material and another.
    ///
    /// The less bouncy of the two wins.
    #[inline]
    pub fn restitution_with(&self, other: &Self) -> f64 {
        self.restitution.min(other.restitution)
    }

    /// Get the friction coefficient between this material and another.
    ///
    /// It is computed as the geometric mean of the two materials' coefficients.
    #[inline]
    pub fn friction_with(&self, other: &Self) -> f64 {
        (self.friction * other.friction).sqrt()
    }
}

//
// configuration
//

/// Reasons a [`BodyConfig`][self::BodyConfig] can be rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum BodyConfigError {
    #[error("body extents must be positive and finite, got {width} x {height}")]
    NonPositiveExtent { width: f64, height: f64 },
    #[error("body mass must be finite and non-negative, got {0}")]
    InvalidMass(f64),
    #[error("restitution must be within [0, 1], got {0}")]
    RestitutionOutOfRange(f64),
    #[error("friction must be finite and non-negative, got {0}")]
    NegativeFriction(f64),
    #[error("body {0} must be finite")]
    NonFiniteState(&'static str),
}

/// Everything needed to create a [`Body`][self::Body], with every default spelled out.
///
/// ```
/// # use nanoframe::physics::BodyConfig;
/// let crate_box = BodyConfig::default()
///     .with_position([10.0, 0.0])
///     .with_size([32.0, 32.0])
///     .with_mass(2.0)
///     .build()
///     .unwrap();
/// assert_eq!(crate_box.right(), 42.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-types", serde(default))]
pub struct BodyConfig {
    /// Top-left corner. Default `[0, 0]`.
    pub position: [f64; 2],
    /// Default `[0, 0]`.
    pub velocity: [f64; 2],
    /// Default `[0, 0]`.
    pub acceleration: [f64; 2],
    /// Width and height. Default `[1, 1]`.
    pub size: [f64; 2],
    /// Default `1`. Zero makes a static body.
    pub mass: f64,
    /// Default `0.8`.
    pub restitution: f64,
    /// Default `0`.
    pub friction: f64,
    /// Default `true`.
    pub physics_enabled: bool,
}

impl Default for BodyConfig {
    fn default() -> Self {
        let material = Material::default();
        BodyConfig {
            position: [0.0, 0.0],
            velocity: [0.0, 0.0],
            acceleration: [0.0, 0.0],
            size: [1.0, 1.0],
            mass: 1.0,
            restitution: material.restitution,
            friction: material.friction,
            physics_enabled: true,
        }
    }
}

impl BodyConfig {
    #[inline]
    pub fn with_position(mut self, pos: impl Into<[f64; 2]>) -> Self {
        self.position = pos.into();
        self
    }

    #[inline]
    pub fn with_velocity(mut self, vel: impl Into<[f64; 2]>) -> Self {
        self.velocity = vel.into();
        self
    }

    #[inline]
    pub fn with_acceleration(mut self, acc: impl Into<[f64; 2]>) -> Self {
        self.acceleration = acc.into();
        self
    }

    #[inline]
    pub fn with_size(mut self, size: impl Into<[f64; 2]>) -> Self {
        self.size = size.into();
        self
    }

    #[inline]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Shorthand for a mass of zero.
    #[inline]
    pub fn static_body(self) -> Self {
        self.with_mass(0.0)
    }

    #[inline]
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    #[inline]
    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction;
        self
    }

    #[inline]
    pub fn with_material(self, material: Material) -> Self {
        self.with_restitution(material.restitution)
            .with_friction(material.friction)
    }

    #[inline]
    pub fn with_physics(mut self, enabled: bool) -> Self {
        self.physics_enabled = enabled;
        self
    }

    /// Validate the configuration and create a body from it.
    pub fn build(self) -> Result<Body, BodyConfigError> {
        let position = Vec2::from(self.position);
        let velocity = Vec2::from(self.velocity);
        let acceleration = Vec2::from(self.acceleration);
        let size = Vec2::from(self.size);

        validate_size(size)?;
        let mass = Mass::try_from(self.mass)?;
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(BodyConfigError::RestitutionOutOfRange(self.restitution));
        }
        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(BodyConfigError::NegativeFriction(self.friction));
        }
        for (name, v) in [
            ("position", position),
            ("velocity", velocity),
            ("acceleration", acceleration),
        ] {
            if !m::is_finite(v) {
                return Err(BodyConfigError::NonFiniteState(name));
            }
        }

        Ok(Body {
            position,
            velocity,
            acceleration,
            size,
            mass,
            material: Material {
                restitution: self.restitution,
                friction: self.friction,
            },
            physics_enabled: self.physics_enabled,
        })
    }
}

impl TryFrom<BodyConfig> for Body {
    type Error = BodyConfigError;

    fn try_from(config: BodyConfig) -> Result<Self, Self::Error> {
        config.build()
    }
}

fn validate_size(size: Vec2) -> Result<(), BodyConfigError> {
    // written so that NaN fails the check
    if size.x > 0.0 && size.y > 0.0 && m::is_finite(size) {
        Ok(())
    } else {
        Err(BodyConfigError::NonPositiveExtent {
            width: size.x,
            height: size.y,
        })
    }
}
