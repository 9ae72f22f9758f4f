//! Types, aliases and helper operations for doing math with `ultraviolet`.
pub use ultraviolet as uv;

pub type Vec2 = uv::DVec2;

/// A wrapper type to indicate a vector should always be normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Unit<T>(T);

impl Unit<Vec2> {
    pub fn new_normalize(v: Vec2) -> Self {
        Unit(v.normalized())
    }

    pub const fn new_unchecked(v: Vec2) -> Self {
        Unit(v)
    }

    pub fn unit_x() -> Self {
        Unit(Vec2::unit_x())
    }
}

impl<T> std::ops::Deref for Unit<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::Neg for Unit<T>
where
    T: std::ops::Neg,
{
    type Output = Unit<<T as std::ops::Neg>::Output>;

    fn neg(self) -> Self::Output {
        Unit(-self.0)
    }
}

// Vec2 utils

#[inline]
pub fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

#[inline]
pub(crate) fn is_finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

//
// AABB
//

/// An axis-aligned bounding box in screen coordinates (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AABB {
    pub min: Vec2,
    pub max: Vec2,
}

impl AABB {
    /// Create a box from its top-left corner and its extents.
    #[inline]
    pub fn from_top_left(position: Vec2, size: Vec2) -> Self {
        AABB {
            min: position,
            max: position + size,
        }
    }

    /// Strict overlap test. Boxes that only share an edge do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &AABB) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
    }

    /// Depth of the overlap along the x axis, negative if the boxes are apart.
    #[inline]
    pub fn overlap_x(&self, other: &AABB) -> f64 {
        (self.max.x - other.min.x).min(other.max.x - self.min.x)
    }

    /// Depth of the overlap along the y axis, negative if the boxes are apart.
    #[inline]
    pub fn overlap_y(&self, other: &AABB) -> f64 {
        (self.max.y - other.min.y).min(other.max.y - self.min.y)
    }

    /// Inclusive point containment, edges count as inside.
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}
