//! Module `core::direction`
//!
//! Defines [`Direction`], the six axis-aligned face directions of a voxel, and the constant
//! per-direction axis table used by the mesher and the render packer.
//!
//! # Examples
//!
//! ```rust
//! use voxpack::Direction;
//!
//! assert_eq!(Direction::Top.index(), 1);
//! assert_eq!(Direction::from_index(5), Some(Direction::Front));
//! assert_eq!(Direction::Left.normal().x, -1);
//! assert_eq!(Direction::Back.normal().z, -1);
//! ```

use glam::IVec3;

/// Number of face directions.
pub const DIRECTION_COUNT: usize = 6;

/// Axis-aligned face direction. The discriminant is the on-disk and on-GPU direction index.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// -Y
    Bottom = 0,
    /// +Y
    Top = 1,
    /// -X
    Left = 2,
    /// +X
    Right = 3,
    /// -Z
    Back = 4,
    /// +Z
    Front = 5,
}

/// Axis mapping of a direction: the normal axis and the two in-plane axes.
///
/// Axes are indices into `[x, y, z]`. Quads wind clockwise seen from outside the face.
/// `reversed` is set when the natural corner order `(u0,v0) -> (u1,v0) -> (u1,v1) -> (u0,v1)`
/// would wind counter-clockwise, so vertices are emitted as `c0, c3, c2, c1` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMap {
    pub normal: usize,
    pub sign: i32,
    pub u: usize,
    pub v: usize,
    pub reversed: bool,
}

const AXIS_TABLE: [AxisMap; DIRECTION_COUNT] = [
    // Bottom: X x Z = -Y points out, so flip
    AxisMap {
        normal: 1,
        sign: -1,
        u: 0,
        v: 2,
        reversed: true,
    },
    // Top
    AxisMap {
        normal: 1,
        sign: 1,
        u: 0,
        v: 2,
        reversed: false,
    },
    // Left: Y x Z = +X points in
    AxisMap {
        normal: 0,
        sign: -1,
        u: 1,
        v: 2,
        reversed: false,
    },
    // Right
    AxisMap {
        normal: 0,
        sign: 1,
        u: 1,
        v: 2,
        reversed: true,
    },
    // Back: X x Y = +Z points in
    AxisMap {
        normal: 2,
        sign: -1,
        u: 0,
        v: 1,
        reversed: false,
    },
    // Front
    AxisMap {
        normal: 2,
        sign: 1,
        u: 0,
        v: 1,
        reversed: true,
    },
];

impl Direction {
    /// All directions in index order.
    pub const ALL: [Direction; DIRECTION_COUNT] = [
        Direction::Bottom,
        Direction::Top,
        Direction::Left,
        Direction::Right,
        Direction::Back,
        Direction::Front,
    ];

    #[must_use]
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < DIRECTION_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    #[must_use]
    #[inline(always)]
    pub const fn axes(self) -> AxisMap {
        AXIS_TABLE[self as usize]
    }

    /// Unit offset to the neighbour this face looks at.
    #[must_use]
    #[inline]
    pub fn normal(self) -> IVec3 {
        let axes = self.axes();
        let mut normal = IVec3::ZERO;
        normal[axes.normal] = axes.sign;
        normal
    }

    #[must_use]
    #[inline]
    pub fn unit_u(self) -> IVec3 {
        let mut unit = IVec3::ZERO;
        unit[self.axes().u] = 1;
        unit
    }

    #[must_use]
    #[inline]
    pub fn unit_v(self) -> IVec3 {
        let mut unit = IVec3::ZERO;
        unit[self.axes().v] = 1;
        unit
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Direction::Bottom => "bottom",
            Direction::Top => "top",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Back => "back",
            Direction::Front => "front",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for (index, direction) in Direction::ALL.iter().enumerate() {
            assert_eq!(direction.index(), index);
            assert_eq!(Direction::from_index(index), Some(*direction));
        }
        assert_eq!(Direction::from_index(6), None);
    }

    #[test]
    fn test_axes_are_distinct() {
        for direction in Direction::ALL {
            let axes = direction.axes();
            assert_ne!(axes.normal, axes.u);
            assert_ne!(axes.normal, axes.v);
            assert_ne!(axes.u, axes.v);
        }
    }

    #[test]
    fn test_winding_is_clockwise_from_outside() {
        // (u x v) flipped by `reversed` must point into the voxel
        for direction in Direction::ALL {
            let u = direction.unit_u();
            let v = direction.unit_v();
            let mut cross = u.cross(v);
            if direction.axes().reversed {
                cross = -cross;
            }
            assert_eq!(cross, -direction.normal(), "{direction}");
        }
    }

    #[test]
    fn test_back_faces_negative_z() {
        assert_eq!(Direction::Back.normal(), IVec3::NEG_Z);
        assert_eq!(Direction::Front.normal(), IVec3::Z);
        assert_eq!(Direction::Bottom.normal(), IVec3::NEG_Y);
        assert_eq!(Direction::Right.normal(), IVec3::X);
    }

    #[test]
    fn test_opposite_pairs() {
        assert_eq!(Direction::Bottom.normal(), -Direction::Top.normal());
        assert_eq!(Direction::Left.normal(), -Direction::Right.normal());
        assert_eq!(Direction::Back.normal(), -Direction::Front.normal());
    }
}
