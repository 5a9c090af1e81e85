use glam::IVec3;

use crate::{Direction, Rgba};

use super::VoxelGrid;

/// Highest ambient occlusion value (fully occluded corner).
pub const MAX_AO: u8 = 3;

/// Minimum AO of the low corners of ground-touching side faces.
pub const GROUND_CONTACT_AO: u8 = 2;

/// A candidate quad. Before merging every face covers one voxel side (`du == dv == 1`).
///
/// `ao` is indexed by corner: `c0=(u0,v0)`, `c1=(u1,v0)`, `c2=(u1,v1)`, `c3=(u0,v1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub direction: Direction,
    pub origin: IVec3,
    pub du: u32,
    pub dv: u32,
    pub color: Rgba,
    pub ao: [u8; 4],
}

impl Face {
    #[must_use]
    pub const fn unit(direction: Direction, origin: IVec3, color: Rgba, ao: [u8; 4]) -> Self {
        Self {
            direction,
            origin,
            du: 1,
            dv: 1,
            color,
            ao,
        }
    }

    /// Faces merge only if color and every AO corner agree.
    #[must_use]
    #[inline(always)]
    pub fn is_merge_compatible(&self, other: &Face) -> bool {
        self.color == other.color && self.ao == other.ao
    }

    #[must_use]
    #[inline(always)]
    pub const fn area(&self) -> u32 {
        self.du * self.dv
    }

    /// Corner positions in the order matching `ao`.
    #[must_use]
    pub fn corners(&self) -> [IVec3; 4] {
        let axes = self.direction.axes();

        let mut base = self.origin;
        if axes.sign > 0 {
            base[axes.normal] += 1;
        }

        let u = self.direction.unit_u() * self.du as i32;
        let v = self.direction.unit_v() * self.dv as i32;

        [base, base + u, base + u + v, base + v]
    }
}

/// Per-corner in-plane signs `(su, sv)` in corner order.
const CORNER_SIGNS: [(i32, i32); 4] = [(-1, -1), (1, -1), (1, 1), (-1, 1)];

/// Computes the four corner AO values of the `direction` face of the voxel at `position`.
///
/// Samples the layer one step along the normal: a corner whose two edge neighbours are both
/// solid is fully occluded, otherwise it counts its solid edge and diagonal neighbours.
#[must_use]
pub fn face_ambient_occlusion(
    grid: &VoxelGrid,
    position: IVec3,
    direction: Direction,
    ground_contact: bool,
) -> [u8; 4] {
    let layer = position + direction.normal();
    let u = direction.unit_u();
    let v = direction.unit_v();

    let mut ao = [0u8; 4];

    for (corner, (su, sv)) in CORNER_SIGNS.iter().enumerate() {
        let side1 = grid.is_solid(layer + u * *su);
        let side2 = grid.is_solid(layer + v * *sv);

        ao[corner] = if side1 && side2 {
            MAX_AO
        } else {
            let diagonal = grid.is_solid(layer + u * *su + v * *sv);
            side1 as u8 + side2 as u8 + diagonal as u8
        };
    }

    // faces on the grid boundary along their normal have nothing to cast contact shadow on
    if ground_contact && position.y == 0 && grid.contains(layer) {
        let low_corners = match direction {
            // u is the y axis
            Direction::Left => [0, 3],
            // v is the y axis
            Direction::Back => [0, 1],
            _ => return ao,
        };

        for corner in low_corners {
            ao[corner] = ao[corner].max(GROUND_CONTACT_AO);
        }
    }

    ao
}

#[cfg(test)]
mod tests {
    use glam::UVec3;

    use super::*;

    const GRAY: Rgba = Rgba::new(128, 128, 128, 255);

    fn grid_with(size: UVec3, voxels: &[IVec3]) -> VoxelGrid {
        let mut grid = VoxelGrid::new(size);
        for voxel in voxels {
            grid.set(*voxel, Some(GRAY));
        }
        grid
    }

    #[test]
    fn test_isolated_voxel_has_no_occlusion() {
        let grid = grid_with(UVec3::splat(3), &[IVec3::ONE]);
        for direction in Direction::ALL {
            assert_eq!(
                face_ambient_occlusion(&grid, IVec3::ONE, direction, true),
                [0; 4]
            );
        }
    }

    #[test]
    fn test_two_sides_fully_occlude() {
        // top face of (1,0,1), blockers at (0,1,1) and (1,1,0) share corner c0
        let grid = grid_with(
            UVec3::splat(3),
            &[IVec3::new(1, 0, 1), IVec3::new(0, 1, 1), IVec3::new(1, 1, 0)],
        );
        let ao = face_ambient_occlusion(&grid, IVec3::new(1, 0, 1), Direction::Top, false);
        assert_eq!(ao[0], MAX_AO);
        assert_eq!(ao[1], 1);
        assert_eq!(ao[3], 1);
        assert_eq!(ao[2], 0);
    }

    #[test]
    fn test_diagonal_only() {
        let grid = grid_with(
            UVec3::splat(3),
            &[IVec3::new(1, 0, 1), IVec3::new(2, 1, 2)],
        );
        let ao = face_ambient_occlusion(&grid, IVec3::new(1, 0, 1), Direction::Top, false);
        assert_eq!(ao, [0, 0, 1, 0]);
    }

    #[test]
    fn test_ground_contact_override() {
        let voxel = IVec3::new(1, 0, 1);
        let grid = grid_with(UVec3::new(3, 2, 3), &[voxel]);
        assert_eq!(
            face_ambient_occlusion(&grid, voxel, Direction::Left, true),
            [2, 0, 0, 2]
        );
        assert_eq!(
            face_ambient_occlusion(&grid, voxel, Direction::Back, true),
            [2, 2, 0, 0]
        );
        assert_eq!(
            face_ambient_occlusion(&grid, voxel, Direction::Right, true),
            [0; 4]
        );
        assert_eq!(
            face_ambient_occlusion(&grid, voxel, Direction::Front, true),
            [0; 4]
        );
        assert_eq!(
            face_ambient_occlusion(&grid, voxel, Direction::Left, false),
            [0; 4]
        );
    }

    #[test]
    fn test_ground_contact_skips_grid_boundary() {
        let grid = grid_with(UVec3::splat(2), &[IVec3::ZERO]);
        assert_eq!(
            face_ambient_occlusion(&grid, IVec3::ZERO, Direction::Left, true),
            [0; 4]
        );
        assert_eq!(
            face_ambient_occlusion(&grid, IVec3::ZERO, Direction::Back, true),
            [0; 4]
        );
    }

    #[test]
    fn test_ground_contact_raises_low_corners() {
        // blockers at (0, 0, 0) and (0, 1, 1) occlude c0 and c1 of the left face of (1, 0, 1)
        let voxel = IVec3::new(1, 0, 1);
        let grid = grid_with(
            UVec3::new(3, 2, 3),
            &[voxel, IVec3::new(0, 0, 0), IVec3::new(0, 1, 1)],
        );

        let plain = face_ambient_occlusion(&grid, voxel, Direction::Left, false);
        let grounded = face_ambient_occlusion(&grid, voxel, Direction::Left, true);
        assert_eq!(plain, [1, MAX_AO, 1, 0]);
        assert_eq!(grounded, [GROUND_CONTACT_AO, MAX_AO, 1, GROUND_CONTACT_AO]);
    }

    #[test]
    fn test_corners_follow_direction_plane() {
        let face = Face {
            direction: Direction::Top,
            origin: IVec3::new(1, 2, 3),
            du: 2,
            dv: 3,
            color: GRAY,
            ao: [0; 4],
        };
        assert_eq!(
            face.corners(),
            [
                IVec3::new(1, 3, 3),
                IVec3::new(3, 3, 3),
                IVec3::new(3, 3, 6),
                IVec3::new(1, 3, 6),
            ]
        );

        let face = Face::unit(Direction::Back, IVec3::new(1, 2, 3), GRAY, [0; 4]);
        assert_eq!(face.corners()[0], IVec3::new(1, 2, 3));
        assert_eq!(face.corners()[2], IVec3::new(2, 3, 3));

        let face = Face::unit(Direction::Front, IVec3::new(1, 2, 3), GRAY, [0; 4]);
        assert_eq!(face.corners()[0], IVec3::new(1, 2, 4));
    }
}
