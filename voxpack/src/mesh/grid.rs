use glam::{IVec3, UVec3};

use crate::Rgba;

/// Dense packaging-time voxel grid. Every cell is either empty or holds a color.
///
/// Lookups outside of the grid are treated as empty, never as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    size: UVec3,
    cells: Vec<Option<Rgba>>,
}

impl VoxelGrid {
    #[must_use]
    pub fn new(size: UVec3) -> Self {
        let len = size.x as usize * size.y as usize * size.z as usize;

        Self {
            size,
            cells: vec![None; len],
        }
    }

    /// Builds the smallest grid containing all `voxels`, shifted so the minimum corner is the origin.
    /// Later duplicates overwrite earlier ones.
    pub fn from_voxels<I>(voxels: I) -> Self
    where
        I: IntoIterator<Item = (IVec3, Rgba)>,
    {
        let voxels: Vec<(IVec3, Rgba)> = voxels.into_iter().collect();

        if voxels.is_empty() {
            return Self::new(UVec3::ZERO);
        }

        let (min, max) = voxels.iter().fold(
            (IVec3::MAX, IVec3::MIN),
            |(min, max), (position, _)| (min.min(*position), max.max(*position)),
        );

        let mut grid = Self::new((max - min + IVec3::ONE).as_uvec3());
        for (position, color) in voxels {
            grid.set(position - min, Some(color));
        }

        grid
    }

    #[must_use]
    #[inline(always)]
    pub const fn size(&self) -> UVec3 {
        self.size
    }

    #[must_use]
    #[inline(always)]
    pub fn contains(&self, position: IVec3) -> bool {
        position.cmpge(IVec3::ZERO).all() && position.as_uvec3().cmplt(self.size).all()
    }

    #[inline(always)]
    fn index(&self, position: IVec3) -> usize {
        let p = position.as_uvec3();
        (p.x as usize)
            + self.size.x as usize * (p.y as usize + self.size.y as usize * p.z as usize)
    }

    #[must_use]
    #[inline]
    pub fn get(&self, position: IVec3) -> Option<Rgba> {
        if self.contains(position) {
            self.cells[self.index(position)]
        } else {
            None
        }
    }

    #[must_use]
    #[inline]
    pub fn is_solid(&self, position: IVec3) -> bool {
        self.get(position).is_some()
    }

    /// Writes a cell. Positions outside of the grid are ignored.
    pub fn set(&mut self, position: IVec3, color: Option<Rgba>) {
        if self.contains(position) {
            let index = self.index(position);
            self.cells[index] = color;
        }
    }

    #[must_use]
    pub fn voxel_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Fills the inclusive box `min..=max` with `color`.
    pub fn fill_box(&mut self, min: IVec3, max: IVec3, color: Rgba) {
        for z in min.z..=max.z {
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    self.set(IVec3::new(x, y, z), Some(color));
                }
            }
        }
    }
}
