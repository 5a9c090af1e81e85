use glam::IVec2;

/// Half-open integer rectangle on the XZ plane (`y` of the vector is world `z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb2d {
    pub min: IVec2,
    pub max: IVec2,
}

impl Aabb2d {
    pub fn with_position_and_size(position: IVec2, size: IVec2) -> Self {
        Self {
            min: position,
            max: position + size,
        }
    }

    /// Square cell of edge `w` at `(x, z)`.
    pub fn square(x: i32, z: i32, w: u32) -> Self {
        Self::with_position_and_size(IVec2::new(x, z), IVec2::splat(w as i32))
    }

    pub fn size(&self) -> IVec2 {
        self.max - self.min
    }

    pub fn center(&self) -> IVec2 {
        self.min + self.size() / 2
    }

    pub const fn contains_rect(&self, other: &Self) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }
}
