use super::Aabb2d;

/// # CullVolumeId
///
/// Handle of a [`CullVolume`] registered with a [`CullingQuadTree`](super::CullingQuadTree).
///
/// ## Bit Layout (64-bit structure)
/// ```ignore
///     63-32        31-0
/// +------------+-------+
/// | generation | index |
/// +------------+-------+
///    32 bits    32 bits
/// ```
///
/// The generation changes every time a slot is reused, so ids of removed volumes never
/// alias newer ones.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CullVolumeId(u64);

impl CullVolumeId {
    /// Mask for accessing the index bits (32 bits)
    pub const INDEX_MASK: u64 = 0xFFFF_FFFF;

    #[inline(always)]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | index as u64)
    }

    #[inline(always)]
    pub const fn index(&self) -> u32 {
        (self.0 & Self::INDEX_MASK) as u32
    }

    #[inline(always)]
    pub const fn generation(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline(always)]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Debug for CullVolumeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CullVolumeId({}v{})", self.index(), self.generation())
    }
}

/// Visibility state of a footprint snapped to a quadtree cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CullVolume {
    pub x: i32,
    pub z: i32,
    /// Power-of-two edge length of the snapped cell.
    pub w: u32,
    pub is_culled: bool,
    pub prev_is_culled: bool,
}

impl CullVolume {
    /// New volumes start culled until the next tree update.
    pub const fn new(x: i32, z: i32, w: u32) -> Self {
        Self {
            x,
            z,
            w,
            is_culled: true,
            prev_is_culled: true,
        }
    }

    pub fn bounds(&self) -> Aabb2d {
        Aabb2d::square(self.x, self.z, self.w)
    }

    pub const fn changed(&self) -> bool {
        self.is_culled != self.prev_is_culled
    }
}

/// Snaps a footprint to the smallest power-of-two aligned cell that contains it.
///
/// The edge starts at `2 * highest_one_bit(max(1, w - 1))`, is raised to `min_cell_size` and doubles
/// until the aligned cell covers the whole footprint.
pub fn snap_footprint(x: i32, z: i32, w: u32, min_cell_size: u32) -> (i32, i32, u32) {
    let request = w.saturating_sub(1).max(1);
    let mut bw = (1u32 << (31 - request.leading_zeros())) * 2;
    bw = bw.max(min_cell_size.next_power_of_two());

    loop {
        let bx = x.div_euclid(bw as i32) * bw as i32;
        let bz = z.div_euclid(bw as i32) * bw as i32;

        let end = bw as i64;
        let covers_x = (x as i64 + w as i64) <= bx as i64 + end;
        let covers_z = (z as i64 + w as i64) <= bz as i64 + end;

        if covers_x && covers_z {
            return (bx, bz, bw);
        }

        bw *= 2;
    }
}
