use crate::{DIRECTION_COUNT, Direction, Error, Result};

use super::{INDICES_PER_FACE, VERTICES_PER_FACE, VertexColors, VoxelMesh};

/// Voxel units per world unit; packed positions are divided by it.
pub const UNIT_SCALE: f32 = 16.0;

/// Floats per packed vertex: `x, y, z, attributes`.
pub const FLOATS_PER_VERTEX: usize = 4;

/// Directions excluded from the front-facing index range.
pub const CULLED_DIRECTIONS: [bool; DIRECTION_COUNT] = [
    true,  // Bottom
    false, // Top
    true,  // Left
    false, // Right
    false, // Back
    true,  // Front
];

/// Packs the per-vertex shader attribute word.
///
/// ## Bit Layout
/// ```ignore
///    31-24    23-21    20-19   18-0
/// +--------+--------+------+--------+
/// | color  |  dir   |  ao  |  zero  |
/// +--------+--------+------+--------+
///   8 bits   3 bits  2 bits  19 bits
/// ```
#[must_use]
#[inline(always)]
pub const fn pack_vertex_attributes(color_index: u8, direction: u8, ao: u8) -> u32 {
    ((color_index as u32 & 0xFF) << 24)
        | ((direction as u32 & 0x7) << 21)
        | ((ao as u32 & 0x3) << 19)
}

/// Splits a packed attribute word back into `(color_index, direction, ao)`.
#[must_use]
#[inline(always)]
pub const fn unpack_vertex_attributes(bits: u32) -> (u8, u8, u8) {
    ((bits >> 24) as u8, ((bits >> 21) & 0x7) as u8, ((bits >> 19) & 0x3) as u8)
}

/// Direction visit order: shown directions first, culled ones last, index order within each group.
#[must_use]
pub fn direction_visit_order() -> [Direction; DIRECTION_COUNT] {
    let mut order = [Direction::Bottom; DIRECTION_COUNT];
    let shown = Direction::ALL
        .iter()
        .filter(|direction| !CULLED_DIRECTIONS[direction.index()]);
    let culled = Direction::ALL
        .iter()
        .filter(|direction| CULLED_DIRECTIONS[direction.index()]);

    for (slot, direction) in order.iter_mut().zip(shown.chain(culled)) {
        *slot = *direction;
    }

    order
}

/// GPU-ready form of a [`VoxelMesh`].
///
/// Drawing the first `culled_index_count` indices renders only the shown directions,
/// drawing `complete_index_count` renders every face (shadow passes).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderMesh {
    pub name: String,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    /// Face offsets after reordering, indexed by direction.
    pub face_offsets: [u32; DIRECTION_COUNT],
    pub face_counts: [u32; DIRECTION_COUNT],
    pub culled_index_count: usize,
    pub complete_index_count: usize,
    /// Largest local x among the vertices, in voxel units.
    pub width: u32,
    /// Largest local z among the vertices, in voxel units.
    pub depth: u32,
}

impl RenderMesh {
    /// Reorders and packs `mesh`, whose colors must already be palette indices.
    pub fn pack(mesh: &VoxelMesh) -> Result<Self> {
        #[cfg(feature = "tracy")]
        let _span = tracy_client::span!("RenderMesh::pack");

        let VertexColors::Palette(colors) = &mesh.colors else {
            return Err(Error::ColorsNotPalettized);
        };

        mesh.validate()?;

        let vertex_count = mesh.vertices.len();
        let mut vertices = vec![0.0f32; vertex_count * FLOATS_PER_VERTEX];
        let mut indices = vec![0u32; mesh.indices.len()];
        let mut face_offsets = [0u32; DIRECTION_COUNT];

        let mut width = 0;
        let mut depth = 0;
        let mut culled_index_count = 0;
        let mut next_offset = 0u32;

        for direction in direction_visit_order() {
            let k = direction.index();
            let count = mesh.face_counts[k];

            face_offsets[k] = next_offset;

            let old_vertex_base = mesh.face_offsets[k] as usize * VERTICES_PER_FACE;
            let new_vertex_base = next_offset as usize * VERTICES_PER_FACE;
            let vertices_len = count as usize * VERTICES_PER_FACE;

            for i in 0..vertices_len {
                let source = old_vertex_base + i;
                let target = (new_vertex_base + i) * FLOATS_PER_VERTEX;
                let position = mesh.vertices[source];

                width = width.max(position.x.max(0) as u32);
                depth = depth.max(position.z.max(0) as u32);

                let attributes = pack_vertex_attributes(
                    colors[source],
                    direction as u8,
                    mesh.ambient_occlusion[source],
                );

                vertices[target] = position.x as f32 / UNIT_SCALE;
                vertices[target + 1] = position.y as f32 / UNIT_SCALE;
                vertices[target + 2] = position.z as f32 / UNIT_SCALE;
                vertices[target + 3] = f32::from_bits(attributes);
            }

            let old_index_base = mesh.face_offsets[k] as usize * INDICES_PER_FACE;
            let new_index_base = next_offset as usize * INDICES_PER_FACE;
            let indices_len = count as usize * INDICES_PER_FACE;

            for i in 0..indices_len {
                let index = mesh.indices[old_index_base + i];
                indices[new_index_base + i] =
                    index - old_vertex_base as u32 + new_vertex_base as u32;
            }

            if !CULLED_DIRECTIONS[k] {
                culled_index_count += indices_len;
            }

            next_offset += count;
        }

        let render_mesh = Self {
            name: mesh.name.clone(),
            vertices,
            indices,
            face_offsets,
            face_counts: mesh.face_counts,
            culled_index_count,
            complete_index_count: mesh.indices.len(),
            width,
            depth,
        };

        log::debug!(
            "Packed render mesh '{}': {} vertices, {}/{} indices shown/complete, footprint {}x{}",
            render_mesh.name,
            vertex_count,
            render_mesh.culled_index_count,
            render_mesh.complete_index_count,
            render_mesh.width,
            render_mesh.depth
        );

        Ok(render_mesh)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    /// Raw attribute word of vertex `index`.
    #[must_use]
    pub fn vertex_attributes(&self, index: usize) -> u32 {
        self.vertices[index * FLOATS_PER_VERTEX + 3].to_bits()
    }

    /// Footprint edge in whole tiles of [`UNIT_SCALE`] voxels, never less than one.
    #[must_use]
    pub fn footprint_tiles(&self) -> u32 {
        let voxels_per_tile = UNIT_SCALE as u32;
        self.width.max(self.depth).div_ceil(voxels_per_tile).max(1)
    }
}
