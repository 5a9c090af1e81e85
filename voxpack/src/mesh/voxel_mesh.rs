use std::ops::Range;

use glam::IVec3;

use crate::{ColorPalette, DIRECTION_COUNT, Direction, Error, Result, Rgba};

/// Vertices per quad.
pub const VERTICES_PER_FACE: usize = 4;
/// Indices per quad (two triangles).
pub const INDICES_PER_FACE: usize = 6;

/// Per-vertex colors of a [`VoxelMesh`].
///
/// Meshes are built and loaded with disk colors and switch to palette indices once,
/// through [`VoxelMesh::apply_palette`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexColors {
    Rgba(Vec<Rgba>),
    Palette(Vec<u8>),
}

impl VertexColors {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            VertexColors::Rgba(colors) => colors.len(),
            VertexColors::Palette(indices) => indices.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A greedy-meshed voxel model, stored face-ordered by [`Direction`].
///
/// `face_offsets` and `face_counts` are measured in faces: the faces of direction `k`
/// occupy vertices `4 * face_offsets[k]..` and indices `6 * face_offsets[k]..`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelMesh {
    pub name: String,
    pub voxel_count: u32,
    pub vertices: Vec<IVec3>,
    pub indices: Vec<u32>,
    pub face_offsets: [u32; DIRECTION_COUNT],
    pub face_counts: [u32; DIRECTION_COUNT],
    pub colors: VertexColors,
    pub ambient_occlusion: Vec<u8>,
}

impl VoxelMesh {
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            voxel_count: 0,
            vertices: Vec::new(),
            indices: Vec::new(),
            face_offsets: [0; DIRECTION_COUNT],
            face_counts: [0; DIRECTION_COUNT],
            colors: VertexColors::Rgba(Vec::new()),
            ambient_occlusion: Vec::new(),
        }
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.face_counts.iter().map(|count| *count as usize).sum()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[must_use]
    pub fn vertex_range(&self, direction: Direction) -> Range<usize> {
        let start = self.face_offsets[direction.index()] as usize * VERTICES_PER_FACE;
        start..start + self.face_counts[direction.index()] as usize * VERTICES_PER_FACE
    }

    #[must_use]
    pub fn index_range(&self, direction: Direction) -> Range<usize> {
        let start = self.face_offsets[direction.index()] as usize * INDICES_PER_FACE;
        start..start + self.face_counts[direction.index()] as usize * INDICES_PER_FACE
    }

    #[must_use]
    pub fn is_palettized(&self) -> bool {
        matches!(self.colors, VertexColors::Palette(_))
    }

    /// Remaps disk colors to palette indices. Calling it on an already mapped mesh is a no-op.
    pub fn apply_palette(&mut self, palette: &mut ColorPalette) {
        if let VertexColors::Rgba(colors) = &self.colors {
            let indices = colors
                .iter()
                .map(|color| palette.color_palette_index(*color))
                .collect();
            self.colors = VertexColors::Palette(indices);
        }
    }

    /// Checks the face layout invariants and that every index stays inside its direction's vertices.
    pub fn validate(&self) -> Result<()> {
        let mut expected_offset = 0u32;
        for direction in Direction::ALL {
            let k = direction.index();
            if self.face_offsets[k] != expected_offset {
                return Err(self.invalid(format!(
                    "{direction} faces start at {} instead of {expected_offset}",
                    self.face_offsets[k]
                )));
            }
            expected_offset = expected_offset
                .checked_add(self.face_counts[k])
                .ok_or_else(|| self.invalid("face counts overflow"))?;
        }

        let faces = self.face_count();

        if self.vertices.len() != faces * VERTICES_PER_FACE {
            return Err(self.invalid(format!(
                "{} vertices for {faces} faces",
                self.vertices.len()
            )));
        }

        if self.indices.len() != faces * INDICES_PER_FACE {
            return Err(self.invalid(format!(
                "{} indices for {faces} faces",
                self.indices.len()
            )));
        }

        if self.colors.len() != self.vertices.len()
            || self.ambient_occlusion.len() != self.vertices.len()
        {
            return Err(self.invalid("per-vertex attribute count mismatch"));
        }

        for direction in Direction::ALL {
            let vertices = self.vertex_range(direction);
            if let Some(index) = self.indices[self.index_range(direction)]
                .iter()
                .find(|index| !vertices.contains(&(**index as usize)))
            {
                return Err(self.invalid(format!(
                    "{direction} index {index} outside of vertices {vertices:?}"
                )));
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> Error {
        Error::InvalidMesh {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }
}
