use glam::{IVec3, UVec3};

use crate::{DIRECTION_COUNT, Direction, Rgba};

use super::{Face, VertexColors, VoxelGrid, VoxelMesh, face::face_ambient_occlusion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MesherConfig {
    /// Darken the low corners of `Left`/`Back` faces of voxels standing on `y == 0`,
    /// unless the face lies on the grid boundary.
    pub ground_contact_ao: bool,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            ground_contact_ao: true,
        }
    }
}

/// Owned per-direction working buffer. Merging claims faces by taking them out.
struct FaceBuffer {
    size: UVec3,
    faces: Vec<Option<Face>>,
}

impl FaceBuffer {
    fn new(size: UVec3) -> Self {
        Self {
            size,
            faces: vec![None; size.x as usize * size.y as usize * size.z as usize],
        }
    }

    #[inline(always)]
    fn index(&self, position: IVec3) -> Option<usize> {
        if position.cmplt(IVec3::ZERO).any() || position.as_uvec3().cmpge(self.size).any() {
            return None;
        }

        let p = position.as_uvec3();
        Some(
            p.x as usize
                + self.size.x as usize * (p.y as usize + self.size.y as usize * p.z as usize),
        )
    }

    fn clear(&mut self) {
        self.faces.fill(None);
    }

    fn put(&mut self, face: Face) {
        if let Some(index) = self.index(face.origin) {
            self.faces[index] = Some(face);
        }
    }

    #[inline(always)]
    fn get(&self, position: IVec3) -> Option<&Face> {
        self.index(position).and_then(|index| self.faces[index].as_ref())
    }

    #[inline(always)]
    fn is_compatible(&self, position: IVec3, face: &Face) -> bool {
        self.get(position)
            .is_some_and(|other| other.is_merge_compatible(face))
    }

    fn claim(&mut self, position: IVec3) {
        if let Some(index) = self.index(position) {
            self.faces[index] = None;
        }
    }
}

/// Converts a [`VoxelGrid`] into a greedy-merged [`VoxelMesh`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyMesher {
    config: MesherConfig,
}

impl GreedyMesher {
    #[must_use]
    pub const fn new(config: MesherConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &MesherConfig {
        &self.config
    }

    pub fn build(&self, name: &str, grid: &VoxelGrid) -> VoxelMesh {
        #[cfg(feature = "tracy")]
        let _span = tracy_client::span!("GreedyMesher::build");

        let mut merged: [Vec<Face>; DIRECTION_COUNT] = Default::default();
        let mut buffer = FaceBuffer::new(grid.size());
        let mut exposed = 0;

        for direction in Direction::ALL {
            buffer.clear();
            exposed += self.scan_exposed(grid, direction, &mut buffer);
            merge_faces(&mut buffer, direction, &mut merged[direction.index()]);
        }

        let mesh = emit_mesh(name, grid.voxel_count() as u32, &merged);

        log::debug!(
            "Built voxel mesh '{}': {} voxels, {} exposed faces merged into {} quads",
            name,
            mesh.voxel_count,
            exposed,
            mesh.face_count()
        );

        mesh
    }

    /// Fills `buffer` with one unit face per solid voxel whose `direction` neighbour is empty.
    fn scan_exposed(&self, grid: &VoxelGrid, direction: Direction, buffer: &mut FaceBuffer) -> usize {
        #[cfg(feature = "tracy")]
        let _span = tracy_client::span!("GreedyMesher::scan_exposed");

        let size = grid.size().as_ivec3();
        let normal = direction.normal();
        let mut count = 0;

        for x in 0..size.x {
            for y in 0..size.y {
                for z in 0..size.z {
                    let position = IVec3::new(x, y, z);

                    let Some(color) = grid.get(position) else {
                        continue;
                    };

                    if grid.is_solid(position + normal) {
                        continue;
                    }

                    let ao = face_ambient_occlusion(
                        grid,
                        position,
                        direction,
                        self.config.ground_contact_ao,
                    );
                    buffer.put(Face::unit(direction, position, color, ao));
                    count += 1;
                }
            }
        }

        count
    }
}

/// Greedily merges the faces in `buffer` into maximal-area rectangles, appending them to `out`.
fn merge_faces(buffer: &mut FaceBuffer, direction: Direction, out: &mut Vec<Face>) {
    #[cfg(feature = "tracy")]
    let _span = tracy_client::span!("merge_faces");

    let size = buffer.size.as_ivec3();
    let u = direction.unit_u();
    let v = direction.unit_v();

    for x in 0..size.x {
        for y in 0..size.y {
            for z in 0..size.z {
                let origin = IVec3::new(x, y, z);

                let Some(face) = buffer.get(origin).copied() else {
                    continue;
                };

                let mut max_width = 1;
                while buffer.is_compatible(origin + u * max_width, &face) {
                    max_width += 1;
                }

                let mut best_width = 1;
                let mut best_height = 1;
                let mut best_area = 0;
                // column heights may only shrink as the rectangle widens
                let mut height_limit = i32::MAX;

                for width in 0..max_width {
                    let column = origin + u * width;

                    let mut height = 1;
                    while height < height_limit && buffer.is_compatible(column + v * height, &face)
                    {
                        height += 1;
                    }
                    height_limit = height;

                    let area = (width + 1) * height;
                    if area > best_area {
                        best_area = area;
                        best_width = width + 1;
                        best_height = height;
                    }
                }

                for i in 0..best_width {
                    for j in 0..best_height {
                        buffer.claim(origin + u * i + v * j);
                    }
                }

                out.push(Face {
                    du: best_width as u32,
                    dv: best_height as u32,
                    ..face
                });
            }
        }
    }
}

fn emit_mesh(name: &str, voxel_count: u32, merged: &[Vec<Face>; DIRECTION_COUNT]) -> VoxelMesh {
    let total: usize = merged.iter().map(Vec::len).sum();

    let mut mesh = VoxelMesh::empty(name);
    mesh.voxel_count = voxel_count;
    mesh.vertices.reserve(total * 4);
    mesh.indices.reserve(total * 6);
    mesh.ambient_occlusion.reserve(total * 4);

    let mut colors = Vec::with_capacity(total * 4);
    let mut offset = 0;

    for direction in Direction::ALL {
        let faces = &merged[direction.index()];

        mesh.face_offsets[direction.index()] = offset;
        mesh.face_counts[direction.index()] = faces.len() as u32;
        offset += faces.len() as u32;

        for face in faces {
            emit_quad(&mut mesh, &mut colors, face);
        }
    }

    mesh.colors = VertexColors::Rgba(colors);

    mesh
}

/// Appends one quad wound clockwise seen from outside the face.
fn emit_quad(mesh: &mut VoxelMesh, colors: &mut Vec<Rgba>, face: &Face) {
    let order: [usize; 4] = if face.direction.axes().reversed {
        [0, 3, 2, 1]
    } else {
        [0, 1, 2, 3]
    };

    let corners = face.corners();
    let base = mesh.vertices.len() as u32;

    for corner in order {
        mesh.vertices.push(corners[corner]);
        mesh.ambient_occlusion.push(face.ao[corner]);
        colors.push(face.color);
    }

    let ao = order.map(|corner| face.ao[corner]);

    // split along the diagonal that keeps interpolated AO symmetric
    if ao[0] + ao[2] > ao[1] + ao[3] {
        mesh.indices
            .extend([base + 1, base + 2, base + 3, base + 3, base, base + 1]);
    } else {
        mesh.indices
            .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }
}
