mod face;
mod greedy;
mod grid;
mod render_mesh;
mod voxel_mesh;

pub use face::{Face, GROUND_CONTACT_AO, MAX_AO, face_ambient_occlusion};
pub use greedy::{GreedyMesher, MesherConfig};
pub use grid::VoxelGrid;
pub use render_mesh::{
    CULLED_DIRECTIONS, FLOATS_PER_VERTEX, RenderMesh, UNIT_SCALE, direction_visit_order,
    pack_vertex_attributes, unpack_vertex_attributes,
};
pub use voxel_mesh::{INDICES_PER_FACE, VERTICES_PER_FACE, VertexColors, VoxelMesh};
