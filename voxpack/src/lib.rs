//! Voxel mesh packaging and instance culling.
//!
//! ```rust
//! use glam::{IVec3, UVec3};
//! use voxpack::{ColorPalette, GreedyMesher, RenderMesh, Rgba, VoxelGrid};
//!
//! let mut grid = VoxelGrid::new(UVec3::splat(2));
//! grid.fill_box(IVec3::ZERO, IVec3::ONE, Rgba::new(180, 90, 40, 255));
//!
//! let mut mesh = GreedyMesher::default().build("crate", &grid);
//! assert_eq!(mesh.face_count(), 6);
//!
//! mesh.apply_palette(&mut ColorPalette::new());
//! let packed = RenderMesh::pack(&mesh).unwrap();
//! assert_eq!(packed.complete_index_count, 36);
//! ```

pub mod core;
mod error;
pub mod instance;
pub mod io;
pub mod mesh;
pub mod spatial;

pub use crate::core::{AxisMap, ColorPalette, DIRECTION_COUNT, Direction, PALETTE_SIZE, Rgba};
pub use error::{Error, Result};
pub use instance::{InstanceId, InstanceSet, pack_instance_transform};
pub use mesh::{GreedyMesher, MesherConfig, RenderMesh, VertexColors, VoxelGrid, VoxelMesh};
pub use spatial::{
    CullCamera, CullUpdateGate, CullUpdatePolicy, CullVolume, CullVolumeId, CullingQuadTree,
    CullingSystem, QuadTreeConfig,
};
