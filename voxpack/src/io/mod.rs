pub mod consts;
mod export;
mod import;
mod library;
mod ply;
mod point_cloud;

pub use export::{
    ByteSize, export_voxel_mesh, export_voxel_mesh_to_obj, write_voxel_mesh, write_voxel_mesh_obj,
};
pub use import::{import_voxel_mesh, read_voxel_mesh};
pub use library::{load_mesh_library, packaged_mesh_path};
pub use ply::{load_ply, read_ply};
pub use point_cloud::{load_point_cloud, read_point_cloud};
