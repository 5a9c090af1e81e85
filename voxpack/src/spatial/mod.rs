mod aabb2d;
mod cull_volume;
pub(crate) mod frustum;
mod gate;
mod quadtree;

pub use aabb2d::Aabb2d;
pub use cull_volume::{CullVolume, CullVolumeId, snap_footprint};
pub use frustum::{box_corners, outside_view};
pub use gate::{CullCamera, CullUpdateGate, CullUpdatePolicy, CullingSystem};
pub use quadtree::{CullingQuadTree, QuadTreeConfig};
