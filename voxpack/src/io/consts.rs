/// Prefix of every section marker line.
pub const SECTION_MARKER: &str = "$ ";

pub const VOXEL_COUNT: &str = "voxel_count";
pub const VERTEX_COUNT: &str = "vertex_count";
pub const TRIANGLE_COUNT: &str = "triangle_count";
pub const FACE_OFFSETS: &str = "face_offsets";
pub const FACE_COUNTS: &str = "face_counts";
pub const VERTICES: &str = "vertices";
pub const INDICES: &str = "indices";
pub const COLORS: &str = "colors";
pub const AMBIENT_OCCLUSION: &str = "ambient_occlusion";

pub const VXM_EXTENSION: &str = "vxm";
pub const PLY_EXTENSION: &str = "ply";
