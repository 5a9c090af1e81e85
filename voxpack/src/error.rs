//! Errors raised by mesh loading, render packing and the culling quadtree.

use thiserror::Error;

use crate::spatial::CullVolumeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A line was missing or malformed where mesh data was expected.
    #[error("malformed voxel mesh at line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("voxel mesh section `$ {0}` not found")]
    MissingSection(&'static str),

    #[error("voxel mesh '{name}' is inconsistent: {reason}")]
    InvalidMesh { name: String, reason: String },

    #[error("point cloud line {line}: {reason}")]
    InvalidPointCloud { line: usize, reason: String },

    /// The requested footprint leaves the world square.
    #[error("cull volume ({x}, {z}, {w}) is outside of the {world_size}x{world_size} world")]
    VolumeOutOfBounds {
        x: i32,
        z: i32,
        w: u32,
        world_size: u32,
    },

    #[error("unknown cull volume {0:?}")]
    UnknownVolume(CullVolumeId),

    #[error("unknown instance {0}")]
    UnknownInstance(u32),

    #[error("vertex colors must be palette mapped before packing")]
    ColorsNotPalettized,

    #[error("palette mapped vertex colors cannot be written to a voxel mesh file")]
    ColorsPalettized,
}

impl Error {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        Error::Format {
            line,
            reason: reason.into(),
        }
    }
}
