use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use glam::IVec3;

use crate::{Error, Result, Rgba, VoxelGrid};

/// Parses a point cloud with one voxel per line: `x y z color`.
///
/// Colors are `#RRGGBB`, `#RRGGBBAA` or a decimal RGBA8888 value. Blank lines and lines starting
/// with `#` are skipped. The resulting grid is shifted so its minimum corner is the origin.
pub fn read_point_cloud<R: BufRead>(reader: R) -> Result<VoxelGrid> {
    let mut voxels = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let invalid = |reason: String| Error::InvalidPointCloud {
            line: number + 1,
            reason,
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [x, y, z, color] = tokens[..] else {
            return Err(invalid(format!(
                "expected `x y z color`, found {} fields",
                tokens.len()
            )));
        };

        let mut position = IVec3::ZERO;
        for (axis, token) in [x, y, z].into_iter().enumerate() {
            position[axis] = token
                .parse()
                .map_err(|_| invalid(format!("invalid coordinate `{token}`")))?;
        }

        let color = Rgba::parse(color).ok_or_else(|| invalid(format!("invalid color `{color}`")))?;

        voxels.push((position, color));
    }

    let grid = VoxelGrid::from_voxels(voxels);

    log::debug!(
        "Parsed point cloud: {} voxels in {:?}",
        grid.voxel_count(),
        grid.size()
    );

    Ok(grid)
}

pub fn load_point_cloud<P: AsRef<Path>>(path: P) -> Result<VoxelGrid> {
    let path = path.as_ref();
    log::debug!("Parsing point cloud: {}", path.display());

    read_point_cloud(BufReader::new(File::open(path)?))
}
