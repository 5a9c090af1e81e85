use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use glam::{IVec3, UVec3};

use crate::{Error, Result, Rgba, VoxelGrid};

/// Upper bound on voxels reserved up front from the declared vertex count.
const MAX_RESERVED: usize = 1 << 16;

/// Parses an ASCII `.ply` point cloud as exported by MagicaVoxel.
///
/// The header is scanned for `element vertex <count>` and `end_header`. Each of the following
/// `count` lines is `x y z red green blue`; the file's z axis is up, so it becomes the grid's y.
/// The grid bounds always include the origin, so positive-only models keep their offset.
pub fn read_ply<R: BufRead>(reader: R) -> Result<VoxelGrid> {
    let mut lines = reader.lines();
    let mut number = 0;

    let invalid = |line: usize, reason: String| Error::InvalidPointCloud { line, reason };

    let mut count = None;
    loop {
        let Some(line) = lines.next() else {
            return Err(invalid(number + 1, "missing `end_header`".to_string()));
        };
        let line = line?;
        number += 1;

        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens[..] {
            ["element", "vertex", value, ..] => {
                let value: usize = value
                    .parse()
                    .map_err(|_| invalid(number, format!("invalid vertex count `{value}`")))?;
                count = Some(value);
            }
            ["end_header", ..] => break,
            _ => {}
        }
    }

    let count = count.ok_or_else(|| invalid(number, "missing `element vertex`".to_string()))?;

    let mut voxels = Vec::with_capacity(count.min(MAX_RESERVED));
    let mut min = IVec3::ZERO;
    let mut max = IVec3::ZERO;

    for _ in 0..count {
        let Some(line) = lines.next() else {
            return Err(invalid(
                number + 1,
                format!("expected {count} vertices, found {}", voxels.len()),
            ));
        };
        let line = line?;
        number += 1;

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [x, y, z, red, green, blue, ..] = tokens[..] else {
            return Err(invalid(
                number,
                format!("expected `x y z red green blue`, found {} fields", tokens.len()),
            ));
        };

        let mut coordinates = [0i32; 3];
        for (coordinate, token) in coordinates.iter_mut().zip([x, y, z]) {
            *coordinate = token
                .parse()
                .map_err(|_| invalid(number, format!("invalid coordinate `{token}`")))?;
        }
        let [x, y, z] = coordinates;
        let position = IVec3::new(x, z, y);

        let mut channels = [0u8; 3];
        for (channel, token) in channels.iter_mut().zip([red, green, blue]) {
            let value: u32 = token
                .parse()
                .map_err(|_| invalid(number, format!("invalid color channel `{token}`")))?;
            *channel = value.min(u8::MAX as u32) as u8;
        }
        let [red, green, blue] = channels;

        min = min.min(position);
        max = max.max(position);
        voxels.push((position, Rgba::new(red, green, blue, u8::MAX)));
    }

    let mut grid = if voxels.is_empty() {
        VoxelGrid::new(UVec3::ZERO)
    } else {
        VoxelGrid::new((max - min + IVec3::ONE).as_uvec3())
    };
    for (position, color) in voxels {
        grid.set(position - min, Some(color));
    }

    log::debug!(
        "Parsed ply point cloud: {} voxels in {:?}",
        grid.voxel_count(),
        grid.size()
    );

    Ok(grid)
}

pub fn load_ply<P: AsRef<Path>>(path: P) -> Result<VoxelGrid> {
    let path = path.as_ref();
    log::debug!("Parsing ply point cloud: {}", path.display());

    read_ply(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ply
format ascii 1.0
comment generated by MagicaVoxel
element vertex 3
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
end_header
";

    #[test]
    fn test_parse() {
        let text = format!("{HEADER}-1 0 0 255 0 0\n0 0 0 0 255 0\n0 2 1 10 20 300\n");
        let grid = read_ply(text.as_bytes()).unwrap();

        // y and z swap, and the origin stays inside the bounds
        assert_eq!(grid.size(), UVec3::new(2, 2, 3));
        assert_eq!(grid.voxel_count(), 3);
        assert_eq!(grid.get(IVec3::new(0, 0, 0)), Some(Rgba::new(255, 0, 0, 255)));
        assert_eq!(grid.get(IVec3::new(1, 0, 0)), Some(Rgba::new(0, 255, 0, 255)));
        assert_eq!(grid.get(IVec3::new(1, 1, 2)), Some(Rgba::new(10, 20, 255, 255)));
    }

    #[test]
    fn test_positive_models_keep_offset() {
        let text = HEADER.replace("element vertex 3", "element vertex 1") + "2 3 1 9 9 9\n";
        let grid = read_ply(text.as_bytes()).unwrap();

        assert_eq!(grid.size(), UVec3::new(3, 2, 4));
        assert!(grid.is_solid(IVec3::new(2, 1, 3)));
    }

    #[test]
    fn test_empty_cloud() {
        let text = HEADER.replace("element vertex 3", "element vertex 0");
        let grid = read_ply(text.as_bytes()).unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn test_missing_header_parts() {
        let text = HEADER.replace("end_header\n", "");
        assert!(matches!(
            read_ply(text.as_bytes()),
            Err(Error::InvalidPointCloud { .. })
        ));

        let text = HEADER.replace("element vertex 3\n", "");
        assert!(matches!(
            read_ply(text.as_bytes()),
            Err(Error::InvalidPointCloud { line: 10, .. })
        ));
    }

    #[test]
    fn test_truncated_body() {
        let text = HEADER.replace("element vertex 3", "element vertex 99999999999999") + "0 0 0 1 1 1\n";
        match read_ply(text.as_bytes()) {
            Err(Error::InvalidPointCloud { line, .. }) => assert_eq!(line, 13),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_vertex_line() {
        let text = format!("{HEADER}0 0 0 1 1 1\n0 0 1 1\n0 0 2 1 1 1\n");
        match read_ply(text.as_bytes()) {
            Err(Error::InvalidPointCloud { line, .. }) => assert_eq!(line, 13),
            other => panic!("unexpected {other:?}"),
        }
    }
}
