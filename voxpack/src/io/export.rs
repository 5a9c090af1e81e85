use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    Direction, Error, Result,
    mesh::{UNIT_SCALE, VertexColors, VoxelMesh},
};

use super::consts::{
    AMBIENT_OCCLUSION, COLORS, FACE_COUNTS, FACE_OFFSETS, INDICES, SECTION_MARKER, TRIANGLE_COUNT,
    VERTEX_COUNT, VERTICES, VOXEL_COUNT,
};

/// Writes `mesh` in the `.vxm` text layout. Colors must still be disk colors.
pub fn write_voxel_mesh<W: Write>(writer: &mut W, mesh: &VoxelMesh) -> Result<()> {
    let VertexColors::Rgba(colors) = &mesh.colors else {
        return Err(Error::ColorsPalettized);
    };

    writeln!(writer, "{}", mesh.name)?;

    section(writer, VOXEL_COUNT)?;
    writeln!(writer, "{}", mesh.voxel_count)?;
    section(writer, VERTEX_COUNT)?;
    writeln!(writer, "{}", mesh.vertex_count())?;
    section(writer, TRIANGLE_COUNT)?;
    writeln!(writer, "{}", mesh.triangle_count())?;

    section(writer, FACE_OFFSETS)?;
    writeln!(writer, "{}", row(&mesh.face_offsets))?;
    section(writer, FACE_COUNTS)?;
    writeln!(writer, "{}", row(&mesh.face_counts))?;

    section(writer, VERTICES)?;
    for vertex in &mesh.vertices {
        writeln!(writer, "{} {} {}", vertex.x, vertex.y, vertex.z)?;
    }

    section(writer, INDICES)?;
    for triangle in mesh.indices.chunks_exact(3) {
        writeln!(writer, "{}", row(triangle))?;
    }

    section(writer, COLORS)?;
    for color in colors {
        writeln!(writer, "{}", color.raw() as i32)?;
    }

    section(writer, AMBIENT_OCCLUSION)?;
    for ao in &mesh.ambient_occlusion {
        writeln!(writer, "{ao}")?;
    }

    Ok(())
}

fn section<W: Write>(writer: &mut W, label: &str) -> std::io::Result<()> {
    writeln!(writer, "{SECTION_MARKER}{label}")
}

fn row(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn export_voxel_mesh<P: AsRef<Path>>(path: P, mesh: &VoxelMesh) -> Result<()> {
    #[cfg(feature = "tracy")]
    let _span = tracy_client::span!("export_voxel_mesh");

    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_voxel_mesh(&mut writer, mesh)?;
    writer.flush()?;

    log::debug!(
        "Exported voxel mesh '{}' to {}",
        mesh.name,
        path.as_ref().display()
    );

    Ok(())
}

/// Writes `mesh` as a Wavefront object with one normal per direction.
///
/// Vertices are scaled to world units and faces are wound counter-clockwise.
pub fn write_voxel_mesh_obj<W: Write>(writer: &mut W, mesh: &VoxelMesh) -> Result<()> {
    writeln!(writer, "o {}", mesh.name)?;

    let scale = 1.0 / UNIT_SCALE;
    for vertex in &mesh.vertices {
        let v = vertex.as_vec3() * scale;
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }

    for direction in Direction::ALL {
        let normal = direction.normal();
        writeln!(writer, "vn {} {} {}", normal.x, normal.y, normal.z)?;
    }

    for direction in Direction::ALL {
        let normal = direction.index() + 1;
        // mesh triangles wind clockwise, OBJ front faces are counter-clockwise
        for triangle in mesh.indices[mesh.index_range(direction)].chunks_exact(3) {
            writeln!(
                writer,
                "f {}//{normal} {}//{normal} {}//{normal}",
                triangle[0] + 1,
                triangle[2] + 1,
                triangle[1] + 1
            )?;
        }
    }

    Ok(())
}

pub fn export_voxel_mesh_to_obj<P: AsRef<Path>>(path: P, mesh: &VoxelMesh) -> Result<()> {
    mesh.validate()?;

    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_voxel_mesh_obj(&mut writer, mesh)?;
    writer.flush()?;

    Ok(())
}

pub struct ByteSize(pub usize);

impl std::fmt::Display for ByteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 < 1024 {
            write!(f, "{} B", self.0)
        } else if self.0 < 1024 * 1024 {
            write!(f, "{:.3} KB", self.0 as f64 / 1024.0)
        } else {
            write!(f, "{:.3} MB", self.0 as f64 / (1024.0 * 1024.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, UVec3};

    use crate::{
        ColorPalette, GreedyMesher, Rgba, VoxelGrid,
        io::{import_voxel_mesh, read_voxel_mesh},
    };

    use super::*;

    fn cube_mesh() -> VoxelMesh {
        let mut grid = VoxelGrid::new(UVec3::new(3, 3, 3));
        grid.fill_box(IVec3::ZERO, IVec3::new(1, 1, 1), Rgba::new(200, 10, 10, 255));
        grid.set(IVec3::new(2, 0, 0), Some(Rgba::new(10, 200, 10, 255)));
        GreedyMesher::default().build("cube", &grid)
    }

    #[test]
    fn test_round_trip() {
        let mesh = cube_mesh();
        let mut bytes = Vec::new();
        write_voxel_mesh(&mut bytes, &mesh).unwrap();

        let loaded = read_voxel_mesh(bytes.as_slice()).unwrap();
        assert_eq!(loaded, mesh);
    }

    #[test]
    fn test_layout() {
        let mesh = cube_mesh();
        let mut bytes = Vec::new();
        write_voxel_mesh(&mut bytes, &mesh).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "cube");
        assert_eq!(lines[1], "$ voxel_count");
        assert_eq!(lines[2], "9");
        assert_eq!(lines[7], "$ face_offsets");
        assert_eq!(lines[8].split(' ').count(), 6);
        assert_eq!(lines.len(), 15 + 3 * mesh.vertex_count() + mesh.triangle_count());
        assert!(text.ends_with('\n') && !text.contains('\r'));
    }

    #[test]
    fn test_colors_are_signed() {
        let mut mesh = VoxelMesh::empty("c");
        mesh.vertices = vec![IVec3::ZERO; 4];
        mesh.indices = vec![0, 1, 2, 0, 2, 3];
        mesh.face_offsets = [0, 1, 1, 1, 1, 1];
        mesh.face_counts = [1, 0, 0, 0, 0, 0];
        mesh.colors = VertexColors::Rgba(vec![Rgba::new(255, 255, 255, 255); 4]);
        mesh.ambient_occlusion = vec![0; 4];

        let mut bytes = Vec::new();
        write_voxel_mesh(&mut bytes, &mesh).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("$ colors\n-1\n-1\n-1\n-1\n"));
    }

    #[test]
    fn test_palettized_mesh_is_rejected() {
        let mut mesh = cube_mesh();
        mesh.apply_palette(&mut ColorPalette::new());
        assert!(matches!(
            write_voxel_mesh(&mut Vec::new(), &mesh),
            Err(Error::ColorsPalettized)
        ));
    }

    #[test]
    fn test_import_uses_file_stem() {
        let path = std::env::temp_dir().join(format!("voxpack-stem-{}.vxm", std::process::id()));
        export_voxel_mesh(&path, &cube_mesh()).unwrap();

        let mesh = import_voxel_mesh(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(mesh.name, format!("voxpack-stem-{}", std::process::id()));
        assert_eq!(mesh.vertices, cube_mesh().vertices);
    }

    #[test]
    fn test_obj() {
        let mesh = cube_mesh();
        let mut bytes = Vec::new();
        write_voxel_mesh_obj(&mut bytes, &mesh).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("o cube\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), mesh.vertex_count());
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 6);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), mesh.triangle_count());
        assert!(text.contains("vn 0 1 0\n"));
        assert!(!text.contains(" 0//"));
    }

    #[test]
    fn test_obj_faces_are_counter_clockwise() {
        let mut grid = VoxelGrid::new(UVec3::ONE);
        grid.set(IVec3::ZERO, Some(Rgba::new(1, 1, 1, 255)));
        let mesh = GreedyMesher::default().build("unit", &grid);

        let mut bytes = Vec::new();
        write_voxel_mesh_obj(&mut bytes, &mesh).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let positions: Vec<glam::Vec3> = text
            .lines()
            .filter_map(|line| line.strip_prefix("v "))
            .map(|line| {
                let v: Vec<f32> = line.split(' ').map(|c| c.parse().unwrap()).collect();
                glam::Vec3::new(v[0], v[1], v[2])
            })
            .collect();
        let normals: Vec<glam::Vec3> = text
            .lines()
            .filter_map(|line| line.strip_prefix("vn "))
            .map(|line| {
                let v: Vec<f32> = line.split(' ').map(|c| c.parse().unwrap()).collect();
                glam::Vec3::new(v[0], v[1], v[2])
            })
            .collect();

        for face in text.lines().filter_map(|line| line.strip_prefix("f ")) {
            let corners: Vec<(usize, usize)> = face
                .split(' ')
                .map(|corner| {
                    let (v, n) = corner.split_once("//").unwrap();
                    (v.parse::<usize>().unwrap() - 1, n.parse::<usize>().unwrap() - 1)
                })
                .collect();
            let [a, b, c] = [0, 1, 2].map(|i| positions[corners[i].0]);
            let winding = (b - a).cross(c - a);
            assert!(winding.dot(normals[corners[0].1]) > 0.0, "{face}");
        }
    }

    #[test]
    fn test_byte_size() {
        assert_eq!(ByteSize(10).to_string(), "10 B");
        assert_eq!(ByteSize(2048).to_string(), "2.000 KB");
        assert_eq!(ByteSize(3 * 1024 * 1024).to_string(), "3.000 MB");
    }
}
