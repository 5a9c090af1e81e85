use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use glam::IVec3;

use crate::{
    DIRECTION_COUNT, Error, Result, Rgba,
    mesh::{MAX_AO, VertexColors, VoxelMesh},
};

use super::consts::{
    AMBIENT_OCCLUSION, COLORS, FACE_COUNTS, FACE_OFFSETS, INDICES, SECTION_MARKER, TRIANGLE_COUNT,
    VERTEX_COUNT, VERTICES, VOXEL_COUNT,
};

/// Upper bound on elements reserved up front from counts declared in a file.
const MAX_RESERVED: usize = 1 << 16;

/// Line cursor that remembers the 1-based number of the last line read.
struct LineReader<R> {
    inner: R,
    line: usize,
    buffer: String,
}

impl<R: BufRead> LineReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            buffer: String::new(),
        }
    }

    fn next_line(&mut self) -> Result<Option<&str>> {
        self.buffer.clear();
        if self.inner.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        Ok(Some(self.buffer.trim()))
    }

    fn data_line(&mut self) -> Result<&str> {
        let line = self.line + 1;
        self.next_line()?
            .ok_or_else(|| Error::format(line, "unexpected end of file"))
    }

    /// Skips ahead past the `$ <label>` marker.
    fn seek_section(&mut self, label: &'static str) -> Result<()> {
        while let Some(line) = self.next_line()? {
            if line.strip_prefix(SECTION_MARKER.trim_end()).map(str::trim) == Some(label) {
                return Ok(());
            }
        }
        Err(Error::MissingSection(label))
    }

    fn values<T: FromStr, const N: usize>(&mut self) -> Result<[T; N]>
    where
        T: Copy + Default,
    {
        let line = self.line + 1;
        let text = self.data_line()?;

        let mut values = [T::default(); N];
        let mut tokens = text.split_whitespace();
        for value in values.iter_mut() {
            let token = tokens
                .next()
                .ok_or_else(|| Error::format(line, format!("expected {N} values")))?;
            *value = token
                .parse()
                .map_err(|_| Error::format(line, format!("invalid number `{token}`")))?;
        }

        if tokens.next().is_some() {
            return Err(Error::format(line, format!("expected {N} values")));
        }

        Ok(values)
    }

    fn value<T: FromStr + Copy + Default>(&mut self) -> Result<T> {
        let [value] = self.values::<T, 1>()?;
        Ok(value)
    }

    fn section_value<T: FromStr + Copy + Default>(&mut self, label: &'static str) -> Result<T> {
        self.seek_section(label)?;
        self.value()
    }
}

/// Reads a voxel mesh in the `.vxm` text layout. The mesh keeps the name stored in the file.
pub fn read_voxel_mesh<R: BufRead>(reader: R) -> Result<VoxelMesh> {
    #[cfg(feature = "tracy")]
    let _span = tracy_client::span!("read_voxel_mesh");

    let mut lines = LineReader::new(reader);

    let name = lines.data_line()?.to_string();
    let mut mesh = VoxelMesh::empty(name);

    mesh.voxel_count = lines.section_value(VOXEL_COUNT)?;
    let vertex_count: usize = lines.section_value(VERTEX_COUNT)?;
    let triangle_count: usize = lines.section_value(TRIANGLE_COUNT)?;
    let index_count = triangle_count.checked_mul(3).ok_or_else(|| {
        Error::format(lines.line, format!("triangle count {triangle_count} too large"))
    })?;

    lines.seek_section(FACE_OFFSETS)?;
    mesh.face_offsets = lines.values::<u32, DIRECTION_COUNT>()?;
    lines.seek_section(FACE_COUNTS)?;
    mesh.face_counts = lines.values::<u32, DIRECTION_COUNT>()?;

    lines.seek_section(VERTICES)?;
    mesh.vertices.reserve(vertex_count.min(MAX_RESERVED));
    for _ in 0..vertex_count {
        mesh.vertices
            .push(IVec3::from_array(lines.values::<i32, 3>()?));
    }

    lines.seek_section(INDICES)?;
    mesh.indices.reserve(index_count.min(MAX_RESERVED));
    for _ in 0..triangle_count {
        mesh.indices.extend(lines.values::<u32, 3>()?);
    }

    lines.seek_section(COLORS)?;
    let mut colors = Vec::with_capacity(vertex_count.min(MAX_RESERVED));
    for _ in 0..vertex_count {
        let color = {
            let text = lines.data_line()?;
            Rgba::parse(text)
                .filter(|_| !text.starts_with('#'))
                .ok_or_else(|| format!("invalid color `{text}`"))
        };
        colors.push(color.map_err(|reason| Error::format(lines.line, reason))?);
    }
    mesh.colors = VertexColors::Rgba(colors);

    lines.seek_section(AMBIENT_OCCLUSION)?;
    mesh.ambient_occlusion.reserve(vertex_count.min(MAX_RESERVED));
    for _ in 0..vertex_count {
        let ao: u8 = lines.value()?;
        if ao > MAX_AO {
            return Err(Error::format(
                lines.line,
                format!("ambient occlusion {ao} above {MAX_AO}"),
            ));
        }
        mesh.ambient_occlusion.push(ao);
    }

    mesh.validate()?;

    log::debug!(
        "Read voxel mesh '{}': {} vertices, {} triangles",
        mesh.name,
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    Ok(mesh)
}

/// Loads a `.vxm` file. The mesh is named after the file stem.
pub fn import_voxel_mesh<P: AsRef<Path>>(path: P) -> Result<VoxelMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let mut mesh = read_voxel_mesh(BufReader::new(file))?;
    if let Some(stem) = path.file_stem() {
        mesh.name = stem.to_string_lossy().into_owned();
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "quad
$ voxel_count
1
$ vertex_count
4
$ triangle_count
2
$ face_offsets
0 0 1 1 1 1
$ face_counts
0 1 0 0 0 0
$ vertices
0 1 0
1 1 0
1 1 1
0 1 1
$ indices
0 1 2
2 3 0
$ colors
-1
-1
255
4278190335
$ ambient_occlusion
0
1
2
3
";

    #[test]
    fn test_read_quad() {
        let mesh = read_voxel_mesh(QUAD.as_bytes()).unwrap();
        assert_eq!(mesh.name, "quad");
        assert_eq!(mesh.voxel_count, 1);
        assert_eq!(mesh.face_counts, [0, 1, 0, 0, 0, 0]);
        assert_eq!(mesh.vertices[2], IVec3::new(1, 1, 1));
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 3, 0]);
        assert_eq!(
            mesh.colors,
            VertexColors::Rgba(vec![
                Rgba::from_raw(u32::MAX),
                Rgba::from_raw(u32::MAX),
                Rgba::from_raw(255),
                Rgba::from_raw(0xFF00_00FF),
            ])
        );
        assert_eq!(mesh.ambient_occlusion, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_extra_lines_before_markers_are_skipped() {
        let text = QUAD
            .replace("$ vertices\n", "comment\n\n$ vertices\n")
            .replace("$ colors\n", "anything\n$ colors\n");
        assert!(read_voxel_mesh(text.as_bytes()).is_ok());
    }

    #[test]
    fn test_missing_section() {
        let text = QUAD.replace("$ indices", "$ idx");
        assert!(matches!(
            read_voxel_mesh(text.as_bytes()),
            Err(Error::MissingSection("indices"))
        ));
    }

    #[test]
    fn test_truncated_file() {
        let text = &QUAD[..QUAD.find("0 1 1\n$ indices").unwrap()];
        assert!(matches!(
            read_voxel_mesh(text.as_bytes()),
            Err(Error::Format { .. })
        ));
    }

    #[test]
    fn test_huge_declared_counts_fail_cleanly() {
        let text = QUAD.replace("$ vertex_count\n4\n", "$ vertex_count\n99999999999999999\n");
        assert!(matches!(
            read_voxel_mesh(text.as_bytes()),
            Err(Error::Format { .. })
        ));

        let text = QUAD.replace(
            "$ triangle_count\n2\n",
            "$ triangle_count\n18446744073709551615\n",
        );
        match read_voxel_mesh(text.as_bytes()) {
            Err(Error::Format { line, .. }) => assert_eq!(line, 7),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_number_reports_line() {
        let text = QUAD.replace("1 1 1\n", "1 x 1\n");
        match read_voxel_mesh(text.as_bytes()) {
            Err(Error::Format { line, .. }) => assert_eq!(line, 15),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_ao() {
        let text = QUAD.replace("\n3\n", "\n4\n");
        assert!(matches!(
            read_voxel_mesh(text.as_bytes()),
            Err(Error::Format { .. })
        ));
    }

    #[test]
    fn test_inconsistent_counts() {
        let text = QUAD.replace("0 1 0 0 0 0", "0 2 0 0 0 0");
        assert!(matches!(
            read_voxel_mesh(text.as_bytes()),
            Err(Error::InvalidMesh { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            read_voxel_mesh("".as_bytes()),
            Err(Error::Format { line: 1, .. })
        ));
    }
}
