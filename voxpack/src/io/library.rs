use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::{ColorPalette, Result, VoxelMesh};

use super::{consts::VXM_EXTENSION, import::import_voxel_mesh};

/// Loads every `.vxm` file in `directory`, remapping colors through `palette`.
///
/// Meshes are keyed by file stem. Files load in path order so palette indices are stable
/// across runs.
pub fn load_mesh_library<P: AsRef<Path>>(
    directory: P,
    palette: &mut ColorPalette,
) -> Result<FxHashMap<String, VoxelMesh>> {
    #[cfg(feature = "tracy")]
    let _span = tracy_client::span!("load_mesh_library");

    let directory = directory.as_ref();

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == VXM_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut library = FxHashMap::default();
    for path in paths {
        let mut mesh = import_voxel_mesh(&path)?;
        mesh.apply_palette(palette);

        if let Some(previous) = library.insert(mesh.name.clone(), mesh) {
            log::warn!("Mesh '{}' loaded twice, keeping the later file", previous.name);
        }
    }

    log::debug!(
        "Loaded {} meshes from {} ({} palette colors)",
        library.len(),
        directory.display(),
        palette.len()
    );

    Ok(library)
}

/// Output path of the packaged mesh for `input` inside `output_dir`.
pub fn packaged_mesh_path<P: AsRef<Path>>(output_dir: P, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    output_dir
        .as_ref()
        .join(format!("{stem}.{VXM_EXTENSION}"))
}
