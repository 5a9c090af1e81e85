use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use voxpack::{
    GreedyMesher,
    VoxelGrid,
    io::{
        ByteSize, consts::PLY_EXTENSION, export_voxel_mesh, load_ply, load_point_cloud,
        packaged_mesh_path,
    },
};

struct Packaged {
    output: PathBuf,
    vertices: usize,
    triangles: usize,
    bytes: u64,
}

/// MagicaVoxel `.ply` exports, or `x y z color` text for anything else.
fn load_grid(input: &Path) -> voxpack::Result<VoxelGrid> {
    if input.extension().is_some_and(|ext| ext == PLY_EXTENSION) {
        load_ply(input)
    } else {
        load_point_cloud(input)
    }
}

fn package(mesher: &GreedyMesher, input: &Path, output_dir: &Path) -> voxpack::Result<Packaged> {
    let name = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());

    let grid = load_grid(input)?;
    let mesh = mesher.build(&name, &grid);

    let output = packaged_mesh_path(output_dir, input);
    export_voxel_mesh(&output, &mesh)?;

    Ok(Packaged {
        bytes: std::fs::metadata(&output)?.len(),
        output,
        vertices: mesh.vertex_count(),
        triangles: mesh.triangle_count(),
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[cfg(feature = "tracy")]
    tracy_client::Client::start();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <output_dir> <input.ply>...", args[0]);
        std::process::exit(1);
    }

    let output_dir = PathBuf::from(&args[1]);
    let inputs: Vec<PathBuf> = args[2..].iter().map(PathBuf::from).collect();

    if let Err(err) = std::fs::create_dir_all(&output_dir) {
        log::error!("Cannot create {}: {err}", output_dir.display());
        std::process::exit(1);
    }

    let mesher = GreedyMesher::default();

    let pb = ProgressBar::new(inputs.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{bar:40.green/blue}] {pos}/{len} models ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏"));
    }
    pb.set_message("Packaging");

    let results: Vec<(&PathBuf, voxpack::Result<Packaged>)> = inputs
        .par_iter()
        .map(|input| {
            let result = package(&mesher, input, &output_dir);
            pb.inc(1);
            (input, result)
        })
        .collect();

    pb.finish_with_message("Done");

    let mut failures = 0;
    for (input, result) in results {
        match result {
            Ok(packaged) => log::info!(
                "{} -> {}: {} vertices, {} triangles ({})",
                input.display(),
                packaged.output.display(),
                packaged.vertices,
                packaged.triangles,
                ByteSize(packaged.bytes as usize)
            ),
            Err(err) => {
                log::error!("{}: {err}", input.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
