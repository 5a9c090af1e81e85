use std::path::Path;

use voxpack::{
    ColorPalette, Direction, RenderMesh,
    io::{ByteSize, export_voxel_mesh_to_obj, import_voxel_mesh},
};

fn run(input: &Path, output: &Path) -> voxpack::Result<()> {
    let mut mesh = import_voxel_mesh(input)?;
    log::info!(
        "Loaded '{}': {} voxels, {} faces, {} vertices, {} triangles",
        mesh.name,
        mesh.voxel_count,
        mesh.face_count(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    export_voxel_mesh_to_obj(output, &mesh)?;

    let mut palette = ColorPalette::new();
    mesh.apply_palette(&mut palette);
    let packed = RenderMesh::pack(&mesh)?;

    for direction in Direction::ALL {
        log::info!(
            "  {:>6}: {} faces",
            direction.name(),
            packed.face_counts[direction.index()]
        );
    }
    log::info!(
        "Render mesh: {} culled / {} complete indices, {}x{} voxels, {} tile footprint, {} colors",
        packed.culled_index_count,
        packed.complete_index_count,
        packed.width,
        packed.depth,
        packed.footprint_tiles(),
        palette.len() - 1
    );
    log::info!(
        "GPU buffers: {} vertex, {} index",
        ByteSize(packed.vertices.len() * size_of::<f32>()),
        ByteSize(packed.indices.len() * size_of::<u32>())
    );
    log::info!("Wrote {}", output.display());

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[cfg(feature = "tracy")]
    tracy_client::Client::start();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input.vxm> <output.obj>", args[0]);
        std::process::exit(1);
    }

    if let Err(err) = run(Path::new(&args[1]), Path::new(&args[2])) {
        log::error!("{}: {err}", args[1]);
        std::process::exit(1);
    }
}
