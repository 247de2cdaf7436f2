use ngl_mesh::cache::{CachePolicy, CacheSettings};
use ngl_mesh::paths::SidecarResolver;
use ngl_mesh::read::ReaderSettings;

use crate::CommonArgs;
use crate::obj_parser::ObjParser;
use crate::prelude::*;

#[derive(clap::Args, Debug)]
pub struct LoadArgs {
    /// Model name, or path to the OBJ file
    name: String,
    /// Directory bare model names are looked up in
    #[arg(long, default_value = ".")]
    source_dir: PathBuf,
    /// Directory holding the cache files
    #[arg(long, env = "NGL_CACHE_DIR")]
    cache_dir: PathBuf,
    /// Only use the cache if it is strictly newer than the source
    #[arg(long)]
    require_newer: bool,
    #[command(flatten)]
    rarg: crate::ReadArgs,
}

impl From<&LoadArgs> for CacheSettings {
    fn from(args: &LoadArgs) -> Self {
        Self {
            require_newer: args.require_newer,
            reader: ReaderSettings::from(&args.rarg),
        }
    }
}

pub fn run(
    _args_common: &CommonArgs,
    args_cmd: &LoadArgs,
) -> AnyResult<()> {
    let policy = CachePolicy::new_with_settings(
        CacheSettings::from(args_cmd),
        SidecarResolver::new(&args_cmd.source_dir, &args_cmd.cache_dir),
    );
    let paths = policy.paths(&args_cmd.name);
    tracing::debug!(
        source = %paths.original.display(),
        cache = %paths.cache.display(),
        state = ?policy.state(&args_cmd.name),
        "Resolved model paths"
    );
    let loaded = policy
        .load(&args_cmd.name, &ObjParser)
        .context("Cannot load model")?;
    if loaded.from_cache {
        tracing::info!(name = %args_cmd.name, "Cache hit");
    } else {
        tracing::info!(name = %args_cmd.name, "Cache miss, parsed source");
    }
    println!(
        "{}: {} vertices, {} indices, {} materials, {} surfaces ({})",
        args_cmd.name,
        loaded.mesh.n_vertices(),
        loaded.mesh.indices.len(),
        loaded.mesh.materials.len(),
        loaded.mesh.surfaces.len(),
        if loaded.from_cache { "from cache" } else { "parsed" },
    );
    Ok(())
}
