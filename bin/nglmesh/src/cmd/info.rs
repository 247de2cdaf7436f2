use ngl_mesh::checksum::fingerprint;
use ngl_mesh::descriptor::Component;
use ngl_mesh::read::{ReaderSettings, decode_with_settings};
use ngl_mesh::version::{is_supported, peek_version};

use crate::CommonArgs;
use crate::prelude::*;

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    rarg: crate::ReadArgs,
    #[command(flatten)]
    inpath: crate::InputPath,
}

pub fn run(
    _args_common: &CommonArgs,
    args_cmd: &InfoArgs,
) -> AnyResult<()> {
    let bytes = std::fs::read(&args_cmd.inpath.in_file)
        .context("Could not read input file")?;
    let Some(version) = peek_version(&bytes) else {
        bail!("File is too short to be a mesh file.");
    };
    println!("Format version: {version}{}", if is_supported(version) {
        ""
    } else {
        " (unsupported)"
    });
    println!("Size: {} bytes", bytes.len());
    println!("Fingerprint: {:016x}", fingerprint(&bytes));

    let mesh = decode_with_settings(ReaderSettings::from(&args_cmd.rarg), &bytes)
        .context("Cannot decode file")?;
    println!(
        "Vertices: {} ({} floats, stride {})",
        mesh.n_vertices(),
        mesh.structure.len(),
        mesh.stride,
    );
    println!("Indices: {}", mesh.indices.len());
    if mesh.element(Component::Position).is_none() {
        println!("  (no position element)");
    }
    for e in mesh.elements.iter() {
        println!(
            "  element {:?}: start {}, length {}, offset in face {}",
            e.component, e.start, e.length, e.offset_in_face,
        );
    }
    println!("Materials: {}", mesh.materials.len());
    for m in mesh.materials.iter() {
        println!("  #{} {:?}: alpha {}", m.id, m.name, m.alpha);
        for t in m.textures.iter() {
            println!(
                "    {:?} {:?} ({:?}, {:?}, {:?}, {:?})",
                t.map_kind, t.name, t.texture_type, t.quality, t.repeat, t.optimize,
            );
        }
    }
    println!("Surfaces: {}", mesh.surfaces.len());
    for s in mesh.surfaces.iter() {
        let material = mesh.material(s.id).map_or("-", |m| m.name.as_str());
        println!(
            "  #{}: indices {}..{}, material {:?}",
            s.id,
            s.start,
            s.start as u64 + s.length as u64,
            material,
        );
    }

    Ok(())
}
