use std::io::BufWriter;

use ngl_mesh::cache::MeshParser;
use ngl_mesh::write::encode_to;

use crate::CommonArgs;
use crate::obj_parser::ObjParser;
use crate::prelude::*;

#[derive(clap::Args, Debug)]
pub struct FromObjArgs {
    #[command(flatten)]
    oarg: crate::OutputArgs,
    #[command(flatten)]
    inpath: crate::InputPath,
    #[command(flatten)]
    outpath: crate::OutputPath,
}

pub fn run(
    args_common: &CommonArgs,
    args_cmd: &FromObjArgs,
) -> AnyResult<()> {
    let mesh = ObjParser.parse(&args_cmd.inpath.in_file)?;
    if args_common.verbose {
        eprintln!(
            "Parsed {} vertices, {} indices.",
            mesh.n_vertices(),
            mesh.indices.len(),
        );
    }

    let outfile = if args_cmd.oarg.overwrite {
        std::fs::File::create(&args_cmd.outpath.out_file)
            .context("Could not open output file")?
    } else {
        std::fs::File::create_new(&args_cmd.outpath.out_file)
            .context("Could not open output file")?
    };
    let mut bufout = BufWriter::new(outfile);
    encode_to(&mesh, &mut bufout).context("Cannot encode output file")?;
    Ok(())
}
