use ngl_mesh::read::{ReaderSettings, decode_with_settings};

use crate::CommonArgs;
use crate::prelude::*;

#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    inarg: crate::ReadArgs,
    #[command(flatten)]
    inpath: crate::InputPath,
}

pub fn run(
    args_common: &CommonArgs,
    args_cmd: &VerifyArgs,
) -> AnyResult<()> {
    let bytes = std::fs::read(&args_cmd.inpath.in_file)
        .context("Could not read input file")?;
    if args_common.verbose {
        eprintln!("Read {} bytes.", bytes.len());
    }
    let settings = ReaderSettings::from(&args_cmd.inarg);
    let mesh = decode_with_settings(settings, &bytes)
        .context("Cannot decode file")?;
    if args_common.verbose {
        eprintln!("File data successfully decoded.");
    }
    if !settings.validate_mesh {
        if let Err(e) = mesh.validate() {
            tracing::warn!("Decoded mesh is inconsistent: {e}");
        }
    }
    Ok(())
}
