use ngl_mesh::read::ReaderSettings;
use tracing_subscriber::EnvFilter;

use crate::prelude::*;

#[allow(unused_imports)]
mod prelude {
    pub use std::path::{Path, PathBuf};

    pub use anyhow::{Context, Result as AnyResult, bail};
}

mod cmd {
    pub mod info;
    pub mod verify;
    #[cfg(feature = "obj")]
    pub mod from_obj;
    #[cfg(feature = "obj")]
    pub mod load;
}

#[cfg(feature = "obj")]
mod obj_parser;

#[derive(clap::Parser, Debug)]
#[command(about = "Tool for working with NGL binary mesh cache files.")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    /// Operation to perform
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// Print extra info about what the tool is doing
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args, Debug)]
struct ReadArgs {
    /// Accept files with bytes after the last record
    #[arg(long)]
    allow_trailing_data: bool,
    /// Do not check decoded indices and ranges for consistency
    #[arg(long)]
    no_validate: bool,
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Overwrite output file if it exists
    #[arg(short, long)]
    overwrite: bool,
}

#[derive(clap::Args, Debug)]
struct InputPath {
    /// Path to the input file
    in_file: PathBuf,
}

#[derive(clap::Args, Debug)]
struct OutputPath {
    /// Path where to save the output file
    out_file: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum CliCommand {
    /// Print information about the tool
    Version,
    /// Show general info about the file
    Info(cmd::info::InfoArgs),
    /// Try decoding the file to check for errors
    Verify(cmd::verify::VerifyArgs),
    /// Import from OBJ format
    #[cfg(feature = "obj")]
    FromObj(cmd::from_obj::FromObjArgs),
    /// Load a model through the cache, parsing the source only if needed
    #[cfg(feature = "obj")]
    Load(cmd::load::LoadArgs),
}

impl From<&ReadArgs> for ReaderSettings {
    fn from(args: &ReadArgs) -> Self {
        Self {
            reject_trailing_data: !args.allow_trailing_data,
            validate_mesh: !args.no_validate,
        }
    }
}

fn run_command(cli: &Cli) -> AnyResult<()> {
    match &cli.command {
        CliCommand::Version => {
            // Verbose always prints version anyway
            if !cli.common.verbose {
                print_version();
            }
            Ok(())
        }
        CliCommand::Info(args) => cmd::info::run(&cli.common, args),
        CliCommand::Verify(args) => cmd::verify::run(&cli.common, args),
        #[cfg(feature = "obj")]
        CliCommand::FromObj(args) => cmd::from_obj::run(&cli.common, args),
        #[cfg(feature = "obj")]
        CliCommand::Load(args) => cmd::load::run(&cli.common, args),
    }
}

fn print_version() {
    eprintln!(
        "{} version {}. Works with file format version {:.1}.",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        ngl_mesh::FORMAT_VERSION,
    );
    eprintln!();
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    use clap::Parser;
    let cli = Cli::parse();

    init_tracing(cli.common.verbose);
    if cli.common.verbose {
        print_version();
    }

    if let Err(e) = run_command(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(2);
    }
}
