#![forbid(unused_must_use)]
#![allow(clippy::upper_case_acronyms)]

use clap::Parser;

mod compress;
mod debug_dir;
mod util;

#[derive(clap::Parser)]
struct CommandWithFlags {
    /// Reduce logging to just warnings and errors.
    #[arg(long)]
    quiet: bool,

    /// Turn on debug output in all `pdbid` and `pdbidtool` modules. Noisy!
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Lists the entries of the debug directory of a PE image and decodes the ones that are
    /// understood: CodeView, PdbChecksum, Embedded Portable PDB and Reproducible.
    DebugDir(debug_dir::DebugDirOptions),
    /// Prints the compressed integer encoding of each value.
    Compress(compress::CompressOptions),
    /// Decodes a sequence of compressed integers, given as hex bytes.
    Decompress(compress::DecompressOptions),
}

fn main() -> anyhow::Result<()> {
    let command_with_flags = CommandWithFlags::parse();
    configure_tracing(&command_with_flags);

    match command_with_flags.command {
        Command::DebugDir(args) => debug_dir::command(&args)?,
        Command::Compress(args) => compress::compress_command(&args)?,
        Command::Decompress(args) => compress::decompress_command(&args)?,
    }

    Ok(())
}

fn configure_tracing(args: &CommandWithFlags) {
    use tracing_subscriber::filter::LevelFilter;

    let max_level = if args.quiet {
        LevelFilter::WARN
    } else if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
