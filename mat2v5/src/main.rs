//! mat2v5 - Rewrite MATLAB/Octave .mat files as uncompressed version 5 files.
//!
//! This tool reads every variable from a MAT file, whatever its level,
//! byte order or compression, and writes it to a plain version 5 file that
//! older MATLAB releases and third-party readers can load.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::Args;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    init_logging(args.verbose);

    // Argument combinations clap cannot check are usage errors too
    if let Err(msg) = args.validate() {
        output::print_usage_error(&msg);
        std::process::exit(2);
    }

    // Run the appropriate command
    if let Err(e) = run(&args) {
        output::print_error(&e);
        std::process::exit(1);
    }
}

/// Route library log records to stderr. `RUST_LOG` overrides the default.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

/// Main dispatch function.
fn run(args: &Args) -> Result<()> {
    if args.list {
        commands::list::run(args)
    } else if args.dry_run {
        commands::validate::run(args)
    } else {
        commands::convert::run(args)
    }
}
