//! Main conversion command.

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use mat5_rs::{MatReader, MatWriter, MatWriterBuilder};

use crate::cli::Args;
use crate::output;

/// Outcome counts for one pass over the input.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub written: usize,
    pub failed: usize,
    pub unreadable: usize,
}

/// Run the convert command.
pub fn run(args: &Args) -> Result<()> {
    let output_path = args
        .output
        .as_deref()
        .context("Output file is required (or use --list or --dry-run)")?;

    output::print_verbose(
        &format!("Opening MAT file: {}", args.input.display()),
        args.verbose,
    );

    // Open the input before touching the output
    let mut reader = open_input(&args.input)?;

    let mut writer = output_builder(args)
        .create(output_path)
        .with_context(|| format!("Failed to create MAT file \"{}\"", output_path.display()))?;

    let tally = convert_all(&mut reader, &mut writer, args);

    writer
        .close()
        .with_context(|| format!("Failed to close MAT file \"{}\"", output_path.display()))?;

    if !args.quiet {
        eprintln!("Wrote MAT file: \"{}\"", output_path.display());
    }
    print_summary(&tally, args);

    Ok(())
}

/// Open the input, naming the path on failure.
pub(crate) fn open_input(path: &Path) -> Result<MatReader> {
    let reader = MatReader::open(path)
        .with_context(|| format!("Failed to open MAT file \"{}\"", path.display()))?;
    debug!("{:?}", reader);
    Ok(reader)
}

fn output_builder(args: &Args) -> MatWriterBuilder {
    let builder = MatWriter::builder();
    match args.header {
        Some(ref text) => builder.header_text(text.as_str()),
        None => builder,
    }
}

/// Copy every readable variable from `reader` to `writer`, in order.
///
/// A variable that cannot be written is reported and skipped. A variable
/// that cannot be read is skipped with a warning; if the input is truncated
/// the reader ends the sequence after reporting it.
fn convert_all(reader: &mut MatReader, writer: &mut MatWriter, args: &Args) -> Tally {
    let mut tally = Tally::default();

    loop {
        let var = match reader.read_next() {
            Ok(Some(var)) => var,
            Ok(None) => break,
            Err(e) => {
                output::print_warning(&format!("Skipping unreadable variable: {}", e));
                tally.unreadable += 1;
                continue;
            }
        };

        output::print_variable_start("Writing", var.name(), args.quiet);
        match writer.write(&var) {
            Ok(()) => {
                tally.written += 1;
                output::print_variable_result(true, args.quiet);
                output::print_verbose(&var.describe(), args.verbose);
            }
            Err(e) => {
                tally.failed += 1;
                output::print_variable_result(false, args.quiet);
                output::print_verbose(&e.to_string(), args.verbose);
            }
        }
    }

    tally
}

fn print_summary(tally: &Tally, args: &Args) {
    output::print_verbose(
        &format!(
            "{} written, {} failed, {} unreadable",
            tally.written, tally.failed, tally.unreadable
        ),
        args.verbose,
    );

    if tally.failed > 0 && !args.quiet {
        output::print_warning(&format!(
            "{} variable(s) could not be written",
            tally.failed
        ));
    }
}
