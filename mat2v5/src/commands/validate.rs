//! Dry-run validation command.

use anyhow::Result;
use colored::Colorize;

use mat5_rs::encode_variable;

use crate::cli::Args;
use crate::commands::convert::{open_input, Tally};
use crate::output;

/// Run the validate (dry-run) command.
///
/// Every variable is decoded and encoded in memory exactly as a conversion
/// would, but nothing is written.
pub fn run(args: &Args) -> Result<()> {
    output::print_info(
        &format!("{} (no files will be written)\n", "Dry run mode".yellow()),
        args.quiet,
    );

    output::print_verbose(
        &format!("Opening MAT file: {}", args.input.display()),
        args.verbose,
    );

    let reader = open_input(&args.input)?;

    let mut tally = Tally::default();
    let mut encoded_bytes = 0usize;

    for var in reader {
        let var = match var {
            Ok(var) => var,
            Err(e) => {
                output::print_warning(&format!("Skipping unreadable variable: {}", e));
                tally.unreadable += 1;
                continue;
            }
        };

        output::print_variable_start("Checking", var.name(), args.quiet);
        match encode_variable(&var) {
            Ok(bytes) => {
                tally.written += 1;
                encoded_bytes += bytes.len();
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

    if args.quiet {
        return Ok(());
    }

    println!();
    println!("{}", "Conversion Plan".bold().underline());
    println!();
    output::print_kv("Variables to write", &tally.written.to_string(), 2);
    output::print_kv("Variables to skip", &tally.failed.to_string(), 2);
    if tally.unreadable > 0 {
        output::print_kv("Unreadable", &tally.unreadable.to_string(), 2);
    }
    output::print_kv(
        "Estimated output size",
        &output::format_size((mat5_rs::HEADER_LEN + encoded_bytes) as u64),
        2,
    );

    println!();
    if tally.failed == 0 && tally.unreadable == 0 {
        output::print_success("Validation passed - ready to convert", args.quiet);
    } else {
        output::print_warning(&format!(
            "Validation completed: {} variable(s) would be skipped",
            tally.failed + tally.unreadable
        ));
    }

    Ok(())
}
