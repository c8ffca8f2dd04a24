//! List variables command (--list mode).

use anyhow::Result;
use colored::Colorize;

use mat5_rs::Variable;

use crate::cli::Args;
use crate::commands::convert::open_input;
use crate::output;

/// Run the list command.
pub fn run(args: &Args) -> Result<()> {
    output::print_verbose(
        &format!("Opening MAT file: {}", args.input.display()),
        args.verbose,
    );

    let reader = open_input(&args.input)?;
    let version = reader.version();
    let header_text = reader.header().map(|h| h.text().to_string());

    // Input order is preserved; unreadable variables are reported in place
    let mut vars: Vec<Variable> = Vec::new();
    for var in reader {
        match var {
            Ok(var) => vars.push(var),
            Err(e) => output::print_warning(&format!("Skipping unreadable variable: {}", e)),
        }
    }

    if args.quiet {
        for var in &vars {
            println!("{}", var.name());
        }
        return Ok(());
    }

    println!("{}", format!("Variables in '{}':", args.input.display()).bold());
    output::print_kv("Format", &version.to_string(), 2);
    if let Some(text) = header_text {
        output::print_kv("Header", &text, 2);
    }
    println!();

    if vars.is_empty() {
        output::print_warning("No variables found in MAT file");
        return Ok(());
    }

    // Calculate column widths
    let max_name = vars.iter().map(|v| v.name().len()).max().unwrap_or(4).max(4);
    let max_size = vars.iter().map(|v| v.dims_string().len()).max().unwrap_or(4).max(4);

    println!(
        "  {:<name$}  {:>size$}  {:<8}  {}",
        "Name",
        "Size",
        "Class",
        "Attributes",
        name = max_name,
        size = max_size
    );
    println!(
        "  {:-<name$}  {:->size$}  {:-<8}  ----------",
        "",
        "",
        "",
        name = max_name,
        size = max_size
    );

    for var in &vars {
        println!(
            "  {:<name$}  {:>size$}  {:<8}  {}",
            var.name(),
            var.dims_string(),
            var.class().to_string(),
            attributes(var).join(", "),
            name = max_name,
            size = max_size
        );
    }

    println!();
    println!("{} variables found", vars.len());

    Ok(())
}

/// MATLAB-style attribute list for the `whos` Attributes column.
fn attributes(var: &Variable) -> Vec<String> {
    let mut attrs = Vec::new();
    if var.is_logical() {
        attrs.push("logical".to_string());
    }
    if var.is_complex() {
        attrs.push("complex".to_string());
    }
    if var.is_global() {
        attrs.push("global".to_string());
    }
    if !var.class().is_writable() {
        attrs.push("not writable".yellow().to_string());
    }
    attrs
}
