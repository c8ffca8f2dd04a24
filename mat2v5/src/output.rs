//! Terminal output formatting utilities.

use colored::Colorize;
use std::io::{self, Write};

/// Print an error message to stderr as a single line.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{}: {}", "error".red().bold(), error_line(err));
}

/// Join the cause chain, dropping causes already quoted by an outer message.
fn error_line(err: &anyhow::Error) -> String {
    let mut line = err.to_string();
    for cause in err.chain().skip(1) {
        let cause = cause.to_string();
        if !line.contains(&cause) {
            line.push_str(": ");
            line.push_str(&cause);
        }
    }
    line
}

/// Print a usage error to stderr, pointing at `--help`.
pub fn print_usage_error(msg: &str) {
    eprintln!("{}: {}", "error".red().bold(), msg);
    eprintln!();
    eprintln!("For more information, try '{}'.", "--help".bold());
}

/// Print a warning message to stderr.
pub fn print_warning(msg: &str) {
    eprintln!("{}: {}", "warning".yellow().bold(), msg);
}

/// Print an info message to stdout (respects quiet mode).
pub fn print_info(msg: &str, quiet: bool) {
    if !quiet {
        println!("{}", msg);
    }
}

/// Print a success message.
pub fn print_success(msg: &str, quiet: bool) {
    if !quiet {
        println!("{}: {}", "success".green().bold(), msg);
    }
}

/// Print a verbose message (only in verbose mode).
pub fn print_verbose(msg: &str, verbose: bool) {
    if verbose {
        println!("  {}: {}", "info".blue(), msg);
    }
}

/// Start the per-variable line. The result is appended by
/// [`print_variable_result`].
pub fn print_variable_start(action: &str, name: &str, quiet: bool) {
    if !quiet {
        print!("{} MAT variable: {}... ", action, name);
        io::stdout().flush().ok();
    }
}

/// Finish the per-variable line.
pub fn print_variable_result(succeeded: bool, quiet: bool) {
    if !quiet {
        println!("{}", if succeeded { "succeeded." } else { "failed." });
    }
}

/// Print a key-value pair.
pub fn print_kv(key: &str, value: &str, indent: usize) {
    let padding = " ".repeat(indent);
    println!("{}{}: {}", padding, key.dimmed(), value);
}

/// Format file size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
