//! Command-line argument definitions using clap derive macros.

use clap::Parser;
use std::path::{Path, PathBuf};

/// Convert MATLAB/Octave .mat files to uncompressed version 5 MAT files.
///
/// mat2v5 reads every variable from a MAT file (Level 4, or Level 5 with
/// or without compression, in either byte order) and writes it to a new
/// uncompressed little-endian version 5 file. Variables that cannot be
/// written are reported and skipped.
#[derive(Parser, Debug)]
#[command(name = "mat2v5")]
#[command(author, version, about, long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct Args {
    /// Input .mat file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output .mat file (omit for --list or --dry-run)
    #[arg(value_name = "OUTPUT", required_unless_present_any = ["list", "dry_run"])]
    pub output: Option<PathBuf>,

    // ========================================================================
    // Mode Selection
    // ========================================================================
    /// List variables in the MAT file and exit
    #[arg(short, long)]
    pub list: bool,

    /// Decode and encode every variable without writing output
    #[arg(long)]
    pub dry_run: bool,

    // ========================================================================
    // Output Configuration
    // ========================================================================
    /// Descriptive text for the output file header (at most 116 bytes)
    ///
    /// Defaults to a MATLAB-style line naming the platform, this tool and
    /// the creation time.
    #[arg(long, value_name = "TEXT")]
    pub header: Option<String>,

    // ========================================================================
    // Output Control
    // ========================================================================
    /// Show class and size of each variable and why writes failed
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Validate argument combinations clap cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.list || self.dry_run {
            return Ok(());
        }

        // Creating the output would truncate the input before it is read.
        if let Some(ref output) = self.output {
            if same_file(&self.input, output) {
                return Err(format!(
                    "Input and output are the same file: {}",
                    self.input.display()
                ));
            }
        }

        Ok(())
    }
}

/// Whether both paths exist and resolve to the same file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Example usage shown in --help.
const EXAMPLES: &str = r#"
EXAMPLES:
    # Rewrite a compressed v7 file as an uncompressed v5 file
    mat2v5 results.mat results_v5.mat

    # List variables in a MAT file
    mat2v5 --list results.mat

    # Check which variables would convert, without writing anything
    mat2v5 --dry-run results.mat

    # Custom header text and per-variable details
    mat2v5 -v --header "Exported for legacy tools" results.mat out.mat
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_convert_args() {
        let args = Args::try_parse_from(["mat2v5", "in.mat", "out.mat"]).unwrap();
        assert_eq!(args.input, PathBuf::from("in.mat"));
        assert_eq!(args.output, Some(PathBuf::from("out.mat")));
        assert!(!args.list && !args.dry_run);
        assert!(args.header.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_output_required_for_conversion() {
        let err = Args::try_parse_from(["mat2v5", "in.mat"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_list_without_output() {
        let args = Args::try_parse_from(["mat2v5", "--list", "in.mat"]).unwrap();
        assert!(args.list);
        assert!(args.output.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let err = Args::try_parse_from(["mat2v5", "-q", "-v", "in.mat", "out.mat"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_same_path_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let input = temp.path().join("data.mat");
        std::fs::write(&input, b"x").unwrap();
        let alias = temp.path().join(".").join("data.mat");

        let args = Args::try_parse_from([
            std::ffi::OsStr::new("mat2v5"),
            input.as_os_str(),
            alias.as_os_str(),
        ])
        .unwrap();
        let err = args.validate().unwrap_err();
        assert!(err.contains("same file"));
    }
}
