//! Integration tests for mat2v5 CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use mat5_rs::{encode_variable, Header, MatReader, MatWriter, Variable};

/// Get the mat2v5 command.
fn mat2v5() -> Command {
    let mut cmd = Command::cargo_bin("mat2v5").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Fixtures
// ============================================================================

/// Write a version 5 file holding `vars`.
fn write_fixture(path: &Path, vars: &[Variable]) {
    let mut writer = MatWriter::builder().header_text("fixture").create(path).unwrap();
    for var in vars {
        writer.write(var).unwrap();
    }
    writer.close().unwrap();
}

/// A function handle element, which the writer refuses to produce.
fn function_handle(name: &str) -> Vec<u8> {
    fn element(out: &mut Vec<u8>, data_type: u32, data: &[u8]) {
        out.extend_from_slice(&data_type.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out.resize(out.len() + (8 - data.len() % 8) % 8, 0);
    }

    let mut body = Vec::new();
    element(&mut body, 6, &[16, 0, 0, 0, 0, 0, 0, 0]);
    element(&mut body, 5, &[1, 0, 0, 0, 1, 0, 0, 0]);
    element(&mut body, 1, name.as_bytes());
    element(&mut body, 2, &[0xAA; 8]);

    let mut out = Vec::new();
    element(&mut out, 14, &body);
    out
}

/// A file with A (double), B (function handle) and C (text).
fn write_abc_fixture(path: &Path) {
    let mut bytes = Header::new("abc fixture").to_bytes().to_vec();
    bytes.extend(encode_variable(&Variable::double("A", vec![1, 2], vec![1.0, 2.0])).unwrap());
    bytes.extend(function_handle("B"));
    bytes.extend(encode_variable(&Variable::text("C", "third")).unwrap());
    fs::write(path, bytes).unwrap();
}

fn read_back(path: &Path) -> Vec<Variable> {
    MatReader::open(path)
        .unwrap()
        .collect::<mat5_rs::Result<Vec<_>>>()
        .unwrap()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    mat2v5()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("uncompressed version 5"))
        .stdout(predicate::str::contains("--list"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("EXAMPLES"));
}

#[test]
fn test_version() {
    mat2v5()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mat2v5"));
}

#[test]
fn test_missing_arguments() {
    mat2v5()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_missing_output() {
    mat2v5()
        .arg("input.mat")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("OUTPUT"));
}

#[test]
fn test_quiet_and_verbose_conflict() {
    mat2v5()
        .args(["-q", "-v", "input.mat", "output.mat"])
        .assert()
        .code(2);
}

// ============================================================================
// Open Failures
// ============================================================================

#[test]
fn test_nonexistent_input() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out.mat");

    mat2v5()
        .arg("/nonexistent/file.mat")
        .arg(&output)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/nonexistent/file.mat"))
        .stderr(predicate::str::contains("Failed to open MAT file"))
        .stderr(predicate::str::contains("\n").count(1));

    assert!(!output.exists());
}

#[test]
fn test_garbage_input() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("garbage.mat");
    let output = temp.path().join("out.mat");
    fs::write(&input, "this is not a MAT file, just some text").unwrap();

    mat2v5()
        .arg(&input)
        .arg(&output)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not a MAT file"))
        .stderr(predicate::str::contains("\n").count(1));

    assert!(!output.exists());
}

#[test]
fn test_output_directory_missing() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in.mat");
    write_fixture(&input, &[Variable::double("x", vec![1, 1], vec![1.0])]);

    mat2v5()
        .arg(&input)
        .arg(temp.path().join("missing").join("out.mat"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to create MAT file"));
}

#[test]
fn test_same_input_and_output() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in.mat");
    write_fixture(&input, &[Variable::double("x", vec![1, 1], vec![1.0])]);
    let before = fs::read(&input).unwrap();

    mat2v5()
        .arg(&input)
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("same file"));

    assert_eq!(fs::read(&input).unwrap(), before);
}

// ============================================================================
// Conversion Tests
// ============================================================================

#[test]
fn test_convert_empty_container() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("empty.mat");
    let output = temp.path().join("out.mat");
    write_fixture(&input, &[]);

    mat2v5()
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Writing MAT variable").not())
        .stderr(predicate::str::contains("Wrote MAT file"));

    assert_eq!(fs::metadata(&output).unwrap().len(), 128);
    assert!(read_back(&output).is_empty());
}

#[test]
fn test_convert_reports_each_variable() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("abc.mat");
    let output = temp.path().join("out.mat");
    write_abc_fixture(&input);

    mat2v5()
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Writing MAT variable: A... succeeded."))
        .stdout(predicate::str::contains("Writing MAT variable: B... failed."))
        .stdout(predicate::str::contains("Writing MAT variable: C... succeeded."))
        .stderr(predicate::str::contains(format!(
            "Wrote MAT file: \"{}\"",
            output.display()
        )));

    let vars = read_back(&output);
    assert_eq!(
        vars,
        vec![
            Variable::double("A", vec![1, 2], vec![1.0, 2.0]),
            Variable::text("C", "third"),
        ]
    );
}

#[test]
fn test_verbose_shows_failure_reason() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("abc.mat");
    let output = temp.path().join("out.mat");
    write_abc_fixture(&input);

    mat2v5()
        .arg("-v")
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("function_handle"))
        .stdout(predicate::str::contains("1x2 double"));
}

#[test]
fn test_quiet_prints_nothing() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("abc.mat");
    let output = temp.path().join("out.mat");
    write_abc_fixture(&input);

    mat2v5()
        .arg("--quiet")
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(read_back(&output).len(), 2);
}

#[test]
fn test_custom_header() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in.mat");
    let output = temp.path().join("out.mat");
    write_fixture(&input, &[Variable::text("s", "x")]);

    mat2v5()
        .args(["--header", "Exported for legacy tools"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    let reader = MatReader::open(&output).unwrap();
    assert_eq!(
        reader.header().map(|h| h.text().to_string()).as_deref(),
        Some("Exported for legacy tools")
    );
}

#[test]
fn test_conversion_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in.mat");
    let first = temp.path().join("first.mat");
    let second = temp.path().join("second.mat");
    write_fixture(
        &input,
        &[
            Variable::double("a", vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]),
            Variable::text("b", "text"),
            Variable::logical("c", vec![1, 3], &[true, false, true]),
        ],
    );

    for (from, to) in [(&input, &first), (&first, &second)] {
        mat2v5()
            .args(["--header", "fixed"])
            .arg(from)
            .arg(to)
            .assert()
            .success();
    }

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    assert_eq!(read_back(&first), read_back(&input));
}

#[test]
fn test_existing_output_overwritten() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in.mat");
    let output = temp.path().join("out.mat");
    write_fixture(&input, &[Variable::double("x", vec![1, 1], vec![5.0])]);
    fs::write(&output, vec![0xFF; 4096]).unwrap();

    mat2v5().arg(&input).arg(&output).assert().success();

    assert_eq!(read_back(&output), vec![Variable::double("x", vec![1, 1], vec![5.0])]);
}

// ============================================================================
// List Mode Tests
// ============================================================================

#[test]
fn test_list_variables() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("abc.mat");
    write_abc_fixture(&input);

    mat2v5()
        .arg("--list")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Level 5"))
        .stdout(predicate::str::contains("double"))
        .stdout(predicate::str::contains("function_handle"))
        .stdout(predicate::str::contains("3 variables found"));
}

#[test]
fn test_list_missing_file() {
    mat2v5()
        .arg("--list")
        .arg("/nonexistent/file.mat")
        .assert()
        .code(1);
}

// ============================================================================
// Dry Run Tests
// ============================================================================

#[test]
fn test_dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("abc.mat");
    let output = temp.path().join("out.mat");
    write_abc_fixture(&input);

    mat2v5()
        .arg("--dry-run")
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("no files will be written"))
        .stdout(predicate::str::contains("Checking MAT variable: B... failed."))
        .stderr(predicate::str::contains("would be skipped"));

    assert!(!output.exists());
}

#[test]
fn test_dry_run_missing_file() {
    mat2v5()
        .arg("--dry-run")
        .arg("/nonexistent/file.mat")
        .assert()
        .code(1);
}
