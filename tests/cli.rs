//! Integration tests for the `converter` binary.
//!
//! None of these need pdfium: they cover argument handling, dispatch errors,
//! exit codes, and the LibreOffice route against a stand-in `soffice` script.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a CLI command
fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_converter"));
    cmd.env_remove("RUST_LOG")
        .env_remove("DOCSHIFT_DPI")
        .env_remove("DOCSHIFT_PAGE_SIZE")
        .env_remove("DOCSHIFT_SOFFICE")
        .env_remove("DOCSHIFT_FONT")
        .env_remove("DOCSHIFT_QUIET");
    cmd
}

// ============ USAGE ============

#[test]
fn test_no_arguments_is_usage_error() {
    cli().assert().code(1);
}

#[test]
fn test_two_arguments_is_usage_error() {
    cli()
        .args(["photo.jpg", "jpg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("TARGET_EXT"));
}

#[test]
fn test_four_arguments_is_usage_error() {
    cli().args(["photo.jpg", "jpg", "pdf", "extra"]).assert().code(1);
}

#[test]
fn test_help_exits_zero() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("EXIT CODES"));
}

#[test]
fn test_list_prints_supported_pairs() {
    cli()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("jpg->pdf"))
        .stdout(predicate::str::contains("pdf->xlsx"))
        .stdout(predicate::str::contains("docx->xlsx").not());
}

#[test]
fn test_dpi_out_of_range_is_usage_error() {
    cli()
        .args(["--dpi", "10", "report.pdf", "pdf", "png"])
        .assert()
        .code(1);
}

#[test]
fn test_unknown_page_size_is_usage_error() {
    cli()
        .args(["--page-size", "tabloid", "photo.jpg", "jpg", "pdf"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("tabloid"));
}

#[test]
fn test_missing_font_is_config_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.txt");
    fs::write(&input, "Привет").unwrap();

    cli()
        .arg(&input)
        .args(["txt", "pdf", "--font"])
        .arg(dir.path().join("missing.ttf"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("font file not found"));

    assert!(!dir.path().join("notes.pdf").exists());
}

// ============ DISPATCH AND I/O ERRORS ============

#[test]
fn test_unsupported_pair_exits_2_without_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("report.docx");
    fs::write(&input, b"PK").unwrap();

    cli()
        .arg(&input)
        .args(["docx", "xlsx"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("docx->xlsx"));

    assert!(!dir.path().join("report.xlsx").exists());
}

#[test]
fn test_missing_text_input_exits_3() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("absent.txt");

    cli()
        .arg(&input)
        .args(["txt", "pdf"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not found"));

    assert!(!dir.path().join("absent.pdf").exists());
}

#[test]
fn test_missing_office_suite_exits_4() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("deck.pptx");
    fs::write(&input, b"PK").unwrap();

    cli()
        .arg(&input)
        .args(["pptx", "pdf", "--soffice"])
        .arg(dir.path().join("no-such-soffice"))
        .assert()
        .code(4)
        .stderr(predicate::str::contains("LibreOffice not found"));
}

// ============ OFFICE ROUTE ============

/// Stand-in for `soffice --convert-to pdf --outdir DIR FILE`.
#[cfg(unix)]
const FAKE_SOFFICE: &str = r#"#!/bin/sh
outdir=""
input=""
while [ $# -gt 0 ]; do
  case "$1" in
    --outdir) outdir="$2"; shift 2 ;;
    *) input="$1"; shift ;;
  esac
done
name=$(basename "$input")
printf '%%PDF-1.4\n' > "$outdir/${name%.*}.pdf"
"#;

#[cfg(unix)]
#[test]
fn test_office_export_with_stand_in_soffice() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let soffice = dir.path().join("soffice");
    fs::write(&soffice, FAKE_SOFFICE).unwrap();
    fs::set_permissions(&soffice, fs::Permissions::from_mode(0o755)).unwrap();

    let input = dir.path().join("budget.xlsx");
    fs::write(&input, b"PK").unwrap();
    let output = dir.path().join("budget.pdf");

    cli()
        .arg(&input)
        .args(["xlsx", "pdf", "--no-progress", "--soffice"])
        .arg(&soffice)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Conversion completed: {} -> {}",
            input.display(),
            output.display()
        )));
    assert!(fs::read(&output).unwrap().starts_with(b"%PDF"));

    fs::remove_file(&output).unwrap();
    cli()
        .arg(&input)
        .args(["xlsx", "pdf", "--json", "--soffice"])
        .arg(&soffice)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""route": "spreadsheet_to_pdf""#))
        .stdout(predicate::str::contains("Conversion completed").not());
    assert!(output.exists());

    fs::remove_file(&output).unwrap();
    cli()
        .arg(&input)
        .args(["xlsx", "pdf", "-q", "--soffice"])
        .arg(&soffice)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
