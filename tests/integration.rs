//! End-to-end integration tests that invoke the compiled `lfdiff` binary
//! via `std::process::Command`. Requires a real `diff` on `PATH`.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;

fn run_lfdiff(args: &[&str], stdin: &str) -> (String, String, i32) {
    let binary = env!("CARGO_BIN_EXE_lfdiff");

    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn lfdiff binary");

    child.stdin.take().unwrap().write_all(stdin.as_bytes()).unwrap();

    let output = child.wait_with_output().expect("failed to wait on child");

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn identical_files_produce_no_output_and_exit_zero() {
    let a = write_temp("one\ntwo\nthree\n");
    let b = write_temp("one\ntwo\nthree\n");

    let (stdout, stderr, code) = run_lfdiff(&[a.path().to_str().unwrap(), b.path().to_str().unwrap()], "");

    assert_eq!(stdout, "");
    assert_eq!(stderr, "");
    assert_eq!(code, 0);
}

#[test]
fn single_line_change_matches_system_diff() {
    let a = write_temp("one\ntwo\nthree\n");
    let b = write_temp("one\nTWO\nthree\n");

    let (stdout, _, code) = run_lfdiff(&[a.path().to_str().unwrap(), b.path().to_str().unwrap()], "");

    assert_eq!(code, 0);
    assert_eq!(stdout, "2c2\n< two\n---\n> TWO\n");
}

#[test]
fn pure_insertion_is_reported() {
    let a = write_temp("one\ntwo\n");
    let b = write_temp("one\ntwo\nthree\n");

    let (stdout, _, code) = run_lfdiff(&[a.path().to_str().unwrap(), b.path().to_str().unwrap()], "");

    assert_eq!(code, 0);
    assert_eq!(stdout, "2a3\n> three\n");
}

#[test]
fn pure_deletion_is_reported() {
    let a = write_temp("one\ntwo\nthree\n");
    let b = write_temp("one\ntwo\n");

    let (stdout, _, code) = run_lfdiff(&[a.path().to_str().unwrap(), b.path().to_str().unwrap()], "");

    assert_eq!(code, 0);
    assert_eq!(stdout, "3d2\n< three\n");
}

#[test]
fn small_splitsize_still_produces_a_correct_merged_diff() {
    let a = write_temp("a\nb\nc\nd\ne\n");
    let b = write_temp("a\nB\nc\nd\nE\n");

    let (stdout, _, code) = run_lfdiff(
        &["-s", "4", a.path().to_str().unwrap(), b.path().to_str().unwrap()],
        "",
    );

    assert_eq!(code, 0);
    assert_eq!(stdout, "2c2\n< b\n---\n> B\n5c5\n< e\n---\n> E\n");
}

#[test]
fn same_path_twice_is_a_usage_error() {
    let a = write_temp("x\n");
    let path = a.path().to_str().unwrap();

    let (_, stderr, code) = run_lfdiff(&[path, path], "");

    assert_eq!(code, 1);
    assert!(stderr.contains("same file"));
}

#[test]
fn stdin_used_twice_is_a_usage_error() {
    let (_, stderr, code) = run_lfdiff(&["-", "-"], "x\n");

    assert_eq!(code, 1);
    assert!(stderr.contains("stdin"));
}
