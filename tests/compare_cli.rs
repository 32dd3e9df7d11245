use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::{tempdir, TempDir};

fn write_csv(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write csv fixture");
    path
}

fn compare_cmd(file1: &PathBuf, file2: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("csvsync").expect("binary exists");
    cmd.args([
        "compare",
        "--file1",
        file1.to_str().unwrap(),
        "--file2",
        file2.to_str().unwrap(),
    ]);
    cmd
}

#[test]
fn identical_files_match() {
    let dir = tempdir().expect("temp dir");
    let a = write_csv(&dir, "a.csv", "id,name\n1,Alice\n2,Bob\n");
    let b = write_csv(&dir, "b.csv", "id,name\n1,Alice\n2,Bob\n");
    compare_cmd(&a, &b)
        .assert()
        .success()
        .stdout(contains("Files match!"));
}

#[test]
fn numeric_formatting_differences_match() {
    let dir = tempdir().expect("temp dir");
    let a = write_csv(&dir, "a.csv", "a,b\n1,2\n");
    let b = write_csv(&dir, "b.csv", "a,b\n1,2.0\n");
    compare_cmd(&a, &b)
        .assert()
        .success()
        .stdout(contains("Files match!"));
}

#[test]
fn row_order_is_ignored_by_default() {
    let dir = tempdir().expect("temp dir");
    let a = write_csv(&dir, "a.csv", "id,name\n1,Alice\n2,Bob\n");
    let b = write_csv(&dir, "b.csv", "id,name\n2,Bob\n1,Alice\n");
    compare_cmd(&a, &b).assert().success();
}

#[test]
fn ordered_mode_flags_reordered_rows() {
    let dir = tempdir().expect("temp dir");
    let a = write_csv(&dir, "a.csv", "id,name\n1,Alice\n2,Bob\n");
    let b = write_csv(&dir, "b.csv", "id,name\n2,Bob\n1,Alice\n");
    compare_cmd(&a, &b)
        .arg("--ordered")
        .assert()
        .code(1)
        .stdout(contains("Files differ:"));
}

#[test]
fn genuine_difference_exits_one_with_location() {
    let dir = tempdir().expect("temp dir");
    let a = write_csv(&dir, "a.csv", "a,b\n1,2\n");
    let b = write_csv(&dir, "b.csv", "a,b\n1,3\n");
    compare_cmd(&a, &b)
        .assert()
        .code(1)
        .stdout(contains("Row 1, column 'b': '2' vs '3'"));
}

#[test]
fn long_difference_lists_are_summarized() {
    let dir = tempdir().expect("temp dir");
    let mut left = String::from("a\n");
    let mut right = String::from("a\n");
    for i in 0..12 {
        left.push_str(&format!("left{i}\n"));
        right.push_str(&format!("right{i}\n"));
    }
    let a = write_csv(&dir, "a.csv", &left);
    let b = write_csv(&dir, "b.csv", &right);
    compare_cmd(&a, &b)
        .assert()
        .code(1)
        .stdout(contains("... and 2 more differences"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().expect("temp dir");
    let a = write_csv(&dir, "a.csv", "a\n1\n");
    let missing = dir.path().join("nope.csv");
    compare_cmd(&a, &missing)
        .assert()
        .code(1)
        .stderr(contains("Error:"));
}
