use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn markdown_file(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.md");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn inspect_defaults_to_treeviz() {
    let (_dir, path) = markdown_file("# Title\n\n- one\n- two\n");
    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.arg("inspect").arg(&path);

    let output = predicate::str::contains("⧉ Document (2 nodes)")
        .and(predicate::str::contains("# H1 Title"))
        .and(predicate::str::contains("☰ 2 items"));
    cmd.assert().success().stdout(output);
}

#[test]
fn inspect_blocks_json_with_line_parser() {
    let (_dir, path) = markdown_file("> quoted\n");
    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.arg("inspect")
        .arg(&path)
        .arg("blocks-json")
        .args(["--extra-parser", "lines"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"quote\""));
}

#[test]
fn inspect_rejects_unknown_parser() {
    let (_dir, path) = markdown_file("text\n");
    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.arg("inspect")
        .arg(&path)
        .args(["--extra-parser", "pulldown"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown markdown parser"));
}

#[test]
fn list_formats_shows_formats_and_transforms() {
    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.arg("--list-formats");

    let output = predicate::str::contains("json")
        .and(predicate::str::contains("markdown"))
        .and(predicate::str::contains("ir-treeviz"));
    cmd.assert().success().stdout(output);
}
