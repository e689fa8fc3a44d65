use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("blockmark-babel")
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn convert_json_fixture_to_markdown() {
    let expected = fs::read_to_string(fixture_path("kitchensink.md")).unwrap();
    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.arg("convert")
        .arg(fixture_path("kitchensink.json"))
        .arg("--to")
        .arg("markdown");

    cmd.assert().success().stdout(expected);
}

#[test]
fn convert_subcommand_is_optional() {
    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.arg(fixture_path("kitchensink.json"))
        .arg("--to")
        .arg("markdown");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("# Release notes\n"));
}

#[test]
fn markdown_from_stdin_becomes_json() {
    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.args(["-", "--from", "markdown", "--to", "json"])
        .args(["--extra-stamp-time", "false"])
        .write_stdin("## Notes\n\n- [x] shipped\n");

    let output = predicate::str::contains("\"type\": \"header\"")
        .and(predicate::str::contains("\"level\": 2"))
        .and(predicate::str::contains("\"type\": \"checklist\""))
        .and(predicate::str::contains("\"version\": \"2.29.0\""))
        .and(predicate::str::contains("\"time\"").not());

    cmd.assert().success().stdout(output);
}

#[test]
fn json_output_is_time_stamped_by_default() {
    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.args(["-", "--from", "markdown", "--to", "json", "--extra-pretty", "false"])
        .write_stdin("hello\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::is_match(r#"^\{"time":\d+,"version":"2\.29\.0","blocks":\["#).unwrap());
}

#[test]
fn output_flag_writes_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("notes.md");
    let output = dir.path().join("notes.json");
    fs::write(&input, "# Title\n\nBody *text*\n").unwrap();

    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.arg(&input)
        .args(["--to", "json", "-o"])
        .arg(&output);
    cmd.assert().success().stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("Body <i>text</i>"));
}

#[test]
fn escape_can_be_disabled_from_the_command_line() {
    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.args(["-", "--from", "json", "--to", "markdown", "--extra-escape", "false"])
        .write_stdin(r#"{"blocks":[{"type":"paragraph","data":{"text":"a*b"}}]}"#);

    cmd.assert().success().stdout("a*b\n");
}

#[test]
fn undetectable_extensions_need_from() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    fs::write(&input, "hello\n").unwrap();

    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.arg(&input).args(["--to", "json"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Could not detect format"));
}

#[test]
fn unknown_target_format_fails() {
    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.arg(fixture_path("kitchensink.json")).args(["--to", "html"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("html"));
}

#[test]
fn invalid_json_is_reported() {
    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.args(["-", "--from", "json", "--to", "markdown"])
        .write_stdin("{not json");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Parse error"));
}
