use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use tempfile::tempdir;

#[test]
fn explicit_config_file_is_applied() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("doc.json");
    fs::write(
        &input,
        r#"{"blocks":[{"type":"paragraph","data":{"text":"2 * 3 = 6"}}]}"#,
    )
    .unwrap();

    let config_path = dir.path().join("custom.toml");
    fs::write(&config_path, "[serialize]\nescape_text = false\n").unwrap();

    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.arg(&input)
        .args(["--to", "markdown", "--config"])
        .arg(&config_path);

    cmd.assert().success().stdout("2 * 3 = 6\n");
}

#[test]
fn local_config_file_is_picked_up() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("blockmark.toml"),
        "[json]\npretty = false\nstamp_time = false\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.current_dir(dir.path())
        .args(["-", "--from", "markdown", "--to", "json"])
        .write_stdin("hi\n");

    cmd.assert().success().stdout(
        "{\"version\":\"2.29.0\",\"blocks\":[{\"type\":\"paragraph\",\"data\":{\"text\":\"hi\"}}]}\n",
    );
}

#[test]
fn missing_explicit_config_fails() {
    let dir = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("blockmark");
    cmd.args(["-", "--from", "markdown", "--to", "json", "--config"])
        .arg(dir.path().join("absent.toml"))
        .write_stdin("hi\n");

    cmd.assert().failure();
}
