//! CLI end-to-end tests
//!
//! Tests for the rangegate command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the rangegate binary
#[allow(deprecated)]
fn rangegate_cmd() -> Command {
    let mut cmd = Command::cargo_bin("rangegate").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_fs_config(dir: &Path, media_root: &Path) -> std::path::PathBuf {
    let path = dir.join("rangegate.toml");
    fs::write(
        &path,
        format!(
            concat!(
                "[server]\npublic_base_url = \"http://media.test:8080\"\n\n",
                "[store.filesystem]\nroot = {:?}\n",
            ),
            media_root
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = rangegate_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = rangegate_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rangegate"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = rangegate_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_start_help() {
    let mut cmd = rangegate_cmd();
    cmd.args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Start the streaming server"));
}

#[test]
fn test_cli_validate_defaults() {
    let dir = tempdir().unwrap();
    let mut cmd = rangegate_cmd();
    cmd.current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"))
        .stdout(predicate::str::contains("9999"));
}

#[test]
fn test_cli_validate_good_file() {
    let dir = tempdir().unwrap();
    let path = write_fs_config(dir.path(), dir.path());

    let mut cmd = rangegate_cmd();
    cmd.arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("filesystem"));
}

#[test]
fn test_cli_validate_rejects_drive_without_credentials() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[store]\nbackend = \"drive\"\n").unwrap();

    let mut cmd = rangegate_cmd();
    cmd.arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("access_token"));
}

#[test]
fn test_cli_inspect_filesystem_object() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("intro.mkv"), vec![0u8; 4321]).unwrap();
    let path = write_fs_config(dir.path(), dir.path());

    let mut cmd = rangegate_cmd();
    cmd.args(["--config"])
        .arg(&path)
        .args(["inspect", "intro.mkv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Size: 4321 bytes"))
        .stdout(predicate::str::contains("video/x-matroska"))
        .stdout(predicate::str::contains(
            "http://media.test:8080/media/stream/intro.mkv",
        ));
}

#[test]
fn test_cli_inspect_json() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.mp3"), vec![1u8; 10]).unwrap();
    let path = write_fs_config(dir.path(), dir.path());

    let output = rangegate_cmd()
        .arg("--config")
        .arg(&path)
        .args(["inspect", "a.mp3", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["size"], 10);
    assert_eq!(doc["content_type"], "audio/mpeg");
    assert_eq!(doc["store"], "filesystem");
}

#[test]
fn test_cli_inspect_missing_object_fails() {
    let dir = tempdir().unwrap();
    let path = write_fs_config(dir.path(), dir.path());

    let mut cmd = rangegate_cmd();
    cmd.arg("--config")
        .arg(&path)
        .args(["inspect", "nope.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.mp4"));
}
