use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

fn fifoplayer(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fifoplayer").unwrap();
    if let Some(dir) = config.parent() {
        cmd.current_dir(dir);
    }
    cmd.arg("--config")
        .arg(config)
        .env_remove("SPOTIFY_ID")
        .env_remove("SPOTIFY_SECRET")
        .env_remove("SPOTIFY_REDIRECT")
        .env_remove("FIFOPLAYER_CONFIG");
    cmd
}

fn config_with_pipes_in(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, format!("[pipes]\ndir = {:?}\n", dir.to_string_lossy())).unwrap();
    path
}

#[test]
fn test_help() {
    Command::cargo_bin("fifoplayer")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("named pipes"))
        .stdout(predicate::str::contains("send"));
}

#[test]
fn test_send_rejects_unknown_command() {
    let dir = tempfile::tempdir().unwrap();
    fifoplayer(&config_with_pipes_in(dir.path()))
        .args(["send", "rewind"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid control command"));
}

#[test]
fn test_send_without_running_daemon() {
    let dir = tempfile::tempdir().unwrap();
    fifoplayer(&config_with_pipes_in(dir.path()))
        .args(["send", "pause"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fifoplayer-control"))
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status_without_running_daemon() {
    let dir = tempfile::tempdir().unwrap();
    fifoplayer(&config_with_pipes_in(dir.path()))
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("fifoplayer-track"));
}

#[test]
fn test_run_requires_credentials() {
    let dir = tempfile::tempdir().unwrap();
    fifoplayer(&dir.path().join("missing.toml"))
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SPOTIFY_ID"))
        .stderr(predicate::str::contains("SPOTIFY_SECRET"))
        .stderr(predicate::str::contains("SPOTIFY_REDIRECT"));
}

#[test]
fn test_run_rejects_bad_redirect() {
    let dir = tempfile::tempdir().unwrap();
    fifoplayer(&dir.path().join("missing.toml"))
        .env("SPOTIFY_ID", "id")
        .env("SPOTIFY_SECRET", "secret")
        .env("SPOTIFY_REDIRECT", "not a url")
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid redirect URL"));
}

#[test]
fn test_run_reads_dotenv_from_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".env"),
        "SPOTIFY_ID=env-file-id\nSPOTIFY_SECRET=env-file-secret\nSPOTIFY_REDIRECT=\"not a url\"\n",
    )
    .unwrap();

    // Credentials are found, so the failure is the redirect, not missing values
    fifoplayer(&dir.path().join("missing.toml"))
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid redirect URL: not a url"))
        .stderr(predicate::str::contains("Missing").not());
}

#[test]
fn test_process_environment_wins_over_dotenv() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".env"),
        "SPOTIFY_ID=env-file-id\nSPOTIFY_SECRET=env-file-secret\nSPOTIFY_REDIRECT=\"not a url\"\n",
    )
    .unwrap();

    fifoplayer(&dir.path().join("missing.toml"))
        .env("SPOTIFY_REDIRECT", "also bad")
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid redirect URL: also bad"));
}
