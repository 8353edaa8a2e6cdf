//! End-to-end tests of the photo-date-restore binary

use assert_cmd::Command;
use filetime::FileTime;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

const CSV: &str = "imgName,fileChecksum,favorite,hidden,deleted,originalCreationDate,viewCount,importDate
IMG_0001.HEIC,abc,no,no,no,\"Monday January 01,2023 10:30 AM GMT\",0,\"Monday March 04,2024 09:12 AM GMT\"
IMG_0002.JPG,def,no,no,no,not a date,0,\"Monday March 04,2024 09:12 AM GMT\"
";

fn export_folder() -> TempDir {
    let dir = tempdir().unwrap();
    for name in ["IMG_0001.HEIC", "IMG_0002.JPG", "IMG_0003.HEIC"] {
        fs::write(dir.path().join(name), name).unwrap();
    }
    fs::write(dir.path().join("Photo Details.csv"), CSV).unwrap();
    dir
}

fn command(log_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("photo-date-restore").unwrap();
    cmd.env("LANG", "en_US.UTF-8")
        .env_remove("PHOTO_DATE_RESTORE_FOLDER")
        .arg("--log-dir")
        .arg(log_dir);
    cmd
}

fn mtime_seconds(path: &Path) -> i64 {
    FileTime::from_last_modification_time(&fs::metadata(path).unwrap()).unix_seconds()
}

#[test]
fn restores_matched_file() {
    let folder = export_folder();
    let logs = tempdir().unwrap();

    command(logs.path())
        .arg("--folder")
        .arg(folder.path())
        .arg("--case-sensitive")
        .assert()
        .success()
        .stderr(predicate::str::contains("1 updated"))
        .stderr(predicate::str::contains("No metadata found for IMG_0003.HEIC"));

    assert_eq!(mtime_seconds(&folder.path().join("IMG_0001.HEIC")), 1_672_569_000);
}

#[test]
fn dry_run_leaves_files_alone() {
    let folder = export_folder();
    let logs = tempdir().unwrap();
    let path = folder.path().join("IMG_0001.HEIC");
    let before = mtime_seconds(&path);

    command(logs.path())
        .arg("--folder")
        .arg(folder.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stderr(predicate::str::contains("[DRY-RUN] Would set IMG_0001.HEIC"));

    assert_eq!(mtime_seconds(&path), before);
}

#[test]
fn writes_json_report() {
    let folder = export_folder();
    let logs = tempdir().unwrap();
    let report = logs.path().join("report.json");

    command(logs.path())
        .arg("--folder")
        .arg(folder.path())
        .arg("--report")
        .arg(&report)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["updated"], 1);
    assert_eq!(json["skipped_no_metadata"], 2);
    assert_eq!(json["errors"], 0);
}

#[test]
fn missing_folder_fails() {
    let logs = tempdir().unwrap();

    command(logs.path())
        .arg("--folder")
        .arg(logs.path().join("does-not-exist"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Folder not found"));
}

#[test]
fn folder_is_required() {
    let logs = tempdir().unwrap();

    command(logs.path()).assert().failure();
}

#[test]
fn folder_from_config_file() {
    let folder = export_folder();
    let logs = tempdir().unwrap();
    let config_path = logs.path().join("restore.toml");
    fs::write(
        &config_path,
        format!("folder = {:?}\ndry_run = true\n", folder.path().display().to_string()),
    )
    .unwrap();

    command(logs.path())
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("0 updated"));
}
