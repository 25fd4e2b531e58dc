//! Command-line behavior of the `docid` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use image::GenericImageView;
use predicates::prelude::*;
use tempfile::TempDir;

const ID_FRONT: &str = "姓名 陳小明\n身分證 A123456789\n民國65年03月10日出生\n民國108年05月01日換發\n";
const TRANSIT: &str = "悠遊卡 交易紀錄\n2025-01-15 08:30:12 捷運台北車站 扣款 -25\n2025-01-16 18:10:05 307路 -15\n";

/// A `docid` command whose user config directory is an empty temp dir.
fn docid(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("docid").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd
}

fn write_png(path: &Path) {
    image::RgbImage::from_pixel(8, 8, image::Rgb([200, 30, 30]))
        .save(path)
        .unwrap();
}

#[test]
fn text_file_to_json() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("front.txt");
    fs::write(&input, ID_FRONT).unwrap();

    docid(&home)
        .args(["text", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id_no\": \"A123456789\""))
        .stdout(predicate::str::contains("\"rule_id\": \"id_card_front\""))
        .stdout(predicate::str::contains("raw_text").not());
}

#[test]
fn text_from_stdin() {
    let home = TempDir::new().unwrap();

    docid(&home)
        .args(["text", "-", "--format", "text"])
        .write_stdin(ID_FRONT)
        .assert()
        .success()
        .stdout(predicate::str::contains("Type: 身分證 (正面)"))
        .stdout(predicate::str::contains("name: 陳小明"));
}

#[test]
fn unknown_text_shows_raw() {
    let home = TempDir::new().unwrap();

    docid(&home)
        .args(["text", "-", "--format", "text"])
        .write_stdin("hello world\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Type: unknown"))
        .stdout(predicate::str::contains("hello world"));
}

#[test]
fn unknown_json_keeps_raw_text() {
    let home = TempDir::new().unwrap();

    docid(&home)
        .args(["text", "-", "--format", "json"])
        .write_stdin("random receipt text\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type_label\": \"unknown\""))
        .stdout(predicate::str::contains("\"raw_text\": \"random receipt text\""));
}

#[test]
fn unknown_csv_keeps_raw_text() {
    let home = TempDir::new().unwrap();

    docid(&home)
        .args(["text", "-", "--format", "csv"])
        .write_stdin("random receipt text\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("type,raw_text\nunknown,random receipt text\n"));
}

#[test]
fn transit_text_to_csv() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("card.txt");
    let output = home.path().join("card.csv");
    fs::write(&input, TRANSIT).unwrap();

    docid(&home)
        .args(["text", input.to_str().unwrap(), "--format", "csv", "-o"])
        .arg(&output)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("date,time,mode,location,amount"));
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("2025-01-15,08:30:12"));
}

#[test]
fn empty_text_is_rejected() {
    let home = TempDir::new().unwrap();

    docid(&home)
        .args(["text", "-"])
        .write_stdin("  \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn rules_show_prints_builtin_table() {
    let home = TempDir::new().unwrap();

    docid(&home)
        .args(["rules", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"id_card_front\""))
        .stdout(predicate::str::contains("\"id\": \"transit_card\""));
}

#[test]
fn rules_check_accepts_valid_table() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("rules.json");
    fs::write(
        &path,
        r#"{
            "version": 1,
            "rules": [
                { "id": "card", "label": "Card", "keywords": ["卡"], "parser": "health_card" }
            ]
        }"#,
    )
    .unwrap();

    docid(&home)
        .args(["rules", "check"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 rules"));
}

#[test]
fn rules_check_rejects_unknown_version() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("rules.json");
    fs::write(
        &path,
        r#"{
            "version": 99,
            "rules": [
                { "id": "card", "label": "Card", "keywords": ["卡"], "parser": "health_card" }
            ]
        }"#,
    )
    .unwrap();

    docid(&home)
        .args(["rules", "check"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported rule table version 99"));
}

#[test]
fn rules_score_lists_every_rule() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("front.txt");
    fs::write(&input, ID_FRONT).unwrap();

    docid(&home)
        .args(["rules", "score"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("health_card"))
        .stdout(predicate::str::contains("→ id_card_front"));
}

#[test]
fn filter_writes_image() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("card.png");
    let output = home.path().join("filtered.png");
    write_png(&input);

    docid(&home)
        .args(["filter"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let filtered = image::open(&output).unwrap();
    assert_eq!(filtered.dimensions(), (8, 8));
}

#[test]
fn scan_without_models_fails() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("card.png");
    let models = home.path().join("models");
    fs::create_dir(&models).unwrap();
    write_png(&input);

    docid(&home)
        .arg("scan")
        .arg(&input)
        .arg("--model-dir")
        .arg(&models)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing model files"));
}

#[test]
fn scan_missing_input_fails() {
    let home = TempDir::new().unwrap();

    docid(&home)
        .args(["scan", "does-not-exist.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn batch_over_text_dumps_writes_summary() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("in");
    let outputs = home.path().join("out");
    fs::create_dir(&inputs).unwrap();
    fs::write(inputs.join("front.txt"), ID_FRONT).unwrap();
    fs::write(inputs.join("card.txt"), TRANSIT).unwrap();
    fs::write(inputs.join("other.txt"), "nothing to see\n").unwrap();

    let pattern = format!("{}/*.txt", inputs.display());
    docid(&home)
        .args(["batch", &pattern, "--summary", "-o"])
        .arg(&outputs)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 files"));

    assert!(outputs.join("front.json").exists());
    assert!(outputs.join("card.json").exists());

    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,type,rule_id,id_no,name"));
    assert!(summary.contains("front.txt,success,身分證 (正面),id_card_front,A123456789,陳小明"));
    assert!(summary.contains("other.txt,unknown,unknown,"));
}

#[test]
fn batch_keeps_outputs_with_shared_stems() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("in");
    let outputs = home.path().join("out");
    fs::create_dir_all(inputs.join("a")).unwrap();
    fs::create_dir_all(inputs.join("b")).unwrap();
    fs::write(inputs.join("a").join("front.txt"), ID_FRONT).unwrap();
    fs::write(inputs.join("b").join("front.txt"), TRANSIT).unwrap();

    let pattern = format!("{}/*/front.txt", inputs.display());
    docid(&home)
        .args(["batch", &pattern, "-o"])
        .arg(&outputs)
        .assert()
        .success();

    let first = fs::read_to_string(outputs.join("front.json")).unwrap();
    let second = fs::read_to_string(outputs.join("front_2.json")).unwrap();
    assert!(first.contains("id_card_front"));
    assert!(second.contains("transit_card"));
}

#[test]
fn batch_without_matches_fails() {
    let home = TempDir::new().unwrap();
    let pattern = format!("{}/*.png", home.path().display());

    docid(&home)
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_set_then_get() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("docid.json");

    docid(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.verify_mrz_checksums", "false"])
        .assert()
        .success();

    docid(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.verify_mrz_checksums"])
        .assert()
        .success()
        .stdout(predicate::str::diff("false\n"));
}

#[test]
fn config_set_rejects_bad_type() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("docid.json");

    docid(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "ocr.enable_rescan", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));

    assert!(!config.exists());
}

#[test]
fn config_path_before_init() {
    let home = TempDir::new().unwrap();

    docid(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"))
        .stdout(predicate::str::contains("docid config init"));
}

#[test]
fn config_init_refuses_overwrite() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("docid.json");

    docid(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    docid(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}
