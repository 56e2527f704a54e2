//! Tests of the `conjugaison-harvester` binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../parser/tests/fixtures")
        .join(name)
}

fn harvester() -> Command {
    Command::cargo_bin("conjugaison-harvester").unwrap()
}

#[test]
fn test_parse_prints_records() {
    harvester()
        .arg("parse")
        .arg(fixture("parler.html"))
        .args(["--verb", "parler", "--entry-id", "A9P0492"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"parler\""))
        .stdout(predicate::str::contains("\"parlons\""))
        .stdout(predicate::str::contains("\"voix_active_avoir\""));
}

#[test]
fn test_parse_page_without_data_warns() {
    harvester()
        .arg("parse")
        .arg(fixture("no_conjugation.html"))
        .args(["--verb", "ouïr", "--entry-id", "A9O0311"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no conjugation data"));
}

#[test]
fn test_parse_wrong_entry_fails() {
    harvester()
        .arg("parse")
        .arg(fixture("parler.html"))
        .args(["--verb", "parler", "--entry-id", "A9Z9999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A9Z9999"));
}

#[test]
fn test_merge_writes_exports() {
    let dir = tempdir().unwrap();
    let parsed = dir.path().join("parsed");
    fs::create_dir_all(&parsed).unwrap();
    fs::write(
        parsed.join("aimer.json"),
        r#"{"aimer":{"h_aspire":false,"rectification_1990":false,"rectification_1990_variante":null}}"#,
    )
    .unwrap();

    harvester()
        .arg("merge")
        .arg("--output")
        .arg(dir.path())
        .arg("--gen-rows")
        .arg("--gen-sqlite3")
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 1 verbs"))
        .stdout(predicate::str::contains("verbs.min.json"))
        .stdout(predicate::str::contains("verbs.db"));

    assert!(dir.path().join("verbs.json").exists());
    assert!(dir.path().join("conjugations.jsonl").exists());
    assert!(dir.path().join("verbs.db").exists());
}

#[test]
fn test_parse_html5_page() {
    harvester()
        .arg("parse")
        .arg(fixture("hacher.html"))
        .args(["--verb", "hacher", "--entry-id", "A9H0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"h_aspire\": true"))
        .stdout(predicate::str::contains("\"hachons\""));
}

#[test]
fn test_gen_infinitives_rejects_invalid_base_url() {
    let dir = tempdir().unwrap();
    harvester()
        .arg("gen-infinitives")
        .arg("--output")
        .arg(dir.path())
        .args(["--base-url", "ftp://dictionnaire-academie.fr/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));
    assert!(!dir.path().join("gen_infs").exists());
}

#[test]
fn test_crawl_rejects_invalid_options() {
    harvester()
        .args(["crawl", "--max-threads", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
