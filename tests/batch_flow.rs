//! Batch processing flow over a locale directory tree
//!
//! Builds a `locales/<lang>/translation.json` tree on disk and runs the
//! discovery + processing pipeline over it the way the CLI does, checking
//! backups, per-file containment of failures and the final batch tally.

use dupkeys::discover;
use dupkeys::process::{process_batch, ProcessOptions, RunMode};
use dupkeys::report::FileOutcome;
use std::fs;
use std::path::Path;

fn lang_file(root: &Path, lang: &str, text: &str) {
    let dir = root.join(lang);
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("translation.json"), text).unwrap();
}

#[test]
fn full_clean_run_over_locale_tree() {
    let root = tempfile::tempdir().unwrap();
    lang_file(
        root.path(),
        "en",
        r#"{"menu": {"open": "Open"}, "menu": {"open": "Open"}, "title": "App"}"#,
    );
    lang_file(
        root.path(),
        "fr",
        r#"{"menu": {"open": "Ouvrir"}, "title": "Appli"}"#,
    );

    let files = discover::work_list(root.path(), "translation.json").unwrap();
    assert_eq!(files.len(), 2);

    let opts = ProcessOptions {
        mode: RunMode::Commit,
        ..ProcessOptions::default()
    };
    let batch = process_batch(&files, &opts);
    assert!(batch.all_succeeded());
    assert_eq!(batch.total_removed(), 1);

    // en rewritten, pretty-printed, one menu left
    let en: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(en.as_object().unwrap().len(), 2);
    assert_eq!(en["menu"]["open"], "Open");

    // fr had no duplicates and was not touched
    let fr_report = &batch.files[1];
    assert_eq!(fr_report.outcome, FileOutcome::Clean);
    assert_eq!(
        fs::read_to_string(&files[1]).unwrap(),
        r#"{"menu": {"open": "Ouvrir"}, "title": "Appli"}"#
    );

    // Backup holds the original en text, duplicate included
    let backup = batch.files[0].backup.as_ref().unwrap();
    let original = fs::read_to_string(backup).unwrap();
    assert!(original.matches("\"menu\"").count() == 2);
}

#[test]
fn broken_file_does_not_block_the_batch() {
    let root = tempfile::tempdir().unwrap();
    lang_file(root.path(), "de", r#"{"a": 1, "a": 1}"#);
    lang_file(root.path(), "es", r#"{"a": "unterminated"#);

    let files = discover::work_list(root.path(), "translation.json").unwrap();
    let opts = ProcessOptions {
        mode: RunMode::Commit,
        ..ProcessOptions::default()
    };
    let batch = process_batch(&files, &opts);

    assert_eq!(batch.succeeded, 1);
    assert_eq!(batch.failed, 1);
    assert!(batch.files[1].is_failure());

    // The broken file is skipped, never partially processed
    assert_eq!(
        fs::read_to_string(&files[1]).unwrap(),
        r#"{"a": "unterminated"#
    );
    // The healthy file was still cleaned
    let de: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(de["a"], 1);
}

#[test]
fn dry_run_reports_without_writing() {
    let root = tempfile::tempdir().unwrap();
    let text = r#"{"a": 1, "a": 1}"#;
    lang_file(root.path(), "en", text);

    let files = discover::work_list(root.path(), "translation.json").unwrap();
    let batch = process_batch(&files, &ProcessOptions::default());

    assert_eq!(batch.files[0].outcome, FileOutcome::WouldRewrite);
    assert_eq!(batch.files[0].planned_removals(), 1);
    assert_eq!(batch.total_removed(), 0);
    assert_eq!(fs::read_to_string(&files[0]).unwrap(), text);
    // No backup in a dry run
    assert!(!root.path().join("en/translation.json.backup").exists());
}

#[test]
fn batch_report_serializes_for_the_cli() {
    let root = tempfile::tempdir().unwrap();
    lang_file(root.path(), "en", r#"{"a": 1}"#);

    let files = discover::work_list(root.path(), "translation.json").unwrap();
    let batch = process_batch(&files, &ProcessOptions::default());

    let json = serde_json::to_value(&batch).unwrap();
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["files"][0]["outcome"]["kind"], "clean");
}
