//! File-level processing pipeline
//!
//! Ties the scanning, grouping and rewriting layers together for one file:
//! read, locate spans, group duplicates, plan removals, then either report
//! (dry run) or back up, rewrite, validate and persist. Batch runs feed
//! files through one at a time; every failure is file-scoped and the batch
//! always runs to completion.
//!
//! The scan and plan phases have no side effects, so a run can always be
//! abandoned before the write step. No write happens until the rewritten
//! text has passed JSON validation, and a backup copy of the original is
//! made first. After the write the file is read back and parsed once more;
//! if the write or the re-read check fails the backup is copied back.

use crate::dedup::{group_duplicates, plan_removal, removal_set, KeepPolicy, MatchMode};
use crate::report::{BatchReport, FileOutcome, FileReport, PlannedRemoval};
use crate::rewrite::{rewrite, validate, RewriteError};
use crate::scan::{locate, locate_all, ScanError, Span};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Which depths to scan for duplicate keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFilter {
    /// Keys at one nesting depth only; 1 is the top level of the outer object.
    At(usize),
    /// Keys at every depth, needed for cross-path policies.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Report duplicates without touching any file.
    DryRun,
    /// Backup + rewrite + validate + persist.
    Commit,
}

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub depth: DepthFilter,
    pub match_mode: MatchMode,
    pub keep_policy: KeepPolicy,
    pub mode: RunMode,
    /// Suffix backups with the epoch seconds instead of plain `.backup`.
    pub timestamped_backup: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        ProcessOptions {
            depth: DepthFilter::At(1),
            match_mode: MatchMode::ByContent,
            keep_policy: KeepPolicy::First,
            mode: RunMode::DryRun,
            timestamped_backup: false,
        }
    }
}

#[derive(Debug)]
pub enum ProcessError {
    Io(io::Error),
    Scan(ScanError),
    Rewrite(RewriteError),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Io(e) => write!(f, "io error: {}", e),
            ProcessError::Scan(e) => write!(f, "{}", e),
            ProcessError::Rewrite(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Io(e) => Some(e),
            ProcessError::Scan(e) => Some(e),
            ProcessError::Rewrite(e) => Some(e),
        }
    }
}

impl From<io::Error> for ProcessError {
    fn from(err: io::Error) -> Self {
        ProcessError::Io(err)
    }
}

impl From<ScanError> for ProcessError {
    fn from(err: ScanError) -> Self {
        ProcessError::Scan(err)
    }
}

impl From<RewriteError> for ProcessError {
    fn from(err: RewriteError) -> Self {
        ProcessError::Rewrite(err)
    }
}

/// Process one file according to `opts`.
pub fn process_file(path: &Path, opts: &ProcessOptions) -> Result<FileReport, ProcessError> {
    let text = fs::read_to_string(path)?;

    let spans = match opts.depth {
        DepthFilter::At(depth) => locate(&text, depth)?,
        DepthFilter::All => locate_all(&text)?,
    };

    let groups = group_duplicates(&text, &spans, opts.match_mode);
    let plans: Vec<_> = groups
        .iter()
        .filter_map(|g| plan_removal(g, opts.keep_policy))
        .collect();
    let removals = removal_set(&plans);

    let planned = plans
        .iter()
        .map(|plan| PlannedRemoval {
            key: plan.keep.key.clone(),
            keep: plan.keep.dotted_path(),
            remove: plan.remove.iter().map(Span::dotted_path).collect(),
        })
        .collect();

    let mut report = FileReport {
        path: path.display().to_string(),
        sections: spans.len(),
        duplicate_groups: groups.len(),
        planned,
        removed: 0,
        outcome: FileOutcome::Clean,
        backup: None,
    };

    if removals.is_empty() {
        return Ok(report);
    }
    if opts.mode == RunMode::DryRun {
        report.outcome = FileOutcome::WouldRewrite;
        return Ok(report);
    }

    let rewritten = rewrite(&text, &removals)?;
    let output = render_output(&rewritten);

    let backup = backup_path(path, opts.timestamped_backup);
    fs::copy(path, &backup)?;
    persist(path, &output, &backup)?;

    report.removed = removals.len();
    report.outcome = FileOutcome::Rewritten;
    report.backup = Some(backup.display().to_string());
    Ok(report)
}

/// Process a batch of files, one at a time. Failures become per-file reports
/// instead of aborting the run.
pub fn process_batch(paths: &[PathBuf], opts: &ProcessOptions) -> BatchReport {
    let mut batch = BatchReport::new();
    for path in paths {
        match process_file(path, opts) {
            Ok(report) => batch.push(report),
            Err(err) => batch.push(FileReport::failed(path, err.to_string())),
        }
    }
    batch
}

/// Final text for persisting. Pretty-printed with 2-space indentation when
/// safe; if same-parent duplicate keys intentionally survive (differing
/// content under the content policy), the validated raw text is kept so a
/// parser round-trip cannot collapse them.
fn render_output(rewritten: &str) -> String {
    if let Ok(spans) = locate_all(rewritten) {
        if !has_sibling_collision(&spans) {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(rewritten) {
                if let Ok(mut pretty) = serde_json::to_string_pretty(&value) {
                    pretty.push('\n');
                    return pretty;
                }
            }
        }
    }
    rewritten.to_string()
}

fn has_sibling_collision(spans: &[Span]) -> bool {
    for (i, a) in spans.iter().enumerate() {
        for b in spans.iter().skip(i + 1) {
            if a.key == b.key && a.parent_path == b.parent_path {
                return true;
            }
        }
    }
    false
}

/// Write `output` to `path`, then read the file back and confirm it still
/// parses. Any failure copies the backup over `path` and surfaces the error;
/// the backup copy is the source of truth from the moment the write starts.
fn persist(path: &Path, output: &str, backup: &Path) -> Result<(), ProcessError> {
    if let Err(err) = fs::write(path, output) {
        let _ = fs::copy(backup, path);
        return Err(err.into());
    }
    let persisted = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            let _ = fs::copy(backup, path);
            return Err(err.into());
        }
    };
    if let Err(err) = validate(&persisted) {
        let _ = fs::copy(backup, path);
        return Err(err.into());
    }
    Ok(())
}

fn backup_path(path: &Path, timestamped: bool) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    if timestamped {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        name.push(format!(".backup.{}", stamp));
    } else {
        name.push(".backup");
    }
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_dry_run_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"{"a": {"x": 1}, "b": {"y": 2}, "a": {"x": 1}}"#;
        let path = write_file(&dir, "translation.json", text);

        let report = process_file(&path, &ProcessOptions::default()).unwrap();
        assert_eq!(report.outcome, FileOutcome::WouldRewrite);
        assert_eq!(report.planned_removals(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn test_commit_removes_duplicate_and_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"{"a": {"x": 1}, "b": {"y": 2}, "a": {"x": 1}}"#;
        let path = write_file(&dir, "translation.json", text);

        let opts = ProcessOptions {
            mode: RunMode::Commit,
            ..ProcessOptions::default()
        };
        let report = process_file(&path, &opts).unwrap();
        assert_eq!(report.outcome, FileOutcome::Rewritten);
        assert_eq!(report.removed, 1);

        let written = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["a"]["x"], 1);
        assert_eq!(value["b"]["y"], 2);
        assert_eq!(value.as_object().unwrap().len(), 2);

        let backup = report.backup.unwrap();
        assert_eq!(fs::read_to_string(backup).unwrap(), text);
    }

    #[test]
    fn test_commit_preserves_key_order_and_indentation() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"{"zebra": 1, "alpha": 2, "zebra": 1}"#;
        let path = write_file(&dir, "translation.json", text);

        let opts = ProcessOptions {
            mode: RunMode::Commit,
            ..ProcessOptions::default()
        };
        process_file(&path, &opts).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        // Source order, not alphabetical, with 2-space indentation
        assert_eq!(written, "{\n  \"zebra\": 1,\n  \"alpha\": 2\n}\n");
    }

    #[test]
    fn test_differing_content_duplicates_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"{"a": {"x": 1}, "a": {"x": 2}}"#;
        let path = write_file(&dir, "translation.json", text);

        let opts = ProcessOptions {
            mode: RunMode::Commit,
            ..ProcessOptions::default()
        };
        let report = process_file(&path, &opts).unwrap();
        assert_eq!(report.outcome, FileOutcome::Clean);
        // Untouched on disk, duplicate and all
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn test_by_name_policy_removes_differing_content() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"{"a": {"x": 1}, "a": {"x": 2}}"#;
        let path = write_file(&dir, "translation.json", text);

        let opts = ProcessOptions {
            match_mode: MatchMode::ByName,
            mode: RunMode::Commit,
            ..ProcessOptions::default()
        };
        let report = process_file(&path, &opts).unwrap();
        assert_eq!(report.removed, 1);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        // First occurrence kept
        assert_eq!(value["a"]["x"], 1);
    }

    #[test]
    fn test_unparseable_file_is_scan_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "translation.json", r#"{"a": "unterminated"#);

        let err = process_file(&path, &ProcessOptions::default()).unwrap_err();
        assert!(matches!(err, ProcessError::Scan(_)));
    }

    #[test]
    fn test_mismatched_closer_is_scan_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "translation.json", r#"{"a": 1]"#);

        let err = process_file(&path, &ProcessOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Scan(ScanError::MismatchedCloser { .. })
        ));
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(&dir, "good.json", r#"{"a": 1, "a": 1}"#);
        let bad = write_file(&dir, "bad.json", r#"{"a": {"#);
        let missing = dir.path().join("missing.json");

        let opts = ProcessOptions {
            mode: RunMode::Commit,
            ..ProcessOptions::default()
        };
        let batch = process_batch(&[bad, missing, good.clone()], &opts);
        assert_eq!(batch.failed, 2);
        assert_eq!(batch.succeeded, 1);
        assert_eq!(batch.total_removed(), 1);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&good).unwrap()).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_shortest_path_policy_across_depths() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"{"nest": {"a": {"x": 1}, "only": 2}, "a": {"x": 1}}"#;
        let path = write_file(&dir, "translation.json", text);

        let opts = ProcessOptions {
            depth: DepthFilter::All,
            keep_policy: KeepPolicy::ShortestPath,
            mode: RunMode::Commit,
            ..ProcessOptions::default()
        };
        let report = process_file(&path, &opts).unwrap();
        assert_eq!(report.outcome, FileOutcome::Rewritten);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        // Top-level "a" kept, nested copy removed
        assert_eq!(value["a"]["x"], 1);
        assert!(value["nest"].get("a").is_none());
        assert_eq!(value["nest"]["only"], 2);
    }

    #[test]
    fn test_persist_restores_backup_when_reread_check_fails() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"{"a": 1}"#;
        let path = write_file(&dir, "translation.json", text);
        let backup = dir.path().join("translation.json.backup");
        fs::copy(&path, &backup).unwrap();

        let err = persist(&path, r#"{"a": "#, &backup).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Rewrite(RewriteError::IntegrityError(_))
        ));
        // The original text is back on disk
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn test_timestamped_backup_suffix() {
        let path = backup_path(Path::new("translation.json"), true);
        let name = path.to_string_lossy().into_owned();
        assert!(name.starts_with("translation.json.backup."));

        let plain = backup_path(Path::new("translation.json"), false);
        assert_eq!(plain, PathBuf::from("translation.json.backup"));
    }
}
