//! Per-file and batch reporting
//!
//! Every processed file yields a [`FileReport`]; a run over many files folds
//! them into a [`BatchReport`] with an overall success/failure tally. Reports
//! serialize with serde so the CLI can emit them as JSON as well as text.

use serde::Serialize;
use std::fmt;

/// One duplicate group's planned resolution, described by dotted paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedRemoval {
    pub key: String,
    pub keep: String,
    pub remove: Vec<String>,
}

/// What happened (or would happen) to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum FileOutcome {
    /// No removable duplicates found; file untouched.
    Clean,
    /// Dry run: duplicates found, nothing written.
    WouldRewrite,
    /// Duplicates removed and the file rewritten.
    Rewritten,
    /// File-scoped failure; the rest of the batch continues.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: String,
    /// Key spans found at the requested depth(s).
    pub sections: usize,
    pub duplicate_groups: usize,
    pub planned: Vec<PlannedRemoval>,
    /// Spans actually excised (0 for dry runs and clean files).
    pub removed: usize,
    pub outcome: FileOutcome,
    pub backup: Option<String>,
}

impl FileReport {
    pub fn failed(path: &std::path::Path, error: String) -> Self {
        FileReport {
            path: path.display().to_string(),
            sections: 0,
            duplicate_groups: 0,
            planned: Vec::new(),
            removed: 0,
            outcome: FileOutcome::Failed(error),
            backup: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, FileOutcome::Failed(_))
    }

    pub fn planned_removals(&self) -> usize {
        self.planned.iter().map(|p| p.remove.len()).sum()
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.path)?;
        if let FileOutcome::Failed(error) = &self.outcome {
            return write!(f, "  error: {}", error);
        }
        writeln!(
            f,
            "  sections: {}, duplicate groups: {}",
            self.sections, self.duplicate_groups
        )?;
        for plan in &self.planned {
            writeln!(f, "  '{}': keep {}", plan.key, plan.keep)?;
            for path in &plan.remove {
                writeln!(f, "    remove {}", path)?;
            }
        }
        match &self.outcome {
            FileOutcome::Clean => write!(f, "  no duplicates to remove"),
            FileOutcome::WouldRewrite => {
                write!(f, "  dry run: {} span(s) would be removed", self.planned_removals())
            }
            FileOutcome::Rewritten => {
                write!(f, "  removed {} span(s)", self.removed)?;
                if let Some(backup) = &self.backup {
                    write!(f, ", backup at {}", backup)?;
                }
                Ok(())
            }
            FileOutcome::Failed(_) => unreachable!(),
        }
    }
}

/// Tally across a batch run. One file's failure never aborts the others.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn new() -> Self {
        BatchReport::default()
    }

    pub fn push(&mut self, report: FileReport) {
        if report.is_failure() {
            self.failed += 1;
        } else {
            self.succeeded += 1;
        }
        self.files.push(report);
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Total spans removed across all files.
    pub fn total_removed(&self) -> usize {
        self.files.iter().map(|r| r.removed).sum()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.files {
            writeln!(f, "{}", report)?;
        }
        write!(
            f,
            "processed {} file(s): {} ok, {} failed, {} span(s) removed",
            self.files.len(),
            self.succeeded,
            self.failed,
            self.total_removed()
        )
    }
}
