//! Locale file discovery
//!
//! Locale trees look like `locales/<lang>/translation.json`: one immediate
//! subdirectory per language, each holding a fixed-named JSON file. Discovery
//! takes the root and the file name as explicit arguments; there are no
//! ambient path constants.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default file name inside each language directory.
pub const DEFAULT_FILE_NAME: &str = "translation.json";

/// Enumerate `<root>/<lang>/<file_name>` for every immediate subdirectory of
/// `root` that contains one. Results are sorted for deterministic batch runs.
pub fn translation_files(root: &Path, file_name: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            let candidate = entry.path().join(file_name);
            if candidate.is_file() {
                files.push(candidate);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Build the unit-of-work list: a single file when `root` points at one, the
/// discovered locale files otherwise.
pub fn work_list(root: &Path, file_name: &str) -> io::Result<Vec<PathBuf>> {
    if root.is_file() {
        Ok(vec![root.to_path_buf()])
    } else {
        translation_files(root, file_name)
    }
}
