//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code: time only passes through the
//!   panel's timer queue or by waiting on a deadline or I/O
//! - The core crate stays free of terminal and UI dependencies
//!
//! The helpers here are shared by the tests under `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, resolved from this crate's manifest directory
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["panel/core/src", "tui/src"];

/// Every `.rs` file under `dir` with its contents
pub fn rust_sources(dir: &Path) -> Vec<(PathBuf, String)> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .filter_map(|e| {
            let content = fs::read_to_string(e.path()).ok()?;
            Some((e.path().to_path_buf(), content))
        })
        .collect()
}

/// Code part of a line, without a trailing `//` comment
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Index of the line starting the `#[cfg(test)]` module, if any
///
/// Unit tests live at the bottom of each file, so everything from this
/// line on is test code.
pub fn test_module_start(lines: &[&str]) -> Option<usize> {
    lines
        .iter()
        .position(|line| line.trim_start().starts_with("#[cfg(test)]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_part_strips_comments() {
        assert_eq!(code_part("let x = 1; // sleep(5)"), "let x = 1; ");
        assert_eq!(code_part("/// docs"), "");
    }

    #[test]
    fn test_test_module_start() {
        let lines = vec!["fn a() {}", "", "#[cfg(test)]", "mod tests {"];
        assert_eq!(test_module_start(&lines), Some(2));
        assert_eq!(test_module_start(&lines[..2]), None);
    }

    #[test]
    fn test_workspace_root_has_production_dirs() {
        for dir in PRODUCTION_DIRS {
            assert!(workspace_root().join(dir).is_dir(), "{dir} not found");
        }
    }
}
