//! Leaf filenames and path-building functions for interpreter data files.
//!
//! Functions accept `&Path` so callers decide where the config directory lives.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

// ── Leaf filenames ───────────────────────────────────────────────

pub const SETTINGS_FILE: &str = "foldscript.json";
pub const HISTORY_EXTENSION: &str = "fs";

// ── Config-dir functions ─────────────────────────────────────────

pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_FILE)
}

/// Sibling used while writing `path` atomically: `foo.json` → `foo.json.tmp`.
pub fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Default location for a saved script log next to `stem`.
pub fn history_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.{HISTORY_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_sibling_appends_suffix() {
        assert_eq!(
            temp_sibling(Path::new("/cfg/foldscript.json")),
            PathBuf::from("/cfg/foldscript.json.tmp")
        );
    }

    #[test]
    fn history_path_uses_script_extension() {
        assert_eq!(
            history_path(Path::new("out"), "crane"),
            PathBuf::from("out/crane.fs")
        );
    }
}
