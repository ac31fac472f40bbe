use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::access::AccessLevel;
use crate::error::ScriptError;
use crate::model::PaperColor;

// ── Interpreter settings ─────────────────────────────────────────

/// Interpreter tunables stored as JSON. Missing fields take their defaults, so
/// an empty object is a valid settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    /// First wait budget of a supervised execution.
    pub initial_wait_secs: u64,
    /// Budget granted each time the operator chooses to keep waiting.
    pub extended_wait_secs: u64,
    pub default_access: AccessLevel,
    /// Side length in pixels of exported animation frames.
    pub export_size: u32,
    pub initial_paper_color: PaperColor,
    /// Color restored by `uncolor`, and assumed when a native file stores none.
    pub reset_paper_color: PaperColor,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            initial_wait_secs: 10,
            extended_wait_secs: 30,
            default_access: AccessLevel::User,
            export_size: 250,
            initial_paper_color: PaperColor::BLUE,
            reset_paper_color: PaperColor::NAVY,
        }
    }
}

impl ScriptSettings {
    pub fn initial_wait(&self) -> Duration {
        Duration::from_secs(self.initial_wait_secs)
    }

    pub fn extended_wait(&self) -> Duration {
        Duration::from_secs(self.extended_wait_secs)
    }
}

/// Load settings from the config directory. Returns `Ok(None)` if no settings
/// file exists; a present but unreadable file is an error.
pub fn load_settings(config_dir: &Path) -> Result<Option<ScriptSettings>, ScriptError> {
    let path = crate::paths::settings_path(config_dir);
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(&path)?;
    let settings = serde_json::from_str(&data)?;
    log::debug!("loaded settings from {}", path.display());
    Ok(Some(settings))
}

/// Save settings to the config directory (atomic write).
pub fn save_settings(config_dir: &Path, settings: &ScriptSettings) -> Result<(), ScriptError> {
    std::fs::create_dir_all(config_dir)?;
    let path = crate::paths::settings_path(config_dir);
    let json = serde_json::to_string_pretty(settings)?;
    atomic_write(&path, json.as_bytes())
}

/// Write to a temp sibling, then rename over the target.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> Result<(), ScriptError> {
    let tmp = crate::paths::temp_sibling(path);
    std::fs::write(&tmp, data)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ScriptSettings {
            initial_wait_secs: 3,
            default_access: AccessLevel::Root,
            ..ScriptSettings::default()
        };
        save_settings(dir.path(), &settings).unwrap();

        let loaded = load_settings(dir.path()).unwrap().expect("should load");
        assert_eq!(loaded, settings);
        assert!(!crate::paths::temp_sibling(&crate::paths::settings_path(dir.path())).exists());
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            crate::paths::settings_path(dir.path()),
            r#"{ "extended_wait_secs": 5, "default_access": "dev" }"#,
        )
        .unwrap();

        let loaded = load_settings(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.extended_wait(), Duration::from_secs(5));
        assert_eq!(loaded.initial_wait(), Duration::from_secs(10));
        assert_eq!(loaded.default_access, AccessLevel::Dev);
        assert_eq!(loaded.reset_paper_color, PaperColor::NAVY);
    }

    #[test]
    fn test_corrupt_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(crate::paths::settings_path(dir.path()), "{ nope").unwrap();
        assert!(matches!(
            load_settings(dir.path()),
            Err(ScriptError::Config { .. })
        ));
    }
}
