use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::write_text_atomic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Error)]
pub(crate) enum PreferenceError {
    #[error("failed to read preferences {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preferences at {at}: {source}")]
    Parse {
        at: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("preference {key} must be \"true\" or \"false\", got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
    #[error("failed to encode preferences: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write preferences {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// On-disk shape. Flags are stored as the strings "true" and "false".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
struct StoredPreferences {
    #[serde(rename = "musicEnabled", default, skip_serializing_if = "Option::is_none")]
    music_enabled: Option<String>,
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, PreferenceError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(PreferenceError::InvalidFlag {
            key,
            value: other.to_string(),
        }),
    }
}

/// Player preferences kept in `cache/preferences.json`.
#[derive(Debug, Clone)]
pub(crate) struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub(crate) fn in_cache_dir(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(PREFERENCES_FILE),
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Music is on unless the file says otherwise.
    pub(crate) fn read_music_enabled(&self) -> Result<bool, PreferenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(true),
            Err(source) => {
                return Err(PreferenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let stored = parse_stored(&raw)?;
        match stored.music_enabled {
            Some(value) => parse_flag("musicEnabled", &value),
            None => Ok(true),
        }
    }

    /// Like [`Self::read_music_enabled`], falling back to enabled on any error.
    pub(crate) fn music_enabled_or_default(&self) -> bool {
        match self.read_music_enabled() {
            Ok(enabled) => enabled,
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    error = %error,
                    "preferences_unreadable"
                );
                true
            }
        }
    }

    pub(crate) fn write_music_enabled(&self, enabled: bool) -> Result<(), PreferenceError> {
        let stored = StoredPreferences {
            music_enabled: Some(enabled.to_string()),
        };
        let json = serde_json::to_string_pretty(&stored).map_err(PreferenceError::Encode)?;
        write_text_atomic(&self.path, &json).map_err(|source| PreferenceError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(music_enabled = enabled, "preferences_saved");
        Ok(())
    }
}

fn parse_stored(raw: &str) -> Result<StoredPreferences, PreferenceError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let at = error.path().to_string();
        PreferenceError::Parse {
            at,
            source: error.into_inner(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, PreferenceStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = PreferenceStore::in_cache_dir(dir.path());
        (dir, store)
    }

    #[test]
    fn missing_file_defaults_to_enabled() {
        let (_dir, store) = store();
        assert!(store.read_music_enabled().expect("read"));
    }

    #[test]
    fn flag_is_stored_as_a_string_literal() {
        let (_dir, store) = store();
        store.write_music_enabled(false).expect("write");
        let raw = fs::read_to_string(store.path()).expect("read back");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(json["musicEnabled"], serde_json::Value::from("false"));
        assert!(!store.read_music_enabled().expect("read"));

        store.write_music_enabled(true).expect("write");
        assert!(store.read_music_enabled().expect("read"));
    }

    #[test]
    fn garbled_file_reports_and_falls_back() {
        let (_dir, store) = store();
        fs::write(store.path(), "{ not json").expect("write garbage");
        assert!(matches!(
            store.read_music_enabled(),
            Err(PreferenceError::Parse { .. })
        ));
        assert!(store.music_enabled_or_default());
    }

    #[test]
    fn non_literal_values_are_rejected() {
        let (_dir, store) = store();
        fs::write(store.path(), r#"{"musicEnabled": "nope"}"#).expect("write");
        assert!(matches!(
            store.read_music_enabled(),
            Err(PreferenceError::InvalidFlag { .. })
        ));

        fs::write(store.path(), r#"{"musicEnabled": false}"#).expect("write");
        let error = store.read_music_enabled().expect_err("bool is not a string");
        match error {
            PreferenceError::Parse { at, .. } => assert_eq!(at, "musicEnabled"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.music_enabled_or_default());
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        let (_dir, store) = store();
        fs::write(store.path(), r#"{"volume": "3"}"#).expect("write");
        assert!(store.read_music_enabled().expect("read"));
    }
}
