//! Portable state bundle format.
//!
//! A bundle is a JSON document carrying one snapshot and its metadata:
//!
//! ```json
//! { "version": 1, "lineage": "…", "serial": 3, "state": { … } }
//! ```
//!
//! The payload is carried as-is. Only the envelope version is checked;
//! payload content is never upgraded here.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::state::error::{Result, StateError};
use crate::state::snapshot::{State, StateFile};

/// Newest bundle format version this crate reads and the one it writes.
pub const STATE_FORMAT_VERSION: u64 = 1;

/// Suffix of the temporary sibling used for atomic writes.
const TEMP_SUFFIX: &str = ".tmp";

/// On-disk shape of a bundle.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    #[serde(default = "default_format_version")]
    version: u64,

    #[serde(default)]
    lineage: String,

    #[serde(default)]
    serial: u64,

    #[serde(default)]
    state: State,
}

fn default_format_version() -> u64 {
    STATE_FORMAT_VERSION
}

impl Envelope {
    fn into_state_file(self) -> Result<StateFile> {
        if self.version == 0 {
            return Err(StateError::InvalidStateFile {
                reason: "format version 0 is not valid".to_string(),
            });
        }
        if self.version > STATE_FORMAT_VERSION {
            return Err(StateError::UnsupportedFormatVersion {
                version: self.version,
                supported: STATE_FORMAT_VERSION,
            });
        }
        Ok(StateFile::new(self.state, self.lineage, self.serial))
    }
}

/// Decode a bundle from `reader`.
pub fn read<R: Read>(reader: R) -> Result<StateFile> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    if !value.is_object() {
        return Err(StateError::InvalidStateFile {
            reason: "top level is not a JSON object".to_string(),
        });
    }
    let envelope: Envelope = serde_json::from_value(value)?;
    envelope.into_state_file()
}

/// Decode a bundle from the file at `path`.
pub fn read_path(path: &Path) -> Result<StateFile> {
    let content = fs::read(path).map_err(|e| StateError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    read(content.as_slice())
}

/// Encode `file` into `writer`, pretty-printed with a trailing newline.
pub fn write<W: Write>(mut writer: W, file: &StateFile) -> Result<()> {
    let envelope = Envelope {
        version: STATE_FORMAT_VERSION,
        lineage: file.lineage.clone(),
        serial: file.serial,
        state: file.state.clone(),
    };
    serde_json::to_writer_pretty(&mut writer, &envelope)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Encode `file` to `path`, replacing any existing file atomically.
///
/// The bundle is written to a temporary sibling and renamed into place, so
/// readers see either the old or the new bundle.
pub fn write_path(path: &Path, file: &StateFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| StateError::DirectoryCreateError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let temp_path = temp_path_for(path);
    let mut content = Vec::new();
    write(&mut content, file)?;

    fs::write(&temp_path, content).map_err(|e| StateError::FileWriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StateError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_full_bundle() {
        let input = br#"{"version": 1, "lineage": "abc", "serial": 7, "state": {"k": "v"}}"#;
        let file = read(&input[..]).unwrap();
        assert_eq!(file.lineage, "abc");
        assert_eq!(file.serial, 7);
        assert_eq!(file.state.as_value(), &json!({"k": "v"}));
    }

    #[test]
    fn test_read_legacy_bundle_defaults() {
        let file = read(&br#"{"state": {"k": 1}}"#[..]).unwrap();
        assert_eq!(file.lineage, "");
        assert_eq!(file.serial, 0);
        assert!(!file.state.is_empty());

        let file = read(&b"{}"[..]).unwrap();
        assert!(file.state.is_empty());
    }

    #[test]
    fn test_read_rejects_future_version() {
        let result = read(&br#"{"version": 2, "lineage": "a", "serial": 1}"#[..]);
        match result {
            Err(StateError::UnsupportedFormatVersion { version, supported }) => {
                assert_eq!(version, 2);
                assert_eq!(supported, STATE_FORMAT_VERSION);
            }
            other => panic!("Expected UnsupportedFormatVersion, got {:?}", other),
        }
    }

    #[test]
    fn test_read_rejects_malformed_input() {
        assert!(matches!(
            read(&br#"{"version": 0}"#[..]),
            Err(StateError::InvalidStateFile { .. })
        ));
        assert!(matches!(
            read(&b"[1, 2]"[..]),
            Err(StateError::InvalidStateFile { .. })
        ));
        assert!(matches!(read(&b"{not json"[..]), Err(StateError::Json(_))));
        assert!(matches!(
            read(&br#"{"serial": -1}"#[..]),
            Err(StateError::Json(_))
        ));
    }

    #[test]
    fn test_write_path_replaces_and_cleans_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("state.json");

        write_path(&path, &StateFile::new(State::new(json!({"a": 1})), "lin", 1)).unwrap();
        write_path(&path, &StateFile::new(State::new(json!({"a": 2})), "lin", 2)).unwrap();

        let file = read_path(&path).unwrap();
        assert_eq!(file.serial, 2);
        assert_eq!(file.state.as_value(), &json!({"a": 2}));
        assert!(!temp_path_for(&path).exists());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));
        assert!(text.contains("\"version\": 1"));
    }

    #[test]
    fn test_read_path_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = read_path(&temp_dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_READ_ERROR");
    }
}
