//! Error taxonomy for everything that is loaded or validated before the first tick.
//!
//! The simulation itself never fails once running; all fallible work happens at
//! startup (or on reload) and surfaces as a [`ConfigError`].

use std::path::PathBuf;

use thiserror::Error;

use crate::pose::{CharacterState, Direction};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{what} validation failed: {reason}")]
    Invalid { what: &'static str, reason: String },
    #[error("animation table has no entry for ({state}, {direction})")]
    MissingAnimation {
        state: CharacterState,
        direction: Direction,
    },
    #[error("animation table entry ({state}, {direction}) has no frames")]
    EmptySequence {
        state: CharacterState,
        direction: Direction,
    },
}

impl ConfigError {
    pub fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            what,
            reason: reason.into(),
        }
    }
}

/// Read a JSON file and deserialize it, tagging failures with the path.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_message_names_the_subject() {
        let err = ConfigError::invalid("Scene", "layers array is empty");
        assert_eq!(
            err.to_string(),
            "Scene validation failed: layers array is empty"
        );
    }

    #[test]
    fn missing_file_reports_io_error() {
        let path = std::env::temp_dir().join("scroll_core_definitely_missing.json");
        let err = read_json::<serde_json::Value>(&path).expect_err("missing file should fail");
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn missing_animation_message_names_pair() {
        let err = ConfigError::MissingAnimation {
            state: CharacterState::InAir,
            direction: Direction::NorthWest,
        };
        assert!(err.to_string().contains("(in_air, NW)"));
    }
}
