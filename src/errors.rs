use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use crate::executor::BulbFailure;
use crate::scene::ImportReport;

/// All error types that can occur when managing bulbs, presets and scenes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No bulb is stored under the given name.
    #[error("No bulb with such name: {0}")]
    BulbNotFound(String),

    /// No scene is stored under the given name.
    #[error("No scene with such name: {0}")]
    SceneNotFound(String),

    /// The preset name is not part of the catalog.
    #[error("No preset with such name: {0}")]
    PresetNotFound(String),

    #[error("Bulb with this name already exists: {0}")]
    DuplicateBulbName(String),

    #[error("Scene with this name already exists: {0}")]
    DuplicateSceneName(String),

    /// A scene would have been saved without a single bulb in it.
    #[error("Cannot save an empty scene: {0}")]
    EmptyScene(String),

    #[error("No scenes to export")]
    NothingToExport,

    /// A scene cannot be composed because no bulbs are stored.
    #[error("No bulbs to add to a scene")]
    NoBulbs,

    #[error("No bulbs are discoverable")]
    NoBulbsDiscoverable,

    #[error("No new bulbs to add")]
    NoNewBulbs,

    /// The import document could not be parsed.
    #[error("Corrupted data in {source_name}: {err}")]
    CorruptData {
        source_name: String,
        err: serde_json::Error,
    },

    /// The import finished but skipped scenes or added nothing.
    #[error("{0}")]
    ImportIssues(ImportReport),

    /// The bulb is known but did not answer the command.
    #[error("Bulb {bulb} is unavailable: {source}")]
    Unavailable {
        bulb: String,
        #[source]
        source: Box<Error>,
    },

    /// A scene was applied but at least one of its bulbs could not be set.
    #[error("Some bulbs were unavailable: {}", format_failures(.0))]
    PartialFailure(Vec<BulbFailure>),

    /// The address cannot be used for a new bulb.
    #[error("bulb address {ip} is invalid because it is {reason}")]
    InvalidAddress { ip: String, reason: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// A network socket operation failed while communicating with a bulb.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// Attempted to send a [`crate::Payload`] with no attributes set.
    #[error("invalid payload; no attributes set")]
    NoAttribute,

    /// The UDP response from a bulb contained invalid UTF-8.
    #[error("utf8 decoding error: {0:?}")]
    Utf8Decode(FromUtf8Error),

    #[error("cannot access {}: {err}", path.display())]
    File { path: PathBuf, err: std::io::Error },

    /// Reading an answer from the user failed.
    #[error("prompt failed: {0}")]
    Prompt(std::io::Error),

    #[error("invalid config {}: {err}", path.display())]
    Config {
        path: PathBuf,
        err: serde_json::Error,
    },
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new invalid address error
    pub fn invalid_address(ip: &str, reason: &str) -> Self {
        Error::InvalidAddress {
            ip: ip.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unavailable(bulb: &str, source: Error) -> Self {
        Error::Unavailable {
            bulb: bulb.to_string(),
            source: Box::new(source),
        }
    }

    pub fn file(path: &Path, err: std::io::Error) -> Self {
        Error::File {
            path: path.to_path_buf(),
            err,
        }
    }

    /// True for the "named entity is absent" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::BulbNotFound(_) | Error::SceneNotFound(_) | Error::PresetNotFound(_)
        )
    }
}

fn format_failures(failures: &[BulbFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
