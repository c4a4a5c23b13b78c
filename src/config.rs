//! Application configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::light::WizTransport;

type Result<T> = std::result::Result<T, Error>;

const APP_DIR: &str = "wiz-scenes";

/// Settings read from `config.json`.
///
/// Every key is optional; missing keys take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding bulbs and scenes.
    pub db_path: PathBuf,
    pub log_file: PathBuf,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    /// Where `scene export` writes when no path is given.
    pub export_path: PathBuf,
    pub discovery_timeout_secs: u64,
    pub command_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        AppConfig {
            db_path: data_dir.join("wiz-scenes.db"),
            log_file: data_dir.join("wiz-scenes.log"),
            log_level: "info".to_string(),
            export_path: PathBuf::from("scenes-export.json"),
            discovery_timeout_secs: 3,
            command_timeout_ms: 1000,
        }
    }
}

impl AppConfig {
    /// `<config dir>/wiz-scenes/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push(APP_DIR);
            path.push("config.json");
            path
        })
    }

    /// Read the config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text, path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::file(path, e)),
        }
    }

    pub fn from_json(text: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            err,
        })
    }

    /// Build the UDP transport with the configured timeouts.
    pub fn transport(&self) -> WizTransport {
        WizTransport::new(
            Duration::from_secs(self.discovery_timeout_secs),
            Duration::from_millis(self.command_timeout_ms),
        )
    }
}
