//! Built-in WiZ light modes used by the indicator effect.

use serde::{Deserialize, Serialize};

/// Firmware scene identifiers understood by `setPilot`.
///
/// Only the modes this tool drives are listed; they are unrelated to the
/// user-defined scenes kept in the database.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SceneMode {
    WarmWhite = 11,
    Alarm = 35,
}

impl SceneMode {
    pub fn id(&self) -> u16 {
        *self as u16
    }
}
