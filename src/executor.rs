//! Replaying a stored scene on the bulbs.

use std::fmt;

use crate::bulb::BulbRegistry;
use crate::errors::Error;
use crate::preset::{Preset, PresetCatalog};
use crate::scene::SceneStore;
use crate::transport::Transport;

type Result<T> = std::result::Result<T, Error>;

/// Why a bulb in a scene was not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The scene names a bulb that is no longer stored.
    Removed,
    /// The bulb is stored but did not answer.
    Unreachable,
}

/// One bulb a scene could not be applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulbFailure {
    pub bulb: String,
    pub reason: FailureReason,
}

impl fmt::Display for BulbFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            FailureReason::Removed => "removed",
            FailureReason::Unreachable => "unreachable",
        };
        write!(f, "{} ({})", self.bulb, reason)
    }
}

/// Apply the scene `name` to every bulb it mentions.
///
/// All presets are resolved before any bulb is touched, so a scene naming an
/// unknown preset fails with [`Error::PresetNotFound`] and changes nothing.
/// Every bulb is then attempted in turn; bulbs that were removed or do not
/// answer are collected into [`Error::PartialFailure`] once the rest have
/// been set.
pub async fn set_scene<T: Transport>(
    scenes: &SceneStore<'_>,
    bulbs: &BulbRegistry<'_, T>,
    presets: &PresetCatalog,
    name: &str,
) -> Result<()> {
    if scenes.is_empty()? {
        return Err(Error::SceneNotFound(name.to_string()));
    }
    let settings = scenes.get(name)?;

    let plan = settings
        .iter()
        .map(|(bulb, preset)| presets.get(preset).map(|preset| (bulb.as_str(), preset)))
        .collect::<Result<Vec<(&str, &Preset)>>>()?;

    let mut failures = Vec::new();
    for (bulb, preset) in plan {
        let reason = match bulbs.apply_preset(bulb, preset).await {
            Ok(()) => continue,
            Err(Error::BulbNotFound(_)) => FailureReason::Removed,
            Err(Error::Unavailable { .. }) => FailureReason::Unreachable,
            Err(e) => return Err(e),
        };
        failures.push(BulbFailure {
            bulb: bulb.to_string(),
            reason,
        });
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::PartialFailure(failures))
    }
}
