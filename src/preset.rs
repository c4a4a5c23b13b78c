//! Fixed catalog of lighting presets.

use std::fmt;

use strum_macros::Display;

use crate::errors::Error;
use crate::types::Color;

type Result<T> = std::result::Result<T, Error>;

/// How a lit preset colours the bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ColorMode {
    /// White light at a colour temperature in Kelvin.
    #[strum(to_string = "CT")]
    Temperature(u16),
    /// Full colour.
    #[strum(to_string = "RGB")]
    Rgb(Color),
}

/// A named lighting configuration.
///
/// A brightness of 0 means "off" and carries no colour mode; every other
/// preset has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    brightness: u8,
    mode: Option<ColorMode>,
}

impl Preset {
    const fn off() -> Self {
        Preset {
            brightness: 0,
            mode: None,
        }
    }

    const fn temperature(brightness: u8, kelvin: u16) -> Self {
        Preset {
            brightness,
            mode: Some(ColorMode::Temperature(kelvin)),
        }
    }

    const fn rgb(brightness: u8, color: Color) -> Self {
        Preset {
            brightness,
            mode: Some(ColorMode::Rgb(color)),
        }
    }

    /// Brightness in percent, 0 meaning off.
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn mode(&self) -> Option<&ColorMode> {
        self.mode.as_ref()
    }

    pub fn is_off(&self) -> bool {
        self.brightness == 0
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mode {
            None => write!(f, "off"),
            Some(mode @ ColorMode::Temperature(kelvin)) => {
                write!(f, "{mode} {kelvin}K at {}%", self.brightness)
            }
            Some(mode @ ColorMode::Rgb(color)) => {
                write!(f, "{mode} {color} at {}%", self.brightness)
            }
        }
    }
}

const CATALOG: [(&str, Preset); 9] = [
    ("off", Preset::off()),
    ("dim", Preset::temperature(1, 1700)),
    ("warm", Preset::temperature(100, 2700)),
    ("neutral", Preset::temperature(100, 3200)),
    ("cold", Preset::temperature(100, 5000)),
    ("red", Preset::rgb(100, Color::rgb(255, 0, 0))),
    ("green", Preset::rgb(100, Color::rgb(0, 255, 0))),
    ("blue", Preset::rgb(100, Color::rgb(0, 0, 255))),
    ("red_dim", Preset::rgb(1, Color::rgb(255, 0, 0))),
];

/// The immutable preset table.
///
/// Build it once at startup and hand out references; nothing ever mutates it.
///
/// # Example
///
/// ```
/// use wiz_scenes::PresetCatalog;
///
/// let presets = PresetCatalog::new();
/// assert_eq!(presets.list()[0], "off");
/// assert!(presets.get("warm").unwrap().brightness() > 0);
/// assert!(presets.get("sparkle").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    entries: &'static [(&'static str, Preset)],
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetCatalog {
    pub fn new() -> Self {
        PresetCatalog { entries: &CATALOG }
    }

    /// Look up a preset by name.
    pub fn get(&self, name: &str) -> Result<&Preset> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, preset)| preset)
            .ok_or_else(|| Error::PresetNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| *key == name)
    }

    /// Preset names in declaration order.
    pub fn list(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(key, _)| *key).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Preset)> {
        self.entries.iter().map(|(key, preset)| (*key, preset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Kelvin;

    #[test]
    fn test_catalog_invariants() {
        let presets = PresetCatalog::new();
        for name in presets.list() {
            let preset = presets.get(name).unwrap();
            assert!(preset.brightness() <= 100, "{name}");
            assert_eq!(preset.mode().is_none(), preset.brightness() == 0, "{name}");
            if let Some(ColorMode::Temperature(kelvin)) = preset.mode() {
                assert!(Kelvin::in_range(*kelvin), "{name}");
            }
        }
    }

    #[test]
    fn test_off_preset() {
        let presets = PresetCatalog::new();
        let off = presets.get("off").unwrap();
        assert!(off.is_off());
        assert!(off.mode().is_none());
        assert_eq!(off.to_string(), "off");
    }

    #[test]
    fn test_unknown_preset() {
        let presets = PresetCatalog::new();
        let err = presets.get("disco").unwrap_err();
        assert_eq!(err, Error::PresetNotFound("disco".into()));
        assert!(err.is_not_found());
        assert!(!presets.contains("disco"));
    }

    #[test]
    fn test_list_order_is_stable() {
        let presets = PresetCatalog::new();
        assert_eq!(
            presets.list(),
            vec!["off", "dim", "warm", "neutral", "cold", "red", "green", "blue", "red_dim"]
        );
        assert_eq!(presets.list(), presets.iter().map(|(n, _)| n).collect::<Vec<_>>());
    }

    #[test]
    fn test_display() {
        let presets = PresetCatalog::new();
        assert_eq!(presets.get("warm").unwrap().to_string(), "CT 2700K at 100%");
        assert_eq!(presets.get("red_dim").unwrap().to_string(), "RGB 255,0,0 at 1%");
    }
}
