//! `setPilot` parameters for WiZ lights.

use serde::{Deserialize, Serialize};

use crate::preset::ColorMode;
use crate::types::{Brightness, Color, Kelvin, SceneMode};

/// A configuration payload to send to WiZ lights.
///
/// Everything set on the payload is applied by the bulb in a single command,
/// which is how a preset changes colour and brightness atomically.
///
/// ```
/// use wiz_scenes::{Brightness, Kelvin, Payload};
///
/// let mut payload = Payload::new();
/// assert!(!payload.is_valid());
///
/// payload.brightness(&Brightness::clamped(80));
/// payload.temp(&Kelvin::clamped(2700));
/// assert!(payload.is_valid());
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Payload {
    #[serde(rename = "sceneId")]
    pub(crate) scene: Option<u16>,
    pub(crate) dimming: Option<u8>,
    pub(crate) temp: Option<u16>,
    #[serde(rename = "r")]
    pub(crate) red: Option<u8>,
    #[serde(rename = "g")]
    pub(crate) green: Option<u8>,
    #[serde(rename = "b")]
    pub(crate) blue: Option<u8>,
}

impl Payload {
    /// Create a new empty payload.
    ///
    /// At least one attribute must be set for the payload to be valid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the payload for a lit preset.
    ///
    /// Brightness and colour temperature are clamped to what the bulb accepts.
    pub fn lighting(brightness: u8, mode: &ColorMode) -> Self {
        let mut payload = Payload::new();
        payload.brightness(&Brightness::clamped(brightness));
        match mode {
            ColorMode::Temperature(kelvin) => payload.temp(&Kelvin::clamped(*kelvin)),
            ColorMode::Rgb(color) => payload.color(color),
        }
        payload
    }

    /// Check if this payload contains at least one valid attribute.
    pub fn is_valid(&self) -> bool {
        self.scene.is_some()
            || self.dimming.is_some()
            || self.temp.is_some()
            || (self.red.is_some() && self.green.is_some() && self.blue.is_some())
    }

    pub fn scene(&mut self, scene: &SceneMode) {
        self.scene = Some(scene.id());
    }

    pub fn brightness(&mut self, brightness: &Brightness) {
        self.dimming = Some(brightness.value);
    }

    /// Set the color temperature.
    pub fn temp(&mut self, temp: &Kelvin) {
        self.temp = Some(temp.kelvin);
    }

    /// Set the RGB color.
    pub fn color(&mut self, color: &Color) {
        self.red = Some(color.red);
        self.green = Some(color.green);
        self.blue = Some(color.blue);
    }
}

impl From<&SceneMode> for Payload {
    fn from(scene: &SceneMode) -> Self {
        let mut p = Payload::new();
        p.scene(scene);
        p
    }
}
