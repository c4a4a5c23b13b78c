//! Brightness control for WiZ lights.

use serde::{Deserialize, Serialize};

/// Brightness level accepted by a WiZ bulb, from 10 to 100 percent.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Brightness {
    const MIN: u8 = 10;
    const MAX: u8 = 100;

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Pulls a preset brightness (1-100) into the range the bulb accepts.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiz_scenes::Brightness;
    ///
    /// assert_eq!(Brightness::clamped(1).value(), 10);
    /// assert_eq!(Brightness::clamped(55).value(), 55);
    /// assert_eq!(Brightness::clamped(250).value(), 100);
    /// ```
    pub fn clamped(value: u8) -> Self {
        Brightness {
            value: value.clamp(Self::MIN, Self::MAX),
        }
    }
}
