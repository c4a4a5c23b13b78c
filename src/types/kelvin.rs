//! Color temperature accepted by WiZ bulbs.

use serde::{Deserialize, Serialize};

/// White-light temperature in Kelvin, always within 1000K..=8000K.
///
/// Preset temperatures outside the range the firmware accepts are pulled to
/// the nearest bound rather than rejected, so "dim" at 1700K passes through
/// unchanged while a hypothetical 9000K preset is sent as 8000K.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Kelvin {
    pub(crate) kelvin: u16,
}

impl Kelvin {
    const MIN: u16 = 1000;
    const MAX: u16 = 8000;

    pub fn kelvin(&self) -> u16 {
        self.kelvin
    }

    /// # Examples
    ///
    /// ```
    /// use wiz_scenes::Kelvin;
    ///
    /// assert_eq!(Kelvin::clamped(2700).kelvin(), 2700);
    /// assert_eq!(Kelvin::clamped(500).kelvin(), 1000);
    /// assert_eq!(Kelvin::clamped(9000).kelvin(), 8000);
    /// ```
    pub fn clamped(kelvin: u16) -> Self {
        Kelvin {
            kelvin: kelvin.clamp(Self::MIN, Self::MAX),
        }
    }

    pub fn in_range(kelvin: u16) -> bool {
        (Self::MIN..=Self::MAX).contains(&kelvin)
    }
}
