//! Color temperature control.

use serde::{Deserialize, Serialize};

/// Color temperature in Kelvin, always within 2200K to 6500K.
///
/// Lower values produce warmer (more yellow/orange) light, while higher
/// values produce cooler (more blue) light. Typical values:
/// - 2700K: Warm white (incandescent-like)
/// - 4000K: Neutral white
/// - 6500K: Daylight
///
/// (De)serializes as a plain number, clamped on the way in.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(from = "u16", into = "u16")]
pub struct Kelvin {
    pub(crate) kelvin: u16,
}

impl Default for Kelvin {
    fn default() -> Self {
        Self::new()
    }
}

impl Kelvin {
    pub const MIN: u16 = 2200;
    pub const MAX: u16 = 6500;

    /// The warmest supported temperature.
    ///
    /// # Examples
    ///
    /// ```
    /// use cwiz::Kelvin;
    ///
    /// assert_eq!(Kelvin::new().kelvin(), 2200);
    /// ```
    pub fn new() -> Self {
        Kelvin { kelvin: Self::MIN }
    }

    /// Get the kelvin value.
    pub fn kelvin(&self) -> u16 {
        self.kelvin
    }

    /// Clamp `kelvin` into 2200-6500.
    ///
    /// # Examples
    ///
    /// ```
    /// use cwiz::Kelvin;
    ///
    /// assert_eq!(Kelvin::clamped(1000).kelvin(), 2200);
    /// assert_eq!(Kelvin::clamped(4000).kelvin(), 4000);
    /// assert_eq!(Kelvin::clamped(8000).kelvin(), 6500);
    /// ```
    pub fn clamped(kelvin: u16) -> Self {
        Kelvin {
            kelvin: kelvin.clamp(Self::MIN, Self::MAX),
        }
    }

    pub(crate) fn from_reading(value: i64) -> Self {
        Kelvin {
            kelvin: value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u16,
        }
    }
}

impl From<u16> for Kelvin {
    fn from(kelvin: u16) -> Self {
        Self::clamped(kelvin)
    }
}

impl From<Kelvin> for u16 {
    fn from(kelvin: Kelvin) -> Self {
        kelvin.kelvin
    }
}
