//! Brightness control for WiZ lights.

use serde::{Deserialize, Serialize};

/// Brightness level from 10 to 100 percent.
///
/// Every constructor clamps, so a `Brightness` is always in range. It
/// (de)serializes as a plain number and is clamped on the way in.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(from = "u8", into = "u8")]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Default for Brightness {
    fn default() -> Self {
        Self::new()
    }
}

impl Brightness {
    pub const MIN: u8 = 10;
    pub const MAX: u8 = 100;

    /// Full brightness.
    pub fn new() -> Self {
        Brightness { value: Self::MAX }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Clamp `value` into 10-100.
    ///
    /// # Examples
    ///
    /// ```
    /// use cwiz::Brightness;
    ///
    /// assert_eq!(Brightness::clamped(5).value(), 10);
    /// assert_eq!(Brightness::clamped(55).value(), 55);
    /// assert_eq!(Brightness::clamped(255).value(), 100);
    /// ```
    pub fn clamped(value: u8) -> Self {
        Brightness {
            value: value.clamp(Self::MIN, Self::MAX),
        }
    }

    /// Clamp a device-reported reading.
    pub(crate) fn from_reading(value: i64) -> Self {
        Brightness {
            value: value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8,
        }
    }
}

impl From<u8> for Brightness {
    fn from(value: u8) -> Self {
        Self::clamped(value)
    }
}

impl From<Brightness> for u8 {
    fn from(brightness: Brightness) -> Self {
        brightness.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_in_range_and_idempotent() {
        for raw in 0..=u8::MAX {
            let once = Brightness::clamped(raw).value();
            assert!((Brightness::MIN..=Brightness::MAX).contains(&once));
            assert_eq!(Brightness::clamped(once).value(), once);
        }
    }

    #[test]
    fn test_from_reading() {
        assert_eq!(Brightness::from_reading(-4).value(), 10);
        assert_eq!(Brightness::from_reading(70).value(), 70);
        assert_eq!(Brightness::from_reading(1_000).value(), 100);
    }

    #[test]
    fn test_deserialize_clamps() {
        let low: Brightness = serde_json::from_str("5").unwrap();
        assert_eq!(low.value(), 10);
        let high: Brightness = serde_json::from_str("200").unwrap();
        assert_eq!(high.value(), 100);
        assert_eq!(serde_json::to_string(&Brightness::clamped(42)).unwrap(), "42");
    }
}
