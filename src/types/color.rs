//! RGB and five-channel color representations.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::Error;
use crate::types::Kelvin;

/// An RGB color with red, green, and blue components (0-255 each).
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub(crate) red: u8,
    pub(crate) green: u8,
    pub(crate) blue: u8,
}

impl Color {
    /// Create a color with the given RGB values.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    /// Parse a `RRGGBB` hex string, with or without a leading `#`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cwiz::Color;
    ///
    /// assert_eq!(Color::from_hex("#FF8000").unwrap(), Color::rgb(255, 128, 0));
    /// assert_eq!(Color::from_hex("ff8000").unwrap(), Color::rgb(255, 128, 0));
    /// assert!(Color::from_hex("FF800").is_err());
    /// assert!(Color::from_hex("GG8000").is_err());
    /// ```
    pub fn from_hex(text: &str) -> Result<Self, Error> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidColorString(text.to_string()));
        }

        let channel = |at: usize| {
            u8::from_str_radix(&digits[at..at + 2], 16)
                .map_err(|_| Error::InvalidColorString(text.to_string()))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parse from a hex string (e.g., "#FF8000").
    fn from_str(s: &str) -> Result<Self, Error> {
        Self::from_hex(s)
    }
}

/// An RGBWW color (RGB + cool white + warm white, 0-255 each).
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ColorRGBWW {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub cool: u8,
    pub warm: u8,
}

impl ColorRGBWW {
    pub fn new(red: u8, green: u8, blue: u8, cool: u8, warm: u8) -> Self {
        Self {
            red,
            green,
            blue,
            cool,
            warm,
        }
    }

    /// Combine an RGB color with a white balance derived from `kelvin`.
    ///
    /// RGB passes through unchanged. The white channels are interpolated
    /// linearly across the supported temperature range with integer
    /// arithmetic, rounding half up; `cool + warm` is always 255.
    ///
    /// # Examples
    ///
    /// ```
    /// use cwiz::{Color, ColorRGBWW};
    ///
    /// let c = ColorRGBWW::from_rgb_and_temperature(Color::rgb(1, 2, 3), 2200);
    /// assert_eq!((c.red, c.green, c.blue, c.cool, c.warm), (1, 2, 3, 0, 255));
    ///
    /// let c = ColorRGBWW::from_rgb_and_temperature(Color::rgb(1, 2, 3), 6500);
    /// assert_eq!((c.cool, c.warm), (255, 0));
    /// ```
    pub fn from_rgb_and_temperature(color: Color, kelvin: u16) -> Self {
        let cool = if kelvin <= Kelvin::MIN {
            0
        } else if kelvin >= Kelvin::MAX {
            u8::MAX
        } else {
            let range = u32::from(Kelvin::MAX - Kelvin::MIN);
            let offset = u32::from(kelvin - Kelvin::MIN);
            ((offset * 255 + range / 2) / range) as u8
        };

        Self::new(color.red, color.green, color.blue, cool, u8::MAX - cool)
    }

    pub fn to_rgb(&self) -> Color {
        Color::rgb(self.red, self.green, self.blue)
    }
}

/// Parse a hex color string. See [`Color::from_hex`].
pub fn hex_to_rgb(text: &str) -> Result<Color, Error> {
    Color::from_hex(text)
}

/// Expand an RGB color to five channels for a white temperature. See
/// [`ColorRGBWW::from_rgb_and_temperature`].
pub fn rgb_to_rgbcw(color: Color, kelvin: u16) -> ColorRGBWW {
    ColorRGBWW::from_rgb_and_temperature(color, kelvin)
}
