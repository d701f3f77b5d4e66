//! RGB colour used to fill rectangles.
//!
//! Colours enter the program as `#RRGGBB` strings (CLI flags, config and the
//! metadata file) and are parsed once into a [`Color`]. Everything past that
//! point works with the RGB triplet.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// An RGB colour with one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

/// Error returned when a string is not a `#RRGGBB` colour.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid colour '{input}': expected #RRGGBB")]
pub struct ColorParseError {
    /// The rejected input
    pub input: String,
}

impl Color {
    /// Opaque black, the default rectangle colour.
    pub const BLACK: Color = Color::new(0, 0, 0);

    /// Create a colour from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hexadecimal colour.
    ///
    /// The leading `#` is optional and digits are case-insensitive, so
    /// `#550000`, `550000` and `#55aaFF` are all accepted.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError {
            input: hex.to_string(),
        };

        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };

        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Format as an uppercase `#RRGGBB` string.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Convert to the pixel type used by the image buffers.
    pub fn to_rgb(self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(pixel: image::Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self::new(r, g, b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_dark_red() {
        assert_eq!(Color::from_hex("#550000").unwrap(), Color::new(85, 0, 0));
    }

    #[test]
    fn test_from_hex_without_hash_and_mixed_case() {
        assert_eq!(Color::from_hex("55aaFF").unwrap(), Color::new(0x55, 0xAA, 0xFF));
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Color::from_hex("#55000").is_err());
        assert!(Color::from_hex("#5500000").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn test_to_hex_is_uppercase() {
        assert_eq!(Color::new(0xab, 0x01, 0xff).to_hex(), "#AB01FF");
        assert_eq!(Color::BLACK.to_string(), "#000000");
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let json = serde_json::to_string(&Color::new(85, 0, 0)).unwrap();
        assert_eq!(json, "\"#550000\"");

        let color: Color = serde_json::from_str("\"#00ff00\"").unwrap();
        assert_eq!(color, Color::new(0, 255, 0));

        assert!(serde_json::from_str::<Color>("\"green\"").is_err());
    }
}
