use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A 24-bit RGB color written as `#rrggbb` (or `0xrrggbb`) in option files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(u32);

impl HexColor {
    /// White (`#ffffff`).
    pub const WHITE: Self = Self(0x00ff_ffff);

    /// Wrap a packed `0xRRGGBB` value. Bits above 24 are discarded.
    #[must_use]
    pub const fn new(rgb: u32) -> Self {
        Self(rgb & 0x00ff_ffff)
    }

    /// Packed `0xRRGGBB` value.
    #[must_use]
    pub const fn rgb(self) -> u32 {
        self.0
    }

    /// Channels as sRGB-encoded floats in `[0, 1]`.
    #[must_use]
    pub fn to_srgb(self) -> [f32; 3] {
        let [_, r, g, b] = self.0.to_be_bytes();
        [r, g, b].map(|c| f32::from(c) / 255.0)
    }

    /// Channels converted to linear light for shading.
    #[must_use]
    pub fn to_linear(self) -> [f32; 3] {
        self.to_srgb().map(srgb_to_linear)
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl FromStr for HexColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .unwrap_or(s);
        if digits.len() != 6 {
            return Err(format!("expected 6 hex digits, got {s:?}"));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::new)
            .map_err(|e| format!("invalid hex color {s:?}: {e}"))
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HexColor> for String {
    fn from(c: HexColor) -> Self {
        c.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_prefixes() {
        assert_eq!("#dddddd".parse::<HexColor>(), Ok(HexColor::new(0xdddddd)));
        assert_eq!("0x404040".parse::<HexColor>(), Ok(HexColor::new(0x404040)));
        assert_eq!("ffffff".parse::<HexColor>(), Ok(HexColor::WHITE));
    }

    #[test]
    fn rejects_short_or_non_hex() {
        assert!("#fff".parse::<HexColor>().is_err());
        assert!("#gggggg".parse::<HexColor>().is_err());
    }

    #[test]
    fn display_is_lowercase_hash_form() {
        assert_eq!(HexColor::new(0x00ABCD).to_string(), "#00abcd");
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        assert_eq!(HexColor::new(0).to_linear(), [0.0, 0.0, 0.0]);
        let white = HexColor::WHITE.to_linear();
        for c in white {
            assert!((c - 1.0).abs() < 1e-6);
        }
        // sRGB mid-grey is darker in linear space
        let grey = HexColor::new(0x808080).to_linear()[0];
        assert!(grey > 0.2 && grey < 0.23);
    }
}
