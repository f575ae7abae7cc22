/*
 * mailfmt - contact color module
 *
 * Copyright 2024 mailfmt Contributors
 *
 * This file is part of mailfmt.
 *
 * mailfmt is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * mailfmt is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with mailfmt. If not, see <http://www.gnu.org/licenses/>.
 */

//! Deterministic per-contact coloring for avatars and labels.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// A 24-bit RGB color, written as `#RRGGBB`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// The fixed, order-significant palette contact names are mapped onto.
///
/// Initialized before first use and never mutated; safe for unsynchronized
/// concurrent reads from any number of threads.
pub const CONTACT_PALETTE: [Color; 8] = [
    Color::new(0xB6, 0x8B, 0x01),
    Color::new(0xCA, 0x4B, 0x14),
    Color::new(0xDB, 0x31, 0x31),
    Color::new(0xD3, 0x37, 0x81),
    Color::new(0x6B, 0x72, 0xC3),
    Color::new(0x29, 0x8B, 0xD6),
    Color::new(0x2B, 0xA0, 0x98),
    Color::new(0x85, 0x9A, 0x01),
];

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` or `#rgb` string.
    pub fn from_hex(s: &str) -> Result<Self> {
        match s {
            s if s.starts_with('#')
                && s.len() == 7
                && s.as_bytes()[1..].iter().all(u8::is_ascii_hexdigit) =>
            {
                Ok(Self::new(
                    u8::from_str_radix(&s[1..3], 16)
                        .map_err(|_| Error::new("invalid `color` value"))?,
                    u8::from_str_radix(&s[3..5], 16)
                        .map_err(|_| Error::new("invalid `color` value"))?,
                    u8::from_str_radix(&s[5..7], 16)
                        .map_err(|_| Error::new("invalid `color` value"))?,
                ))
            }
            s if s.starts_with('#')
                && s.len() == 4
                && s.as_bytes()[1..].iter().all(u8::is_ascii_hexdigit) =>
            {
                Ok(Self::new(
                    17 * u8::from_str_radix(&s[1..2], 16)
                        .map_err(|_| Error::new("invalid `color` value"))?,
                    17 * u8::from_str_radix(&s[2..3], 16)
                        .map_err(|_| Error::new("invalid `color` value"))?,
                    17 * u8::from_str_radix(&s[3..4], 16)
                        .map_err(|_| Error::new("invalid `color` value"))?,
                ))
            }
            _ => Err(Error::new("invalid `color` value")
                .set_summary(format!("{:?} is not a hexadecimal RGB color", s))),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <String>::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// Map a contact name onto [`CONTACT_PALETTE`].
///
/// The index is the sum of the name's UTF-16 code units modulo the palette
/// length, so the same name always gets the same color and nothing prevents
/// two names from sharing one. A character outside the BMP contributes its
/// two surrogate code units to the sum. The empty name maps to the first
/// palette entry.
pub fn contact_color(name: &str) -> Color {
    let sum = name
        .encode_utf16()
        .fold(0u32, |acc, unit| acc.wrapping_add(u32::from(unit)));
    CONTACT_PALETTE[(sum % CONTACT_PALETTE.len() as u32) as usize]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_contact_color_empty_name() {
        assert_eq!(contact_color(""), CONTACT_PALETTE[0]);
    }

    #[test]
    fn test_contact_color_deterministic() {
        assert_eq!(contact_color("Alice"), contact_color("Alice"));
        // 'A' + 'l' + 'i' + 'c' + 'e' == 478 == 6 (mod 8).
        assert_eq!(contact_color("Alice"), CONTACT_PALETTE[6]);
    }

    #[test]
    fn test_contact_color_expected_collisions() {
        // 'a' == 97 and 'i' == 105 are congruent mod 8.
        assert_eq!(contact_color("a"), contact_color("i"));
    }

    #[test]
    fn test_contact_color_counts_utf16_units() {
        // U+1F600 encodes as the surrogate pair 0xD83D 0xDE00; both units
        // enter the sum: (0xD83D + 0xDE00) % 8 == 5.
        assert_eq!(contact_color("\u{1F600}"), CONTACT_PALETTE[5]);
    }

    #[test]
    fn test_contact_color_palette_coverage() {
        let seen: HashSet<Color> = ('a'..='h').map(|c| contact_color(&c.to_string())).collect();
        assert_eq!(seen.len(), CONTACT_PALETTE.len());
    }

    #[test]
    fn test_color_hex_forms() {
        assert_eq!(Color::from_hex("#B68B01").unwrap(), CONTACT_PALETTE[0]);
        assert_eq!(Color::from_hex("#2ba098").unwrap(), CONTACT_PALETTE[6]);
        assert_eq!(
            Color::from_hex("#fff").unwrap(),
            Color::new(0xFF, 0xFF, 0xFF)
        );
        assert!(Color::from_hex("junk").is_err());
        assert!(Color::from_hex("#B68B0").is_err());
        assert_eq!(CONTACT_PALETTE[0].to_string(), "#B68B01");
    }

    #[test]
    fn test_color_de() {
        #[derive(Debug, Deserialize, Eq, PartialEq)]
        struct V {
            color: Color,
        }

        let v: V = toml::from_str(r##"color = "#B68B01""##).unwrap();
        assert_eq!(v.color, CONTACT_PALETTE[0]);
        let v: std::result::Result<V, _> = toml::from_str(r#"color = "brown""#);
        assert!(v.is_err());
    }
}
