use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::SiteError;

/// Pre-order price in cents.
pub const PRE_ORDER_PRICE_CENTS: u64 = 29_900;
/// List price in cents, shown struck through next to the pre-order price.
pub const LIST_PRICE_CENTS: u64 = 34_900;

/// `29900` → `"$299.00"`
pub fn format_usd(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

pub fn pre_order_savings_cents() -> u64 {
    LIST_PRICE_CENTS.saturating_sub(PRE_ORDER_PRICE_CENTS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 解析 `#RRGGBB` 或 `RRGGBB`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingColor {
    #[default]
    Black,
    Green,
    Blue,
}

impl RingColor {
    pub const ALL: [RingColor; 3] = [RingColor::Black, RingColor::Green, RingColor::Blue];

    pub fn id(self) -> &'static str {
        match self {
            RingColor::Black => "black",
            RingColor::Green => "green",
            RingColor::Blue => "blue",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RingColor::Black => "Obsidian Black",
            RingColor::Green => "Emerald Green",
            RingColor::Blue => "Azure Blue",
        }
    }

    /// Finish color of the ring itself.
    pub fn finish(self) -> Rgb {
        match self {
            RingColor::Black => Rgb::new(0x11, 0x11, 0x11),
            RingColor::Green => Rgb::new(0x1D, 0xB9, 0x54),
            RingColor::Blue => Rgb::new(0x00, 0x70, 0xF3),
        }
    }

    /// Tint for the ambient background. Black is lifted so particles stay
    /// visible on the dark page.
    pub fn theme(self) -> Rgb {
        match self {
            RingColor::Black => Rgb::new(50, 50, 50),
            other => other.finish(),
        }
    }
}

impl fmt::Display for RingColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for RingColor {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RingColor::ALL
            .into_iter()
            .find(|color| color.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SiteError::InvalidConfigValueError {
                field: "color".to_string(),
                value: s.to_string(),
                reason: "Expected one of: black, green, blue".to_string(),
            })
    }
}

/// US ring size, 6 through 13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RingSize(u8);

impl RingSize {
    pub const MIN: u8 = 6;
    pub const MAX: u8 = 13;

    pub fn new(us_size: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&us_size).then_some(Self(us_size))
    }

    pub fn all() -> impl Iterator<Item = RingSize> {
        (Self::MIN..=Self::MAX).map(RingSize)
    }

    pub fn us(self) -> u8 {
        self.0
    }

    pub fn label(self) -> String {
        format!("US {}", self.0)
    }
}

impl fmt::Display for RingSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "US {}", self.0)
    }
}

impl FromStr for RingSize {
    type Err = SiteError;

    /// 接受 "8" 或 "US 8"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed
            .strip_prefix("US")
            .or_else(|| trimmed.strip_prefix("us"))
            .unwrap_or(trimmed)
            .trim();

        number
            .parse::<u8>()
            .ok()
            .and_then(RingSize::new)
            .ok_or_else(|| SiteError::InvalidConfigValueError {
                field: "size".to_string(),
                value: s.to_string(),
                reason: format!("Expected a US size between {} and {}", RingSize::MIN, RingSize::MAX),
            })
    }
}

impl Serialize for RingSize {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}
