// src/color.rs

//! Defines the `Color` value type, the 16-entry `NamedColor` palette and
//! conversions between them.
//!
//! Colors are plain immutable values with four normalized components. Two
//! colors are the same color exactly when their components compare equal; the
//! renderer relies on this when deciding whether a cell changed.

use serde::{Deserialize, Serialize};

/// An RGBA color with each component in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::rgba(0.5, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::rgba(0.0, 0.5, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgba(0.5, 0.5, 0.0, 1.0);
    pub const BLUE: Color = Color::rgba(0.0, 0.0, 0.5, 1.0);
    pub const MAGENTA: Color = Color::rgba(0.5, 0.0, 0.5, 1.0);
    pub const CYAN: Color = Color::rgba(0.0, 0.5, 0.5, 1.0);
    pub const WHITE: Color = Color::rgba(0.75, 0.75, 0.75, 1.0);
    pub const BRIGHT_BLACK: Color = Color::rgba(0.5, 0.5, 0.5, 1.0);
    pub const BRIGHT_RED: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);
    pub const BRIGHT_GREEN: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);
    pub const BRIGHT_YELLOW: Color = Color::rgba(1.0, 1.0, 0.0, 1.0);
    pub const BRIGHT_BLUE: Color = Color::rgba(0.0, 0.0, 1.0, 1.0);
    pub const BRIGHT_MAGENTA: Color = Color::rgba(1.0, 0.0, 1.0, 1.0);
    pub const BRIGHT_CYAN: Color = Color::rgba(0.0, 1.0, 1.0, 1.0);
    pub const BRIGHT_WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    /// Builds a color from already-normalized components.
    ///
    /// Used for the palette constants; prefer [`Color::new`] for values that
    /// come from user input.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// Builds a color, clamping every component into `[0, 1]`.
    /// NaN components become 0.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color {
            r: normalize(r),
            g: normalize(g),
            b: normalize(b),
            a: normalize(a),
        }
    }

    /// This color with every component clamped into `[0, 1]`, NaN as 0.
    pub fn normalized(self) -> Self {
        Color::new(self.r, self.g, self.b, self.a)
    }

    /// Builds an opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Color::rgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        )
    }

    /// Converts to 8-bit channels, rounding to the nearest step.
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            to_channel(self.r),
            to_channel(self.g),
            to_channel(self.b),
            to_channel(self.a),
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

fn normalize(component: f32) -> f32 {
    if component.is_nan() {
        0.0
    } else {
        component.clamp(0.0, 1.0)
    }
}

fn to_channel(component: f32) -> u8 {
    (normalize(component) * 255.0).round() as u8
}

/// The 16 palette entries: 8 base colors and their bright variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NamedColor {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,       // Light grey
    BrightBlack = 8, // Dark grey
    BrightRed = 9,
    BrightGreen = 10,
    BrightYellow = 11,
    BrightBlue = 12,
    BrightMagenta = 13,
    BrightCyan = 14,
    BrightWhite = 15,
}

impl NamedColor {
    /// All entries in palette index order.
    pub const ALL: [NamedColor; 16] = [
        NamedColor::Black,
        NamedColor::Red,
        NamedColor::Green,
        NamedColor::Yellow,
        NamedColor::Blue,
        NamedColor::Magenta,
        NamedColor::Cyan,
        NamedColor::White,
        NamedColor::BrightBlack,
        NamedColor::BrightRed,
        NamedColor::BrightGreen,
        NamedColor::BrightYellow,
        NamedColor::BrightBlue,
        NamedColor::BrightMagenta,
        NamedColor::BrightCyan,
        NamedColor::BrightWhite,
    ];

    /// Looks up a palette entry by index (0-15).
    pub fn from_index(idx: u8) -> Option<Self> {
        Self::ALL.get(usize::from(idx)).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// The bright counterpart of a base color; bright colors map to themselves.
    pub fn bright(self) -> Self {
        match self as u8 {
            idx @ 0..=7 => Self::ALL[usize::from(idx) + 8],
            _ => self,
        }
    }

    pub fn to_color(self) -> Color {
        match self {
            NamedColor::Black => Color::BLACK,
            NamedColor::Red => Color::RED,
            NamedColor::Green => Color::GREEN,
            NamedColor::Yellow => Color::YELLOW,
            NamedColor::Blue => Color::BLUE,
            NamedColor::Magenta => Color::MAGENTA,
            NamedColor::Cyan => Color::CYAN,
            NamedColor::White => Color::WHITE,
            NamedColor::BrightBlack => Color::BRIGHT_BLACK,
            NamedColor::BrightRed => Color::BRIGHT_RED,
            NamedColor::BrightGreen => Color::BRIGHT_GREEN,
            NamedColor::BrightYellow => Color::BRIGHT_YELLOW,
            NamedColor::BrightBlue => Color::BRIGHT_BLUE,
            NamedColor::BrightMagenta => Color::BRIGHT_MAGENTA,
            NamedColor::BrightCyan => Color::BRIGHT_CYAN,
            NamedColor::BrightWhite => Color::BRIGHT_WHITE,
        }
    }
}

impl From<NamedColor> for Color {
    fn from(named: NamedColor) -> Self {
        named.to_color()
    }
}

/// A color as written in configuration: either a palette name or explicit components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaletteColor {
    Named(NamedColor),
    Custom(Color),
}

impl PaletteColor {
    pub fn resolve(self) -> Color {
        match self {
            PaletteColor::Named(named) => named.to_color(),
            PaletteColor::Custom(color) => color.normalized(),
        }
    }
}

impl From<NamedColor> for PaletteColor {
    fn from(named: NamedColor) -> Self {
        PaletteColor::Named(named)
    }
}
