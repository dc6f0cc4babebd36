// src/glyph.rs

//! Defines the `Cell` type stored in every grid position and the `GlyphTile`
//! describing where a character code lives inside the glyph atlas.
//!
//! Color definitions (`Color`, `NamedColor`) are found in the `crate::color` module.

use std::fmt;

use crate::color::Color;

/// Number of addressable character codes.
pub const GLYPH_COUNT: usize = 256;

/// The character written by a full-screen clear.
pub const SPACE: u8 = b' ';

/// One grid position: a code-page-437 character code plus its colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Character code, 0-255.
    pub character: u8,
    pub foreground: Color,
    pub background: Color,
}

/// Default cell: a space drawn white-on-black.
pub const DEFAULT_CELL: Cell = Cell {
    character: SPACE,
    foreground: Color::WHITE,
    background: Color::BLACK,
};

impl Cell {
    pub const fn new(character: u8, foreground: Color, background: Color) -> Self {
        Cell {
            character,
            foreground,
            background,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        DEFAULT_CELL
    }
}

// Prints the cell's character as its code-page-437 rendition.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::cp437::to_char(self.character))
    }
}

/// The sub-rectangle of the atlas image holding the bitmap for one character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphTile {
    pub code: u8,
    /// Left edge of the tile in atlas pixels.
    pub atlas_x: u32,
    /// Top edge of the tile in atlas pixels.
    pub atlas_y: u32,
    pub width: u32,
    pub height: u32,
}
