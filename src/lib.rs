//! ascii-screen library crate.
//!
//! A fixed-size grid of code-page-437 glyphs drawn through a glyph atlas, with
//! a renderer that only redraws cells changed since the previous frame.

pub mod atlas;
pub mod backends;
pub mod color;
pub mod config;
pub mod cp437;
pub mod display;
pub mod error;
pub mod glyph;
pub mod grid;
pub mod renderer;
pub mod screen;

pub use atlas::{AtlasGeometry, AtlasImage, GlyphAtlas};
pub use backends::{Backend, RenderCommand};
pub use color::{Color, NamedColor};
pub use display::Screen;
pub use error::ScreenError;
pub use glyph::{Cell, GlyphTile};
pub use screen::{AsciiScreen, TileTransformer};
