// src/backends/mod.rs

//! The boundary between the character grid and whatever actually puts pixels
//! on screen.
//!
//! The `DiffRenderer` turns grid changes into `RenderCommand`s. A `Backend`
//! owns everything past that point: texture upload, quad batching, the
//! framebuffer and the viewport that scales the logical surface to the window.

pub mod console;
pub mod recording;

pub use console::ConsoleBackend;
pub use recording::RecordingBackend;

use anyhow::Result;

use crate::atlas::AtlasImage;
use crate::color::Color;
use crate::glyph::GlyphTile;

/// Coordinates of a character cell on the grid (0-based, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoords {
    pub x: usize,
    pub y: usize,
}

/// A rectangle on the draw surface in pixels. The surface origin is the
/// bottom-left corner, so row 0 of the grid has the largest `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One draw instruction emitted by the renderer.
///
/// Each changed cell yields a `FillRect` for its background followed by a
/// `DrawGlyph` that must be composited on top of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderCommand {
    /// A solid quad in the background color.
    FillRect {
        cell: CellCoords,
        rect: PixelRect,
        color: Color,
    },
    /// A quad sampling `tile` from the atlas mask, tinted with the foreground color.
    DrawGlyph {
        cell: CellCoords,
        rect: PixelRect,
        tile: GlyphTile,
        color: Color,
    },
}

impl RenderCommand {
    pub fn cell(&self) -> CellCoords {
        match self {
            RenderCommand::FillRect { cell, .. } | RenderCommand::DrawGlyph { cell, .. } => *cell,
        }
    }

    pub fn rect(&self) -> PixelRect {
        match self {
            RenderCommand::FillRect { rect, .. } | RenderCommand::DrawGlyph { rect, .. } => *rect,
        }
    }
}

/// Rendering and viewport collaborator used by `AsciiScreen`.
///
/// Implementations execute commands in order. An error from
/// `execute_render_commands` or `present` means the frame did not reach the
/// display; the screen then keeps its previous baseline and re-sends the same
/// changes on the next frame.
pub trait Backend {
    /// Receives the atlas alpha mask once, before any frame is drawn.
    fn upload_atlas(&mut self, mask: &AtlasImage) -> Result<()>;

    /// Informs the viewport of the logical surface size in pixels.
    fn set_logical_size(&mut self, width_px: u32, height_px: u32);

    /// Forwards a window resize to the viewport. Grid dimensions never change.
    fn resize(&mut self, width_px: u32, height_px: u32);

    /// Draws a batch of commands into the persistent framebuffer.
    fn execute_render_commands(&mut self, commands: &[RenderCommand]) -> Result<()>;

    /// Shows the framebuffer.
    fn present(&mut self) -> Result<()>;
}
