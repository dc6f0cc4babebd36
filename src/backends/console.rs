// src/backends/console.rs

//! A text-mode backend: draws each glyph quad as one terminal character cell
//! using 24-bit ANSI color escapes.
//!
//! There is no texture to sample, so the atlas upload is ignored and glyph
//! codes are mapped to their code-page-437 Unicode rendition instead.

use std::io::Write;

use anyhow::{Context, Result};
use log::{debug, error, info, trace};

use crate::atlas::AtlasImage;
use crate::backends::{Backend, CellCoords, RenderCommand};
use crate::color::Color;
use crate::cp437;

const CURSOR_HIDE: &str = "\x1b[?25l";
const CURSOR_SHOW: &str = "\x1b[?25h";
const SGR_PREFIX: &str = "\x1b[";
const SGR_SUFFIX: char = 'm';
const SGR_SEPARATOR: char = ';';
const SGR_RESET_ALL: u16 = 0;
const CLEAR_SCREEN_AND_HOME: &str = "\x1b[2J\x1b[H";

pub struct ConsoleBackend<W: Write> {
    out: W,
    /// Background of the cell whose `FillRect` was seen last, waiting for its glyph.
    pending_bg: Option<(CellCoords, Color)>,
    logical_size: (u32, u32),
    cleaned_up: bool,
}

impl<W: Write> ConsoleBackend<W> {
    /// Takes over `out`: hides the cursor and clears the screen.
    pub fn new(mut out: W) -> Result<Self> {
        info!("Creating new ConsoleBackend.");
        write!(out, "{}{}", CURSOR_HIDE, CLEAR_SCREEN_AND_HOME)
            .context("ConsoleBackend: Failed to write initial screen setup")?;
        out.flush()
            .context("ConsoleBackend: Failed to flush initial screen setup")?;
        Ok(ConsoleBackend {
            out,
            pending_bg: None,
            logical_size: (0, 0),
            cleaned_up: false,
        })
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn logical_size(&self) -> (u32, u32) {
        self.logical_size
    }

    /// Restores the cursor and default attributes. Idempotent.
    pub fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;
        write!(
            self.out,
            "{}{}{}{}",
            SGR_PREFIX, SGR_RESET_ALL, SGR_SUFFIX, CURSOR_SHOW
        )
        .context("ConsoleBackend: Failed to write cleanup sequence")?;
        self.out
            .flush()
            .context("ConsoleBackend: Failed to flush for CURSOR_SHOW cleanup")?;
        info!("ConsoleBackend: Cleanup complete.");
        Ok(())
    }

    fn draw_cell(&mut self, cell: CellCoords, code: u8, fg: Color, bg: Color) -> Result<()> {
        let mut codes = vec![SGR_RESET_ALL];
        Self::sgr_append_rgb(&mut codes, 38, fg);
        Self::sgr_append_rgb(&mut codes, 48, bg);
        let sgr = codes
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(&SGR_SEPARATOR.to_string());
        write!(
            self.out,
            "{}{}{}{}{}",
            Self::format_cursor_position(cell.y + 1, cell.x + 1),
            SGR_PREFIX,
            sgr,
            SGR_SUFFIX,
            cp437::to_char(code)
        )
        .context("ConsoleBackend: Failed to write cell")
    }

    /// Appends a 24-bit color selector (`38;2;r;g;b` or `48;2;r;g;b`).
    fn sgr_append_rgb(codes: &mut Vec<u16>, selector: u16, color: Color) {
        let [r, g, b, _] = color.to_rgba8();
        codes.extend_from_slice(&[selector, 2, u16::from(r), u16::from(g), u16::from(b)]);
    }

    fn format_cursor_position(row_1_based: usize, col_1_based: usize) -> String {
        format!("\x1b[{};{}H", row_1_based, col_1_based)
    }
}

impl<W: Write> Backend for ConsoleBackend<W> {
    fn upload_atlas(&mut self, mask: &AtlasImage) -> Result<()> {
        debug!(
            "ConsoleBackend: ignoring {}x{} atlas mask, glyphs come from the terminal font",
            mask.width(),
            mask.height()
        );
        Ok(())
    }

    fn set_logical_size(&mut self, width_px: u32, height_px: u32) {
        self.logical_size = (width_px, height_px);
    }

    fn resize(&mut self, width_px: u32, height_px: u32) {
        trace!("ConsoleBackend: window resized to {}x{} px", width_px, height_px);
    }

    fn execute_render_commands(&mut self, commands: &[RenderCommand]) -> Result<()> {
        for command in commands {
            match *command {
                RenderCommand::FillRect { cell, color, .. } => {
                    self.pending_bg = Some((cell, color));
                }
                RenderCommand::DrawGlyph {
                    cell, tile, color, ..
                } => {
                    let bg = match self.pending_bg.take() {
                        Some((bg_cell, bg)) if bg_cell == cell => bg,
                        _ => Color::BLACK,
                    };
                    self.draw_cell(cell, tile.code, color, bg)?;
                }
            }
        }
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.out
            .flush()
            .context("ConsoleBackend: Failed to flush during present")
    }
}

impl<W: Write> Drop for ConsoleBackend<W> {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            error!("ConsoleBackend: Error during cleanup in drop: {}", e);
        }
    }
}
