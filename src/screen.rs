// src/screen.rs

//! The terminal surface: a fixed grid of code-page-437 cells with a cursor,
//! default colors, and a diffing renderer in front of a `Backend`.
//!
//! Every mutating call validates all of its arguments before touching the
//! grid, so a call that returns an error has changed nothing. The many
//! write/clear variants are thin wrappers that fill in defaults and funnel into
//! one validated primitive per family.
//!
//! Characters are given as `char` and must be in `U+0000..=U+00FF`; each one
//! is stored as the byte code of the same value.

use anyhow::{Context, Result};
use log::{debug, trace};

use crate::atlas::GlyphAtlas;
use crate::backends::Backend;
use crate::color::{Color, NamedColor};
use crate::config::Config;
use crate::cp437;
use crate::display::Screen;
use crate::error::ScreenError;
use crate::glyph::{Cell, GLYPH_COUNT};
use crate::grid::Grid;
use crate::renderer::DiffRenderer;

/// Default grid width in characters.
pub const DEFAULT_WIDTH: i32 = 80;
/// Default grid height in characters.
pub const DEFAULT_HEIGHT: i32 = 24;

const FALLBACK_FOREGROUND: NamedColor = NamedColor::White;
const FALLBACK_BACKGROUND: NamedColor = NamedColor::Black;

/// Rewrites cells in place during `AsciiScreen::for_each_tile`.
///
/// Receives the absolute grid position and the current cell, returns the
/// cell to store there. Any `FnMut(i32, i32, Cell) -> Cell` closure is a
/// transformer.
pub trait TileTransformer {
    fn transform_tile(&mut self, x: i32, y: i32, cell: Cell) -> Cell;
}

impl<F> TileTransformer for F
where
    F: FnMut(i32, i32, Cell) -> Cell,
{
    fn transform_tile(&mut self, x: i32, y: i32, cell: Cell) -> Cell {
        self(x, y, cell)
    }
}

pub struct AsciiScreen<B: Backend> {
    width: i32,
    height: i32,
    grid: Grid,
    renderer: DiffRenderer,
    atlas: GlyphAtlas,
    atlas_uploaded: bool,
    backend: B,
    cursor_x: i32,
    cursor_y: i32,
    default_foreground: Color,
    default_background: Color,
}

impl<B: Backend> AsciiScreen<B> {
    /// Creates a `width x height` screen filled with spaces in the default
    /// colors (white on black), cursor at the origin.
    pub fn new(width: i32, height: i32, atlas: GlyphAtlas, backend: B) -> Result<Self, ScreenError> {
        if width < 1 {
            return Err(ScreenError::invalid_argument(
                "width",
                format!("{} must be greater than 0", width),
            ));
        }
        if height < 1 {
            return Err(ScreenError::invalid_argument(
                "height",
                format!("{} must be greater than 0", height),
            ));
        }

        let default_foreground = FALLBACK_FOREGROUND.to_color();
        let default_background = FALLBACK_BACKGROUND.to_color();
        let blank = Cell::new(b' ', default_foreground, default_background);
        let geometry = atlas.geometry();
        debug!(
            "AsciiScreen: {}x{} cells of {}x{} px",
            width, height, geometry.tile_width, geometry.tile_height
        );

        Ok(AsciiScreen {
            width,
            height,
            grid: Grid::new(width as usize, height as usize, blank),
            renderer: DiffRenderer::new(),
            atlas,
            atlas_uploaded: false,
            backend,
            cursor_x: 0,
            cursor_y: 0,
            default_foreground,
            default_background,
        })
    }

    /// Creates an 80x24 screen.
    pub fn with_default_size(atlas: GlyphAtlas, backend: B) -> Result<Self, ScreenError> {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, atlas, backend)
    }

    /// Creates a screen sized and colored from `config`, cleared to its default colors.
    pub fn from_config(config: &Config, atlas: GlyphAtlas, backend: B) -> Result<Self, ScreenError> {
        let mut screen = Self::new(
            i32::from(config.screen.columns),
            i32::from(config.screen.rows),
            atlas,
            backend,
        )?;
        screen
            .set_default_foreground(config.colors.foreground.resolve())
            .set_default_background(config.colors.background.resolve());
        let blank = Cell::new(b' ', screen.default_foreground, screen.default_background);
        screen.grid.fill(blank);
        Ok(screen)
    }

    // --- Geometry ---

    /// Width in characters.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in characters.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Width of one character cell in pixels.
    pub fn char_width(&self) -> u32 {
        self.atlas.geometry().tile_width
    }

    /// Height of one character cell in pixels.
    pub fn char_height(&self) -> u32 {
        self.atlas.geometry().tile_height
    }

    /// Size of the logical draw surface in pixels.
    pub fn logical_size(&self) -> (u32, u32) {
        (
            (self.width as u32).saturating_mul(self.char_width()),
            (self.height as u32).saturating_mul(self.char_height()),
        )
    }

    // --- Cursor ---

    pub fn cursor(&self) -> (i32, i32) {
        (self.cursor_x, self.cursor_y)
    }

    pub fn cursor_x(&self) -> i32 {
        self.cursor_x
    }

    pub fn cursor_y(&self) -> i32 {
        self.cursor_y
    }

    pub fn set_cursor_x(&mut self, x: i32) -> Result<&mut Self, ScreenError> {
        ScreenError::check_range("cursor x", x, 0, self.width)?;
        self.cursor_x = x;
        Ok(self)
    }

    pub fn set_cursor_y(&mut self, y: i32) -> Result<&mut Self, ScreenError> {
        ScreenError::check_range("cursor y", y, 0, self.height)?;
        self.cursor_y = y;
        Ok(self)
    }

    pub fn set_cursor_position(&mut self, x: i32, y: i32) -> Result<&mut Self, ScreenError> {
        ScreenError::check_range("cursor x", x, 0, self.width)?;
        ScreenError::check_range("cursor y", y, 0, self.height)?;
        self.cursor_x = x;
        self.cursor_y = y;
        Ok(self)
    }

    // --- Default colors ---

    pub fn default_foreground(&self) -> Color {
        self.default_foreground
    }

    pub fn default_background(&self) -> Color {
        self.default_background
    }

    /// Sets the color used when a call leaves the foreground unspecified.
    /// `None` restores white.
    pub fn set_default_foreground(&mut self, color: impl Into<Option<Color>>) -> &mut Self {
        self.default_foreground = color
            .into()
            .map_or_else(|| FALLBACK_FOREGROUND.to_color(), Color::normalized);
        self
    }

    /// Sets the color used when a call leaves the background unspecified.
    /// `None` restores black.
    pub fn set_default_background(&mut self, color: impl Into<Option<Color>>) -> &mut Self {
        self.default_background = color
            .into()
            .map_or_else(|| FALLBACK_BACKGROUND.to_color(), Color::normalized);
        self
    }

    // --- Reads ---

    /// A copy of the cell at `(x, y)`.
    pub fn cell(&self, x: i32, y: i32) -> Result<Cell, ScreenError> {
        self.check_position(x, y)?;
        Ok(self.grid.get(x, y).unwrap_or_default())
    }

    /// Row `y` rendered as text via code page 437.
    pub fn row_text(&self, y: i32) -> Result<String, ScreenError> {
        ScreenError::check_range("y", y, 0, self.height)?;
        let row = self.grid.row(y as usize).unwrap_or_default();
        Ok(row.iter().map(|cell| cp437::to_char(cell.character)).collect())
    }

    // --- Write family ---

    /// Writes `ch` at `(x, y)` in the default colors.
    pub fn write(&mut self, ch: char, x: i32, y: i32) -> Result<&mut Self, ScreenError> {
        self.write_with(ch, x, y, None, None)
    }

    /// Writes `ch` at `(x, y)`; `None` colors fall back to the defaults.
    ///
    /// Moves the cursor to `(x + 1, y)`, which is one past the last column
    /// after writing there.
    pub fn write_with(
        &mut self,
        ch: char,
        x: i32,
        y: i32,
        foreground: impl Into<Option<Color>>,
        background: impl Into<Option<Color>>,
    ) -> Result<&mut Self, ScreenError> {
        let code = Self::check_character(ch)?;
        self.check_position(x, y)?;
        let (fg, bg) = self.resolve_colors(foreground.into(), background.into());
        self.put_cell(code, x, y, fg, bg);
        Ok(self)
    }

    /// Writes `ch` at the cursor in the default colors.
    pub fn put(&mut self, ch: char) -> Result<&mut Self, ScreenError> {
        self.put_with(ch, None, None)
    }

    /// Writes `ch` at the cursor.
    pub fn put_with(
        &mut self,
        ch: char,
        foreground: impl Into<Option<Color>>,
        background: impl Into<Option<Color>>,
    ) -> Result<&mut Self, ScreenError> {
        self.write_with(ch, self.cursor_x, self.cursor_y, foreground, background)
    }

    /// Writes `text` left to right starting at `(x, y)` in the default colors.
    pub fn write_str(&mut self, text: &str, x: i32, y: i32) -> Result<&mut Self, ScreenError> {
        self.write_str_with(text, x, y, None, None)
    }

    /// Writes `text` left to right starting at `(x, y)`.
    ///
    /// The whole string must end before the last column: `x + len < width`.
    pub fn write_str_with(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        foreground: impl Into<Option<Color>>,
        background: impl Into<Option<Color>>,
    ) -> Result<&mut Self, ScreenError> {
        let len = text.chars().count() as i64;
        let end = i64::from(x) + len;
        if end >= i64::from(self.width) {
            return Err(ScreenError::OutOfRange {
                name: "x + length",
                value: end,
                min: 0,
                max: i64::from(self.width),
            });
        }
        self.check_position(x, y)?;
        let codes = Self::check_characters(text)?;

        let (fg, bg) = self.resolve_colors(foreground.into(), background.into());
        for (offset, code) in codes.into_iter().enumerate() {
            self.put_cell(code, x + offset as i32, y, fg, bg);
        }
        Ok(self)
    }

    /// Writes `text` at the cursor in the default colors.
    pub fn print(&mut self, text: &str) -> Result<&mut Self, ScreenError> {
        self.print_with(text, None, None)
    }

    /// Writes `text` at the cursor; requires `cursor_x + len < width`.
    pub fn print_with(
        &mut self,
        text: &str,
        foreground: impl Into<Option<Color>>,
        background: impl Into<Option<Color>>,
    ) -> Result<&mut Self, ScreenError> {
        let end = i64::from(self.cursor_x) + text.chars().count() as i64;
        if end >= i64::from(self.width) {
            return Err(ScreenError::OutOfRange {
                name: "cursor x + length",
                value: end,
                min: 0,
                max: i64::from(self.width),
            });
        }
        self.write_str_with(text, self.cursor_x, self.cursor_y, foreground, background)
    }

    /// Writes `text` horizontally centered on row `y` in the default colors.
    pub fn write_center(&mut self, text: &str, y: i32) -> Result<&mut Self, ScreenError> {
        self.write_center_with(text, y, None, None)
    }

    /// Writes `text` starting at column `(width - len) / 2` of row `y`.
    /// Requires `len < width`.
    pub fn write_center_with(
        &mut self,
        text: &str,
        y: i32,
        foreground: impl Into<Option<Color>>,
        background: impl Into<Option<Color>>,
    ) -> Result<&mut Self, ScreenError> {
        let len = text.chars().count() as i64;
        ScreenError::check_range("length", len, 0, self.width)?;
        ScreenError::check_range("y", y, 0, self.height)?;
        let x = ((i64::from(self.width) - len) / 2) as i32;
        self.write_str_with(text, x, y, foreground, background)
    }

    // --- Clear family ---

    /// Fills the whole grid with spaces in the default colors.
    pub fn clear(&mut self) -> Result<&mut Self, ScreenError> {
        self.clear_region_with(' ', 0, 0, self.width, self.height, None, None)
    }

    /// Fills the whole grid with `ch`.
    pub fn clear_with(
        &mut self,
        ch: char,
        foreground: impl Into<Option<Color>>,
        background: impl Into<Option<Color>>,
    ) -> Result<&mut Self, ScreenError> {
        self.clear_region_with(ch, 0, 0, self.width, self.height, foreground, background)
    }

    /// Fills `[x, x + width) x [y, y + height)` with `ch` in the default colors.
    pub fn clear_region(
        &mut self,
        ch: char,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<&mut Self, ScreenError> {
        self.clear_region_with(ch, x, y, width, height, None, None)
    }

    /// Fills `[x, x + width) x [y, y + height)` with `ch`.
    ///
    /// The region must be non-empty and lie entirely inside the grid. Cells are
    /// written one by one, column by column, so the cursor ends up just right
    /// of the region's bottom-right cell.
    #[allow(clippy::too_many_arguments)]
    pub fn clear_region_with(
        &mut self,
        ch: char,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        foreground: impl Into<Option<Color>>,
        background: impl Into<Option<Color>>,
    ) -> Result<&mut Self, ScreenError> {
        let code = Self::check_character(ch)?;
        self.check_position(x, y)?;
        // [1, remaining + 1) covers both `width >= 1` and `x + width <= self.width`.
        ScreenError::check_range("width", width, 1, i64::from(self.width - x) + 1)?;
        ScreenError::check_range("height", height, 1, i64::from(self.height - y) + 1)?;

        let (fg, bg) = self.resolve_colors(foreground.into(), background.into());
        for xo in x..x + width {
            for yo in y..y + height {
                self.put_cell(code, xo, yo, fg, bg);
            }
        }
        Ok(self)
    }

    // --- Tile transformation ---

    /// Passes every cell of `[left, left + width) x [top, top + height)` that
    /// lies on the grid through `transformer`, storing the result immediately.
    /// Returned colors are clamped into `[0, 1]`.
    ///
    /// Positions off the grid are skipped silently. Cells are visited column
    /// by column, top to bottom within a column.
    pub fn for_each_tile(
        &mut self,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        mut transformer: impl TileTransformer,
    ) -> &mut Self {
        let visited = self.try_for_each_tile(left, top, width, height, |x, y, cell| {
            Ok::<_, std::convert::Infallible>(transformer.transform_tile(x, y, cell))
        });
        match visited {
            Ok(screen) => screen,
            Err(never) => match never {},
        }
    }

    /// `for_each_tile` over the whole grid.
    pub fn for_each_tile_in_screen(&mut self, transformer: impl TileTransformer) -> &mut Self {
        self.for_each_tile(0, 0, self.width, self.height, transformer)
    }

    /// Like `for_each_tile`, but stops at the first error the transformer
    /// returns. Cells visited before the error keep their new values.
    pub fn try_for_each_tile<E>(
        &mut self,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        mut transformer: impl FnMut(i32, i32, Cell) -> Result<Cell, E>,
    ) -> Result<&mut Self, E> {
        let (x_start, x_end) = clip_span(left, width, self.width);
        let (y_start, y_end) = clip_span(top, height, self.height);

        for x in x_start..x_end {
            for y in y_start..y_end {
                if let Some(cell) = self.grid.get_mut(x, y) {
                    let next = transformer(x, y, *cell)?;
                    *cell = Cell {
                        foreground: next.foreground.normalized(),
                        background: next.background.normalized(),
                        ..next
                    };
                }
            }
        }
        Ok(self)
    }

    // --- Rendering ---

    /// Draws every cell changed since the last successful frame.
    ///
    /// Uploads the atlas on first use and reports the logical surface size to
    /// the backend before diffing. Returns the number of cells redrawn. On a
    /// backend error nothing is committed, so the next frame re-sends the same
    /// changes.
    pub fn render_frame(&mut self) -> Result<usize> {
        if !self.atlas_uploaded {
            self.backend
                .upload_atlas(self.atlas.mask())
                .context("AsciiScreen: failed to upload glyph atlas")?;
            self.atlas_uploaded = true;
        }
        let (width_px, height_px) = self.logical_size();
        self.backend.set_logical_size(width_px, height_px);
        self.renderer
            .render_frame(&self.grid, &self.atlas, &mut self.backend)
    }

    /// Makes the next frame redraw every cell.
    pub fn invalidate(&mut self) {
        self.renderer.invalidate();
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // --- Internals ---

    /// The single write primitive. Arguments must already be validated.
    fn put_cell(&mut self, code: u8, x: i32, y: i32, foreground: Color, background: Color) {
        if let Some(cell) = self.grid.get_mut(x, y) {
            *cell = Cell::new(code, foreground, background);
            self.cursor_x = x + 1;
            self.cursor_y = y;
        }
    }

    fn check_position(&self, x: i32, y: i32) -> Result<(), ScreenError> {
        ScreenError::check_range("x", x, 0, self.width)?;
        ScreenError::check_range("y", y, 0, self.height)
    }

    fn check_character(ch: char) -> Result<u8, ScreenError> {
        u8::try_from(ch).map_err(|_| ScreenError::OutOfRange {
            name: "character",
            value: i64::from(u32::from(ch)),
            min: 0,
            max: GLYPH_COUNT as i64,
        })
    }

    fn check_characters(text: &str) -> Result<Vec<u8>, ScreenError> {
        text.chars().map(Self::check_character).collect()
    }

    /// Fills in defaults and clamps explicit colors.
    fn resolve_colors(&self, foreground: Option<Color>, background: Option<Color>) -> (Color, Color) {
        (
            foreground.map_or(self.default_foreground, Color::normalized),
            background.map_or(self.default_background, Color::normalized),
        )
    }
}

impl<B: Backend> Screen for AsciiScreen<B> {
    fn resize(&mut self, width_px: u32, height_px: u32) {
        trace!("AsciiScreen: window resized to {}x{} px", width_px, height_px);
        self.backend.resize(width_px, height_px);
    }

    fn render(&mut self, delta: f32) -> Result<()> {
        let redrawn = self.render_frame()?;
        trace!("AsciiScreen: frame after {:.4}s redrew {} cells", delta, redrawn);
        Ok(())
    }
}

/// Intersects `[start, start + len)` with `[0, limit)`.
fn clip_span(start: i32, len: i32, limit: i32) -> (i32, i32) {
    let lo = i64::from(start).max(0);
    let hi = (i64::from(start) + i64::from(len)).min(i64::from(limit));
    if hi <= lo {
        return (0, 0);
    }
    (lo as i32, hi as i32)
}

#[cfg(test)]
mod tests;
