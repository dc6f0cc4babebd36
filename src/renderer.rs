// src/renderer.rs

//! This module defines the `DiffRenderer`.
//!
//! The renderer's job is to turn the current character grid into the minimal
//! list of draw commands needed to bring the display up to date. It keeps a
//! shadow copy of the grid as it looked when the last frame was committed and
//! emits commands only for cells whose character, foreground or background
//! differ from that copy.
//!
//! Rendering is split into two steps so that a failing backend never loses
//! changes: `diff` computes the commands without touching any state, and
//! `commit` replaces the shadow buffer once the backend has accepted them.
//! `render_frame` runs both around a `Backend`.

use anyhow::{Context, Result};
use log::trace;

use crate::atlas::{AtlasGeometry, GlyphAtlas};
use crate::backends::{Backend, CellCoords, PixelRect, RenderCommand};
use crate::grid::Grid;

/// Computes per-frame draw commands by diffing against the last committed frame.
#[derive(Debug, Clone, Default)]
pub struct DiffRenderer {
    /// The grid as last committed. `None` until the first commit (or after
    /// `invalidate`), which makes every cell count as changed.
    shadow: Option<Grid>,
}

impl DiffRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the committed frame so the next diff covers every cell.
    pub fn invalidate(&mut self) {
        self.shadow = None;
    }

    /// The grid as of the last commit.
    pub fn shadow(&self) -> Option<&Grid> {
        self.shadow.as_ref()
    }

    /// Returns the commands that redraw every cell that differs from the shadow buffer.
    ///
    /// Each changed cell produces a background `FillRect` followed by a
    /// `DrawGlyph`, positioned with row 0 at the top of the surface:
    /// `(x * tile_width, (height - y - 1) * tile_height)` in a bottom-left origin
    /// coordinate system.
    pub fn diff(&self, current: &Grid, atlas: &GlyphAtlas) -> Vec<RenderCommand> {
        let geometry = atlas.geometry();
        let baseline = self.shadow.as_ref().filter(|shadow| {
            shadow.width() == current.width() && shadow.height() == current.height()
        });
        let mut commands = Vec::new();

        for (idx, (x, y, cell)) in current.iter().enumerate() {
            if baseline.and_then(|shadow| shadow.cells().get(idx)) == Some(cell) {
                continue;
            }
            let coords = CellCoords { x, y };
            let rect = cell_rect(geometry, current.height(), coords);
            commands.push(RenderCommand::FillRect {
                cell: coords,
                rect,
                color: cell.background,
            });
            commands.push(RenderCommand::DrawGlyph {
                cell: coords,
                rect,
                tile: atlas.glyph(cell.character),
                color: cell.foreground,
            });
        }
        commands
    }

    /// Records `current` as what is now on screen.
    pub fn commit(&mut self, current: &Grid) {
        match &mut self.shadow {
            Some(shadow)
                if shadow.width() == current.width() && shadow.height() == current.height() =>
            {
                shadow.copy_from(current);
            }
            _ => self.shadow = Some(current.clone()),
        }
    }

    /// Diffs, hands the commands to `backend`, presents, and commits.
    ///
    /// Returns the number of cells redrawn. If the backend fails, nothing is
    /// committed and the next call re-emits the same changes.
    pub fn render_frame(
        &mut self,
        current: &Grid,
        atlas: &GlyphAtlas,
        backend: &mut dyn Backend,
    ) -> Result<usize> {
        let commands = self.diff(current, atlas);
        let changed_cells = commands.len() / 2;

        backend
            .execute_render_commands(&commands)
            .context("DiffRenderer: backend failed to execute frame commands")?;
        backend
            .present()
            .context("DiffRenderer: backend failed to present frame")?;

        self.commit(current);
        trace!("DiffRenderer: frame committed, {} cells redrawn", changed_cells);
        Ok(changed_cells)
    }
}

/// Pixel rectangle of a cell on the bottom-left-origin draw surface.
pub fn cell_rect(geometry: AtlasGeometry, grid_height: usize, cell: CellCoords) -> PixelRect {
    let flipped_row = (grid_height - cell.y - 1) as u32;
    PixelRect {
        x: cell.x as u32 * geometry.tile_width,
        y: flipped_row * geometry.tile_height,
        width: geometry.tile_width,
        height: geometry.tile_height,
    }
}
