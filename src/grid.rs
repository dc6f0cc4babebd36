// src/grid.rs

//! A fixed-size, row-major buffer of `Cell`s addressed by `(x, y)`.
//!
//! `Grid` is the single place that turns coordinates into buffer indices. All
//! of the screen's write/clear overloads and the renderer go through `get` /
//! `get_mut`, so bounds are checked in exactly one spot.

use crate::glyph::Cell;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a `width x height` grid with every position set to `fill`.
    pub fn new(width: usize, height: usize, fill: Cell) -> Self {
        Grid {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Maps a coordinate to its buffer index, or `None` outside the grid.
    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index_of(x, y).is_some()
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index_of(x, y).map(|idx| self.cells[idx])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        let idx = self.index_of(x, y)?;
        self.cells.get_mut(idx)
    }

    /// Sets every position to `cell`.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Overwrites this grid with the contents of `other`.
    ///
    /// # Panics
    /// Panics if the dimensions differ.
    pub fn copy_from(&mut self, other: &Grid) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "Grid::copy_from requires identical dimensions"
        );
        self.cells.copy_from_slice(&other.cells);
    }

    /// Iterates `(x, y, cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| (idx % width, idx / width, cell))
    }

    /// One row, left to right.
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        Some(&self.cells[start..start + self.width])
    }
}
