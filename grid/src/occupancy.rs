//! Dense boolean occupancy storage shared by the fixed, working, and shifted
//! grids.

use arena_nav_core::{CellCoord, GridDims};

/// Boolean grid marking which cells are blocked by terrain or obstacles.
///
/// Cells are stored row-major. Lookups outside the grid report *blocked*: a
/// false "occupied" only costs a detour, while a false "clear" walks an agent
/// into a wall.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    dims: GridDims,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Creates a fully open grid of the given dimensions.
    #[must_use]
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            cells: vec![false; dims.cell_count()],
        }
    }

    /// Builds a grid by evaluating the predicate for every cell.
    #[must_use]
    pub fn from_fn<F>(dims: GridDims, mut blocked: F) -> Self
    where
        F: FnMut(CellCoord) -> bool,
    {
        let mut grid = Self::new(dims);
        for row in 0..dims.rows() {
            for column in 0..dims.columns() {
                let cell = CellCoord::new(column, row);
                if blocked(cell) {
                    grid.block(cell);
                }
            }
        }
        grid
    }

    /// Dimensions of the grid in cells.
    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// Whether the cell is blocked. Out-of-range coordinates count as blocked.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        self.dims
            .index_of(cell)
            .map_or(true, |index| self.cells[index])
    }

    /// Marks an in-range cell as blocked.
    pub fn block(&mut self, cell: CellCoord) {
        if let Some(index) = self.dims.index_of(cell) {
            self.cells[index] = true;
        }
    }

    /// Whether any cell in the grid is blocked.
    #[must_use]
    pub fn any_blocked(&self) -> bool {
        self.cells.iter().any(|blocked| *blocked)
    }

    /// Number of blocked cells.
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|blocked| **blocked).count()
    }

    /// Marks every cell of the half-open rectangle `[x1, x2) × [y1, y2)`,
    /// wrapping each coordinate around the torus.
    ///
    /// The rectangle is given in absolute (possibly negative or overflowing)
    /// cell indices; a span covering the whole axis fills the whole axis, and
    /// a non-positive span writes nothing. Nothing is ever clipped away at a
    /// world edge.
    pub(crate) fn fill_rect_wrapped(&mut self, x1: i64, y1: i64, x2: i64, y2: i64) {
        let columns = i64::from(self.dims.columns());
        let rows = i64::from(self.dims.rows());
        if columns == 0 || rows == 0 {
            return;
        }
        let span_x = (x2 - x1).clamp(0, columns);
        let span_y = (y2 - y1).clamp(0, rows);
        for dy in 0..span_y {
            for dx in 0..span_x {
                let cell = self.dims.wrap(x1 + dx, y1 + dy);
                self.block(cell);
            }
        }
    }

    /// Copy of the grid translated so that `result[(c, r)]` reads
    /// `self[(c + shift_x, r + shift_y)]` with wrapped indices.
    #[must_use]
    pub(crate) fn shifted(&self, shift_x: i64, shift_y: i64) -> Self {
        let mut out = Self::new(self.dims);
        for row in 0..self.dims.rows() {
            for column in 0..self.dims.columns() {
                let source = self
                    .dims
                    .wrap(i64::from(column) + shift_x, i64::from(row) + shift_y);
                if self.is_blocked(source) {
                    out.block(CellCoord::new(column, row));
                }
            }
        }
        out
    }
}
