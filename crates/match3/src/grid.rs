use serde::{Deserialize, Serialize};

use crate::components::{Position, TileType};

/// A single board cell. `None` is an empty cell, only present mid-cascade.
pub type Cell = Option<TileType>;

/// The board grid. Uses column-major layout: `cells[x][y]` where x is column, y is row.
/// Serialized as a row-major `[[tile | null; width]; height]` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<Cell>>", try_from = "Vec<Vec<Cell>>")]
pub struct Grid {
    width: usize,
    height: usize,
    /// Flat storage in column-major order: index = x * height + y
    cells: Vec<Cell>,
}

impl Grid {
    /// An all-empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Build from row-major rows. Returns `None` for ragged input.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }
        let mut grid = Grid::new(width, height);
        for (y, row) in rows.into_iter().enumerate() {
            for (x, cell) in row.into_iter().enumerate() {
                grid.set(Position::new(x, y), cell);
            }
        }
        Some(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn has_dimensions(&self, width: usize, height: usize) -> bool {
        self.width == width && self.height == height
    }

    #[inline]
    fn idx(&self, pos: Position) -> usize {
        pos.x * self.height + pos.y
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Cell at `pos`; out-of-bounds reads as empty.
    pub fn get(&self, pos: Position) -> Cell {
        if self.in_bounds(pos) {
            self.cells[self.idx(pos)]
        } else {
            None
        }
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        let i = self.idx(pos);
        self.cells[i] = cell;
    }

    /// Swap the contents of two in-bounds cells.
    pub fn swap(&mut self, a: Position, b: Position) {
        let (ia, ib) = (self.idx(a), self.idx(b));
        self.cells.swap(ia, ib);
    }

    /// Copy a cell from one row to another within the same column.
    pub fn copy_within_column(&mut self, x: usize, from_y: usize, to_y: usize) {
        let from_i = self.idx(Position::new(x, from_y));
        let to_i = self.idx(Position::new(x, to_y));
        self.cells[to_i] = self.cells[from_i];
    }

    /// True when no cell is empty.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// All positions in raster order (row by row, left to right).
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    /// Row-major copy of the cells.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        (0..self.height)
            .map(|y| (0..self.width).map(|x| self.get(Position::new(x, y))).collect())
            .collect()
    }
}

impl From<Grid> for Vec<Vec<Cell>> {
    fn from(grid: Grid) -> Self {
        grid.rows()
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Grid {
    type Error = String;

    fn try_from(rows: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        Grid::from_rows(rows).ok_or_else(|| "grid rows have unequal lengths".to_string())
    }
}
