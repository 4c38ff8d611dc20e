// Occupancy grid map
//
// Row 0 of the matrix is the lowest y coordinate; text input lists the
// highest row first, so rows are stored in reverse reading order.

extern crate nalgebra as na;

use crate::common::{Point2D, PlannerError, PlannerResult};

/// Character marking an obstacle cell in the text format
pub const OBSTACLE_CHAR: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Free,
    Obstacle,
}

impl Cell {
    pub fn from_char(c: char) -> Self {
        if c == OBSTACLE_CHAR {
            Cell::Obstacle
        } else {
            Cell::Free
        }
    }
}

#[derive(Debug, Clone)]
pub struct OccupancyMap {
    grid: na::DMatrix<Cell>,
}

impl OccupancyMap {
    /// Build a map from text rows listed top (highest y) to bottom.
    ///
    /// Rows shorter than `columns` are rejected; characters past `columns`
    /// are ignored.
    pub fn from_rows<S: AsRef<str>>(columns: usize, rows: usize, text_rows: &[S]) -> PlannerResult<Self> {
        if columns == 0 || rows == 0 {
            return Err(PlannerError::InvalidParameter(format!(
                "map must have at least one cell, got {}x{}",
                columns, rows
            )));
        }
        if text_rows.len() != rows {
            return Err(PlannerError::InvalidParameter(format!(
                "expected {} map rows, got {}",
                rows,
                text_rows.len()
            )));
        }

        if rows.checked_mul(columns).is_none() {
            return Err(PlannerError::InvalidParameter(format!(
                "map size {}x{} is too large",
                columns, rows
            )));
        }

        // Every row is checked before the matrix is allocated, so the
        // declared size is bounded by the text actually supplied
        let mut parsed = Vec::with_capacity(rows);
        for (i, line) in text_rows.iter().enumerate() {
            let cells: Vec<Cell> = line.as_ref().chars().take(columns).map(Cell::from_char).collect();
            if cells.len() < columns {
                return Err(PlannerError::InvalidParameter(format!(
                    "map row {} has {} cells, expected {}",
                    i,
                    cells.len(),
                    columns
                )));
            }
            parsed.push(cells);
        }

        let grid = na::DMatrix::from_fn(rows, columns, |row, col| parsed[rows - 1 - row][col]);
        Ok(Self { grid })
    }

    /// Fully free map, mostly useful in tests
    pub fn open(columns: usize, rows: usize) -> Self {
        Self {
            grid: na::DMatrix::from_element(rows.max(1), columns.max(1), Cell::Free),
        }
    }

    pub fn columns(&self) -> usize {
        self.grid.ncols()
    }

    pub fn rows(&self) -> usize {
        self.grid.nrows()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.columns() as f64 && y < self.rows() as f64
    }

    /// False outside [0, columns) x [0, rows) or on an obstacle cell
    pub fn is_free(&self, x: f64, y: f64) -> bool {
        // NaN fails every comparison in `contains`
        if !self.contains(x, y) {
            return false;
        }
        self.grid[(y as usize, x as usize)] == Cell::Free
    }

    /// Cell at `row` (0 is the lowest y) and `col`, `None` outside the grid
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.grid.get((row, col)).copied()
    }

    pub fn free_cell_count(&self) -> usize {
        self.grid.iter().filter(|&&c| c == Cell::Free).count()
    }

    /// Centers of all obstacle cells
    pub fn obstacle_cells(&self) -> Vec<Point2D> {
        let mut cells = Vec::new();
        for row in 0..self.rows() {
            for col in 0..self.columns() {
                if self.grid[(row, col)] == Cell::Obstacle {
                    cells.push(Point2D::new(col as f64 + 0.5, row as f64 + 0.5));
                }
            }
        }
        cells
    }
}
