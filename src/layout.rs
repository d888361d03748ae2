// Small-multiples grid: one cell per series, filled row by row

use serde::Serialize;

/// One grid cell in artboard pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Rows and columns for `n_cells`. `columns = 0` picks a square-ish grid.
pub fn grid_dimensions(n_cells: usize, columns: usize) -> (usize, usize) {
    if n_cells == 0 {
        return (0, 0);
    }
    let cols = if columns > 0 {
        columns
    } else {
        (n_cells as f64).sqrt().ceil() as usize
    };
    let rows = (n_cells as f64 / cols as f64).ceil() as usize;
    (rows, cols)
}

/// Split `size` into equal cells with no gutter between them.
pub fn grid(n_cells: usize, size: (f64, f64), columns: usize) -> (usize, usize, Vec<Cell>) {
    let (rows, cols) = grid_dimensions(n_cells, columns);
    if n_cells == 0 {
        return (rows, cols, Vec::new());
    }
    let width = size.0 / cols as f64;
    let height = size.1 / rows as f64;

    let cells = (0..n_cells)
        .map(|index| {
            let row = index / cols;
            let col = index % cols;
            Cell {
                index,
                row,
                col,
                x: col as f64 * width,
                y: row as f64 * height,
                width,
                height,
            }
        })
        .collect();
    (rows, cols, cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_dimensions() {
        assert_eq!(grid_dimensions(1, 0), (1, 1));
        assert_eq!(grid_dimensions(3, 0), (2, 2));
        assert_eq!(grid_dimensions(4, 0), (2, 2));
        assert_eq!(grid_dimensions(5, 0), (2, 3));
        assert_eq!(grid_dimensions(10, 0), (3, 4));
    }

    #[test]
    fn test_fixed_columns() {
        assert_eq!(grid_dimensions(5, 2), (3, 2));
        assert_eq!(grid_dimensions(2, 4), (1, 4));
    }

    #[test]
    fn test_no_cells() {
        let (rows, cols, cells) = grid(0, (800.0, 600.0), 0);
        assert_eq!((rows, cols), (0, 0));
        assert!(cells.is_empty());
    }

    #[test]
    fn test_cells_tile_the_area_row_by_row() {
        let (rows, cols, cells) = grid(3, (800.0, 600.0), 0);
        assert_eq!((rows, cols), (2, 2));
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[1].row, 0);
        assert_eq!(cells[1].col, 1);
        assert_eq!(cells[1].x, 400.0);
        assert_eq!(cells[2].row, 1);
        assert_eq!(cells[2].col, 0);
        assert_eq!(cells[2].y, 300.0);
        assert!(cells.iter().all(|c| c.width == 400.0 && c.height == 300.0));
    }
}
