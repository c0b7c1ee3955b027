use std::fmt;

use serde::{Deserialize, Serialize};

pub const DIR_UP: usize = 0;
pub const DIR_RIGHT: usize = 1;
pub const DIR_DOWN: usize = 2;
pub const DIR_LEFT: usize = 3;

/// Column/row layout of a puzzle. Pieces are indexed row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSpec {
    pub cols: u32,
    pub rows: u32,
}

impl GridSpec {
    pub fn new(cols: u32, rows: u32) -> Result<Self, GridError> {
        if cols == 0 || rows == 0 {
            return Err(GridError::Empty { cols, rows });
        }
        Ok(Self { cols, rows })
    }

    pub fn piece_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    pub fn index_of(&self, col: u32, row: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    pub fn coords_of(&self, index: usize) -> (u32, u32) {
        let cols = self.cols as usize;
        ((index % cols) as u32, (index / cols) as u32)
    }

    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| (col, row)))
    }

    pub fn neighbor(&self, index: usize, dir: usize) -> Option<usize> {
        neighbor_id(index, self.cols as usize, self.rows as usize, dir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    Empty { cols: u32, rows: u32 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::Empty { cols, rows } => {
                write!(f, "grid needs at least one column and one row, got {cols}x{rows}")
            }
        }
    }
}

impl std::error::Error for GridError {}

pub fn neighbor_id(id: usize, cols: usize, rows: usize, dir: usize) -> Option<usize> {
    let col = id % cols;
    let row = id / cols;
    match dir {
        DIR_UP if row > 0 => Some(id - cols),
        DIR_RIGHT if col + 1 < cols => Some(id + 1),
        DIR_DOWN if row + 1 < rows => Some(id + cols),
        DIR_LEFT if col > 0 => Some(id - 1),
        _ => None,
    }
}

pub fn opposite_dir(dir: usize) -> usize {
    match dir {
        DIR_UP => DIR_DOWN,
        DIR_RIGHT => DIR_LEFT,
        DIR_DOWN => DIR_UP,
        DIR_LEFT => DIR_RIGHT,
        _ => DIR_UP,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TabSide {
    Tab,
    Blank,
}

impl TabSide {
    pub fn flipped(self) -> Self {
        match self {
            TabSide::Tab => TabSide::Blank,
            TabSide::Blank => TabSide::Tab,
        }
    }
}

/// What one side of a single piece looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    Flat,
    Tab,
    Blank,
}

impl EdgeKind {
    pub fn sign(self) -> f32 {
        match self {
            EdgeKind::Flat => 0.0,
            EdgeKind::Tab => 1.0,
            EdgeKind::Blank => -1.0,
        }
    }

    pub fn is_curved(self) -> bool {
        !matches!(self, EdgeKind::Flat)
    }

    fn from_side(side: Option<TabSide>) -> Self {
        match side {
            None => EdgeKind::Flat,
            Some(TabSide::Tab) => EdgeKind::Tab,
            Some(TabSide::Blank) => EdgeKind::Blank,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceEdges {
    pub top: EdgeKind,
    pub right: EdgeKind,
    pub bottom: EdgeKind,
    pub left: EdgeKind,
}

impl PieceEdges {
    pub fn get(&self, dir: usize) -> EdgeKind {
        match dir {
            DIR_UP => self.top,
            DIR_RIGHT => self.right,
            DIR_DOWN => self.bottom,
            _ => self.left,
        }
    }
}

// Checkerboard parity: a cell with even (col + row) pushes tabs up and down,
// an odd cell pushes them left and right.

/// Side of the horizontal edge above `row`, seen from the cell at `row - 1`.
pub fn horizontal_edge_side(col: u32, row: u32) -> TabSide {
    if (col + row) % 2 == 1 {
        TabSide::Tab
    } else {
        TabSide::Blank
    }
}

/// Side of the vertical edge left of `col`, seen from the cell at `col - 1`.
pub fn vertical_edge_side(col: u32, row: u32) -> TabSide {
    if (col + row) % 2 == 0 {
        TabSide::Tab
    } else {
        TabSide::Blank
    }
}

/// Polarity of every internal edge, stored once per edge.
///
/// `horizontal` has `rows + 1` rows of `cols` entries; `vertical` has `rows`
/// rows of `cols + 1` entries. Boundary entries are `None`.
#[derive(Clone, Debug)]
pub struct EdgeMaps {
    pub horizontal: Vec<Vec<Option<TabSide>>>,
    pub vertical: Vec<Vec<Option<TabSide>>>,
}

pub fn build_edge_maps(grid: GridSpec) -> EdgeMaps {
    let rows = grid.rows;
    let cols = grid.cols;
    let mut horizontal = vec![vec![None; cols as usize]; (rows + 1) as usize];
    for row in 1..rows {
        for col in 0..cols {
            horizontal[row as usize][col as usize] = Some(horizontal_edge_side(col, row));
        }
    }

    let mut vertical = vec![vec![None; (cols + 1) as usize]; rows as usize];
    for row in 0..rows {
        for col in 1..cols {
            vertical[row as usize][col as usize] = Some(vertical_edge_side(col, row));
        }
    }

    EdgeMaps {
        horizontal,
        vertical,
    }
}

impl EdgeMaps {
    pub fn piece_edges(&self, col: u32, row: u32) -> PieceEdges {
        let row = row as usize;
        let col = col as usize;
        let top = self.horizontal[row][col].map(TabSide::flipped);
        let bottom = self.horizontal[row + 1][col];
        let left = self.vertical[row][col].map(TabSide::flipped);
        let right = self.vertical[row][col + 1];
        PieceEdges {
            top: EdgeKind::from_side(top),
            right: EdgeKind::from_side(right),
            bottom: EdgeKind::from_side(bottom),
            left: EdgeKind::from_side(left),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_grid() {
        assert_eq!(
            GridSpec::new(0, 3),
            Err(GridError::Empty { cols: 0, rows: 3 })
        );
        assert!(GridSpec::new(3, 0).is_err());
    }

    #[test]
    fn wide_grids_are_accepted() {
        let grid = GridSpec::new(1000, 1).expect("grid");
        assert_eq!(grid.piece_count(), 1000);
        assert_eq!(grid.coords_of(999), (999, 0));
    }

    #[test]
    fn index_round_trips_row_major() {
        let grid = GridSpec::new(4, 3).expect("grid");
        assert_eq!(grid.index_of(3, 0), 3);
        assert_eq!(grid.index_of(0, 1), 4);
        assert_eq!(grid.coords_of(7), (3, 1));
        let order: Vec<_> = grid.cells().take(5).collect();
        assert_eq!(order, vec![(0, 0), (1, 0), (2, 0), (3, 0), (0, 1)]);
    }

    #[test]
    fn boundary_edges_are_flat() {
        let grid = GridSpec::new(3, 2).expect("grid");
        let maps = build_edge_maps(grid);
        let corner = maps.piece_edges(0, 0);
        assert_eq!(corner.top, EdgeKind::Flat);
        assert_eq!(corner.left, EdgeKind::Flat);
        assert!(corner.right.is_curved());
        assert!(corner.bottom.is_curved());
        let far = maps.piece_edges(2, 1);
        assert_eq!(far.bottom, EdgeKind::Flat);
        assert_eq!(far.right, EdgeKind::Flat);
    }

    #[test]
    fn single_row_has_no_horizontal_tabs() {
        let grid = GridSpec::new(5, 1).expect("grid");
        let maps = build_edge_maps(grid);
        for col in 0..5 {
            let edges = maps.piece_edges(col, 0);
            assert_eq!(edges.top, EdgeKind::Flat);
            assert_eq!(edges.bottom, EdgeKind::Flat);
        }
    }

    #[test]
    fn even_cells_push_tabs_vertically() {
        let grid = GridSpec::new(3, 3).expect("grid");
        let maps = build_edge_maps(grid);
        let center = maps.piece_edges(1, 1);
        assert_eq!(center.top, EdgeKind::Tab);
        assert_eq!(center.bottom, EdgeKind::Tab);
        assert_eq!(center.left, EdgeKind::Blank);
        assert_eq!(center.right, EdgeKind::Blank);
    }

    #[test]
    fn neighbors_stop_at_boundary() {
        let grid = GridSpec::new(2, 2).expect("grid");
        assert_eq!(grid.neighbor(0, DIR_UP), None);
        assert_eq!(grid.neighbor(0, DIR_RIGHT), Some(1));
        assert_eq!(grid.neighbor(0, DIR_DOWN), Some(2));
        assert_eq!(grid.neighbor(1, DIR_RIGHT), None);
        assert_eq!(opposite_dir(DIR_LEFT), DIR_RIGHT);
    }
}
