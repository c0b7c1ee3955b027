use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::grid::{build_edge_maps, EdgeKind, GridError, GridSpec, PieceEdges};

pub const PIECE_SIZE_DEFAULT: f32 = 100.0;
pub const TAB_SIZE_DEFAULT: f32 = 20.0;
/// Largest tab size as a fraction of the shorter cell side.
pub const TAB_SIZE_MAX_RATIO: f32 = 0.5;
const CLOSE_EPSILON: f32 = 1.0e-3;

/// Cell size and tab size, all in output pixels / SVG user units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceGeometry {
    pub piece_width: f32,
    pub piece_height: f32,
    pub tab_size: f32,
}

impl Default for PieceGeometry {
    fn default() -> Self {
        Self {
            piece_width: PIECE_SIZE_DEFAULT,
            piece_height: PIECE_SIZE_DEFAULT,
            tab_size: TAB_SIZE_DEFAULT,
        }
    }
}

impl PieceGeometry {
    pub fn validate(&self) -> Result<(), ShapeError> {
        let width = self.piece_width;
        let height = self.piece_height;
        if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
            return Err(ShapeError::InvalidPieceSize { width, height });
        }
        let max = self.tab_size_max();
        if !self.tab_size.is_finite() || self.tab_size <= 0.0 || self.tab_size > max {
            return Err(ShapeError::TabSizeOutOfRange {
                tab_size: self.tab_size,
                max,
            });
        }
        Ok(())
    }

    pub fn tab_size_max(&self) -> f32 {
        self.piece_width.min(self.piece_height) * TAB_SIZE_MAX_RATIO
    }

    /// How far a tab protrudes past (or a blank cuts into) the cell edge.
    pub fn tab_depth(&self) -> f32 {
        self.tab_size * 0.5
    }

    pub fn cell_origin(&self, col: u32, row: u32) -> (f32, f32) {
        (col as f32 * self.piece_width, row as f32 * self.piece_height)
    }

    pub fn cell_center(&self, col: u32, row: u32) -> (f32, f32) {
        let (x, y) = self.cell_origin(col, row);
        (x + self.piece_width * 0.5, y + self.piece_height * 0.5)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeError {
    Grid(GridError),
    InvalidPieceSize { width: f32, height: f32 },
    TabSizeOutOfRange { tab_size: f32, max: f32 },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::Grid(err) => err.fmt(f),
            ShapeError::InvalidPieceSize { width, height } => {
                write!(f, "piece size must be at least 1x1, got {width}x{height}")
            }
            ShapeError::TabSizeOutOfRange { tab_size, max } => {
                write!(f, "tab size {tab_size} must be in (0, {max}]")
            }
        }
    }
}

impl std::error::Error for ShapeError {}

impl From<GridError> for ShapeError {
    fn from(err: GridError) -> Self {
        ShapeError::Grid(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgeOrientation {
    Top,
    Right,
    Bottom,
    Left,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment {
    LineTo { x: f32, y: f32 },
    QuadTo { cx: f32, cy: f32, x: f32, y: f32 },
}

impl Segment {
    pub fn end(&self) -> (f32, f32) {
        match *self {
            Segment::LineTo { x, y } => (x, y),
            Segment::QuadTo { x, y, .. } => (x, y),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    fn at(x: f32, y: f32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn include(&mut self, x: f32, y: f32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn to_view_box(&self) -> String {
        format!(
            "{} {} {} {}",
            fmt_f32(self.min_x),
            fmt_f32(self.min_y),
            fmt_f32(self.width()),
            fmt_f32(self.height())
        )
    }
}

/// Extra room a piece needs outside its cell on each side.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PiecePath {
    pub start: (f32, f32),
    pub segments: Vec<Segment>,
}

impl PiecePath {
    pub fn end_point(&self) -> (f32, f32) {
        self.segments.last().map(Segment::end).unwrap_or(self.start)
    }

    pub fn is_closed(&self) -> bool {
        let (ex, ey) = self.end_point();
        (ex - self.start.0).abs() <= CLOSE_EPSILON && (ey - self.start.1).abs() <= CLOSE_EPSILON
    }

    /// Box around every end and control point. Tab and blank curves peak
    /// at their control height, so for piece outlines this is the exact
    /// extent of the curve.
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::at(self.start.0, self.start.1);
        for segment in &self.segments {
            if let Segment::QuadTo { cx, cy, .. } = *segment {
                bounds.include(cx, cy);
            }
            let (x, y) = segment.end();
            bounds.include(x, y);
        }
        bounds
    }

    pub fn to_svg_path(&self) -> String {
        let mut path = String::new();
        let _ = write!(
            path,
            "M {} {}",
            fmt_f32(self.start.0),
            fmt_f32(self.start.1)
        );
        for segment in &self.segments {
            match *segment {
                Segment::LineTo { x, y } => {
                    let _ = write!(path, " L {} {}", fmt_f32(x), fmt_f32(y));
                }
                Segment::QuadTo { cx, cy, x, y } => {
                    let _ = write!(
                        path,
                        " Q {} {} {} {}",
                        fmt_f32(cx),
                        fmt_f32(cy),
                        fmt_f32(x),
                        fmt_f32(y)
                    );
                }
            }
        }
        if self.is_closed() {
            path.push_str(" Z");
        }
        path
    }
}

/// Edge-local segments: x runs along the edge from 0 to `len`, positive y
/// points out of the piece.
pub fn edge_segments(len: f32, tab_size: f32, kind: EdgeKind) -> Vec<Segment> {
    if !kind.is_curved() {
        return vec![Segment::LineTo { x: len, y: 0.0 }];
    }
    let half = len * 0.5;
    let spread = tab_size * 0.5;
    let depth = kind.sign() * tab_size * 0.5;
    vec![
        Segment::QuadTo {
            cx: half - spread,
            cy: depth,
            x: half,
            y: depth,
        },
        Segment::QuadTo {
            cx: half + spread,
            cy: depth,
            x: len,
            y: 0.0,
        },
    ]
}

pub fn reverse_segments(segments: &[Segment]) -> Vec<Segment> {
    let mut states = Vec::with_capacity(segments.len());
    let mut current = (0.0, 0.0);
    for segment in segments {
        let end = segment.end();
        states.push((current, *segment, end));
        current = end;
    }

    let mut reversed = Vec::with_capacity(segments.len());
    for (start, segment, _end) in states.into_iter().rev() {
        match segment {
            Segment::LineTo { .. } => reversed.push(Segment::LineTo {
                x: start.0,
                y: start.1,
            }),
            Segment::QuadTo { cx, cy, .. } => reversed.push(Segment::QuadTo {
                cx,
                cy,
                x: start.0,
                y: start.1,
            }),
        }
    }
    reversed
}

pub fn map_point(orientation: EdgeOrientation, origin: (f32, f32), x: f32, y: f32) -> (f32, f32) {
    let (ox, oy) = origin;
    match orientation {
        EdgeOrientation::Top => (ox + x, oy - y),
        EdgeOrientation::Right => (ox + y, oy + x),
        EdgeOrientation::Bottom => (ox + x, oy + y),
        EdgeOrientation::Left => (ox - y, oy + x),
    }
}

fn append_segments(
    out: &mut Vec<Segment>,
    segments: &[Segment],
    orientation: EdgeOrientation,
    origin: (f32, f32),
) {
    for segment in segments {
        match *segment {
            Segment::LineTo { x, y } => {
                let (gx, gy) = map_point(orientation, origin, x, y);
                out.push(Segment::LineTo { x: gx, y: gy });
            }
            Segment::QuadTo { cx, cy, x, y } => {
                let (gcx, gcy) = map_point(orientation, origin, cx, cy);
                let (gx, gy) = map_point(orientation, origin, x, y);
                out.push(Segment::QuadTo {
                    cx: gcx,
                    cy: gcy,
                    x: gx,
                    y: gy,
                });
            }
        }
    }
}

/// Outline of one piece in cell-local coordinates, clockwise from the
/// top-left corner.
pub fn build_piece_path(edges: &PieceEdges, geometry: &PieceGeometry) -> PiecePath {
    let width = geometry.piece_width;
    let height = geometry.piece_height;
    let tab = geometry.tab_size;

    let top = edge_segments(width, tab, edges.top);
    let right = edge_segments(height, tab, edges.right);
    let bottom = reverse_segments(&edge_segments(width, tab, edges.bottom));
    let left = reverse_segments(&edge_segments(height, tab, edges.left));

    let mut segments = Vec::with_capacity(top.len() + right.len() + bottom.len() + left.len());
    append_segments(&mut segments, &top, EdgeOrientation::Top, (0.0, 0.0));
    append_segments(&mut segments, &right, EdgeOrientation::Right, (width, 0.0));
    append_segments(&mut segments, &bottom, EdgeOrientation::Bottom, (0.0, height));
    append_segments(&mut segments, &left, EdgeOrientation::Left, (0.0, 0.0));

    PiecePath {
        start: (0.0, 0.0),
        segments,
    }
}

pub fn piece_padding(edges: &PieceEdges, geometry: &PieceGeometry) -> Padding {
    let depth = geometry.tab_depth();
    let pad = |kind: EdgeKind| if kind == EdgeKind::Tab { depth } else { 0.0 };
    Padding {
        top: pad(edges.top),
        right: pad(edges.right),
        bottom: pad(edges.bottom),
        left: pad(edges.left),
    }
}

#[derive(Clone, Debug)]
pub struct PieceShape {
    pub index: usize,
    pub col: u32,
    pub row: u32,
    pub edges: PieceEdges,
    pub path: PiecePath,
    pub padding: Padding,
    pub width: f32,
    pub height: f32,
}

impl PieceShape {
    /// 1-based number used for labels and file names.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Piece bounding box in cell-local coordinates.
    pub fn view_box(&self) -> Bounds {
        Bounds {
            min_x: -self.padding.left,
            min_y: -self.padding.top,
            max_x: self.width + self.padding.right,
            max_y: self.height + self.padding.bottom,
        }
    }
}

pub fn build_piece_shapes(
    grid: GridSpec,
    geometry: &PieceGeometry,
) -> Result<Vec<PieceShape>, ShapeError> {
    let grid = GridSpec::new(grid.cols, grid.rows)?;
    geometry.validate()?;
    let maps = build_edge_maps(grid);
    let shapes = grid
        .cells()
        .map(|(col, row)| {
            let edges = maps.piece_edges(col, row);
            PieceShape {
                index: grid.index_of(col, row),
                col,
                row,
                edges,
                path: build_piece_path(&edges, geometry),
                padding: piece_padding(&edges, geometry),
                width: geometry.piece_width,
                height: geometry.piece_height,
            }
        })
        .collect();
    Ok(shapes)
}

/// Compact fixed-point formatting for SVG attributes.
pub fn fmt_f32(value: f32) -> String {
    let mut text = format!("{:.3}", value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}
