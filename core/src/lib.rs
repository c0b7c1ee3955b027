pub mod game;
pub mod grid;
pub mod manifest;
pub mod shape;
pub mod snapshot;

pub use grid::{build_edge_maps, EdgeKind, EdgeMaps, GridError, GridSpec, PieceEdges, TabSide};
pub use manifest::{piece_file_name, ManifestEntry, MANIFEST_FILE_NAME};
pub use shape::{
    build_piece_shapes, Bounds, PieceGeometry, PiecePath, PieceShape, Segment, ShapeError,
};
pub use snapshot::{BoardRules, PiecePose, PlacementRegion};
