pub mod config;
pub mod document;
pub mod error;
pub mod generator;
pub mod raster;
pub mod source;
pub mod vector;

pub use config::GeneratorConfig;
pub use document::PieceBody;
pub use error::{ErrorKind, GenerateError};
pub use generator::{generate_puzzle, render_pieces, GenerateReport, PieceRenderer, RenderedPiece};
pub use raster::RasterRenderer;
pub use source::SourceFormat;
pub use vector::{VectorRenderer, VectorSource};
