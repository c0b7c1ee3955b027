use std::path::PathBuf;

use pazuru_core::ShapeError;

/// Coarse classification for callers that branch on failure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    UnsupportedFormat,
    Io,
    Content,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ShapeError),
    #[error("invalid configuration: a {cols}x{rows} grid of {piece_width}x{piece_height} pieces overflows the canvas size")]
    CanvasTooLarge {
        cols: u32,
        rows: u32,
        piece_width: u32,
        piece_height: u32,
    },
    #[error("unsupported input format {extension:?}, expected png, jpg, jpeg or svg")]
    UnsupportedFormat { extension: String },
    #[error("failed to read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("image encode failed: {0}")]
    Encode(String),
    #[error("invalid svg source: {0}")]
    Vector(String),
}

impl GenerateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerateError::Configuration(_) | GenerateError::CanvasTooLarge { .. } => {
                ErrorKind::Configuration
            }
            GenerateError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            GenerateError::ReadInput { .. }
            | GenerateError::CreateOutput { .. }
            | GenerateError::WriteOutput { .. } => ErrorKind::Io,
            GenerateError::Decode(_) | GenerateError::Encode(_) | GenerateError::Vector(_) => {
                ErrorKind::Content
            }
        }
    }
}
