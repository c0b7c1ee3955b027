use std::fs;
use std::path::{Path, PathBuf};

use pazuru_core::manifest::encode_manifest;
use pazuru_core::{
    build_piece_shapes, piece_file_name, GridSpec, ManifestEntry, PieceShape, ShapeError,
    MANIFEST_FILE_NAME,
};
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::document::{piece_document, PieceBody};
use crate::error::GenerateError;
use crate::raster::RasterRenderer;
use crate::source::SourceFormat;
use crate::vector::VectorRenderer;

/// A clipping backend. `origin` is the cell's top-left corner in canvas
/// coordinates; the returned body is in cell-local coordinates.
pub trait PieceRenderer {
    fn render_piece(&self, shape: &PieceShape, origin: (f32, f32))
        -> Result<PieceBody, GenerateError>;
}

#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub format: SourceFormat,
    pub grid: GridSpec,
    pub manifest_path: PathBuf,
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone)]
pub struct RenderedPiece {
    pub file: String,
    pub svg: String,
    pub entry: ManifestEntry,
}

/// Slices `input` into `cols` x `rows` pieces and writes them plus the
/// manifest into `output`.
///
/// Input format and configuration are checked before anything is read or
/// written. All pieces are rendered in memory first, any earlier manifest in
/// `output` is removed before the first piece is written, and the new
/// manifest is written last. A failed run never leaves a manifest behind.
pub fn generate_puzzle(
    input: &Path,
    cols: u32,
    rows: u32,
    output: &Path,
    config: &GeneratorConfig,
) -> Result<GenerateReport, GenerateError> {
    let format = SourceFormat::from_path(input)?;
    let grid = GridSpec::new(cols, rows).map_err(ShapeError::from)?;
    let shapes = build_piece_shapes(grid, &config.geometry())?;
    let (width, height) = config.canvas_size(grid)?;
    let bytes = fs::read(input).map_err(|source| GenerateError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;
    info!(
        input = %input.display(),
        format = format.label(),
        cols,
        rows,
        "generating puzzle"
    );

    let renderer: Box<dyn PieceRenderer> = match format {
        SourceFormat::Raster => Box::new(RasterRenderer::from_bytes(&bytes, width, height)?),
        SourceFormat::Vector => Box::new(VectorRenderer::parse(&bytes, width, height)?),
    };
    let pieces = render_pieces(renderer.as_ref(), &shapes, config)?;

    fs::create_dir_all(output).map_err(|source| GenerateError::CreateOutput {
        path: output.to_path_buf(),
        source,
    })?;
    remove_stale_manifest(output)?;
    for piece in &pieces {
        let path = output.join(&piece.file);
        fs::write(&path, &piece.svg).map_err(|source| GenerateError::WriteOutput {
            path: path.clone(),
            source,
        })?;
    }
    let entries: Vec<ManifestEntry> = pieces.into_iter().map(|piece| piece.entry).collect();
    let manifest_path = write_manifest(output, &entries)?;
    info!(
        pieces = entries.len(),
        manifest = %manifest_path.display(),
        "puzzle written"
    );

    Ok(GenerateReport {
        format,
        grid,
        manifest_path,
        entries,
    })
}

/// Renders every piece document in row-major order without touching disk.
pub fn render_pieces(
    renderer: &dyn PieceRenderer,
    shapes: &[PieceShape],
    config: &GeneratorConfig,
) -> Result<Vec<RenderedPiece>, GenerateError> {
    let geometry = config.geometry();
    let mut pieces = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let origin = geometry.cell_origin(shape.col, shape.row);
        let body = renderer.render_piece(shape, origin)?;
        let svg = piece_document(shape, &body, config);
        let (x, y) = geometry.cell_center(shape.col, shape.row);
        let file = piece_file_name(shape.index);
        debug!(piece = shape.number(), file = %file, bytes = svg.len(), "rendered piece");
        pieces.push(RenderedPiece {
            entry: ManifestEntry {
                file: file.clone(),
                x,
                y,
            },
            file,
            svg,
        });
    }
    Ok(pieces)
}

/// Drops a manifest from an earlier run before any piece is overwritten.
fn remove_stale_manifest(output: &Path) -> Result<(), GenerateError> {
    let path = output.join(MANIFEST_FILE_NAME);
    match fs::remove_file(&path) {
        Ok(()) => {
            debug!(manifest = %path.display(), "removed stale manifest");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(GenerateError::WriteOutput { path, source }),
    }
}

fn write_manifest(output: &Path, entries: &[ManifestEntry]) -> Result<PathBuf, GenerateError> {
    let path = output.join(MANIFEST_FILE_NAME);
    let tmp = output.join(format!("{MANIFEST_FILE_NAME}.tmp"));
    let text = encode_manifest(entries).map_err(|err| GenerateError::Encode(err.to_string()))?;
    fs::write(&tmp, text).map_err(|source| GenerateError::WriteOutput {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, &path).map_err(|source| GenerateError::WriteOutput {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
