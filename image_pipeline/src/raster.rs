use std::io::Cursor;

use base64::Engine;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageReader, RgbaImage};
use pazuru_core::shape::{fmt_f32, PiecePath, Segment};
use pazuru_core::PieceShape;
use tiny_skia::{FillRule, Mask, Path, PathBuilder, Transform};
use tracing::debug;

use crate::document::PieceBody;
use crate::error::GenerateError;
use crate::generator::PieceRenderer;

/// Clips a stretched bitmap to each piece outline and embeds the result as
/// a PNG data URL.
pub struct RasterRenderer {
    canvas: RgbaImage,
}

impl RasterRenderer {
    pub fn from_bytes(bytes: &[u8], width: u32, height: u32) -> Result<Self, GenerateError> {
        let rgba = decode_rgba8(bytes)?;
        debug!(
            src_width = rgba.width(),
            src_height = rgba.height(),
            width,
            height,
            "stretching raster source"
        );
        Ok(Self::from_image(resize_to(rgba, width, height)))
    }

    /// Wraps a canvas that already has the puzzle's pixel size.
    pub fn from_image(canvas: RgbaImage) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Masked, cropped pixels for one piece plus the crop's cell-local
    /// origin.
    pub fn clip_piece(
        &self,
        shape: &PieceShape,
        origin: (f32, f32),
    ) -> Result<(RgbaImage, (f32, f32)), GenerateError> {
        let outline = outline_path(&shape.path).ok_or_else(|| {
            GenerateError::Encode(format!("piece {} has a degenerate outline", shape.index + 1))
        })?;
        let bounds = outline.bounds();
        let canvas_w = self.canvas.width();
        let canvas_h = self.canvas.height();
        let x0 = (origin.0 + bounds.left()).floor().max(0.0) as u32;
        let y0 = (origin.1 + bounds.top()).floor().max(0.0) as u32;
        let x1 = ((origin.0 + bounds.right()).ceil().max(0.0) as u32).min(canvas_w);
        let y1 = ((origin.1 + bounds.bottom()).ceil().max(0.0) as u32).min(canvas_h);
        let x0 = x0.min(x1);
        let y0 = y0.min(y1);
        let width = x1 - x0;
        let height = y1 - y0;

        let mut mask = Mask::new(width, height).ok_or_else(|| {
            GenerateError::Encode(format!(
                "piece {} does not overlap the {canvas_w}x{canvas_h} canvas",
                shape.index + 1
            ))
        })?;
        let shift = Transform::from_translate(origin.0 - x0 as f32, origin.1 - y0 as f32);
        mask.fill_path(&outline, FillRule::EvenOdd, true, shift);

        let mut piece = image::imageops::crop_imm(&self.canvas, x0, y0, width, height).to_image();
        for (pixel, &cover) in piece.pixels_mut().zip(mask.data()) {
            let alpha = u16::from(pixel.0[3]) * u16::from(cover);
            pixel.0[3] = ((alpha + 127) / 255) as u8;
        }
        Ok((piece, (x0 as f32 - origin.0, y0 as f32 - origin.1)))
    }
}

/// Cell-local outline as a closed tiny-skia path.
fn outline_path(path: &PiecePath) -> Option<Path> {
    let mut builder = PathBuilder::new();
    builder.move_to(path.start.0, path.start.1);
    for segment in &path.segments {
        match *segment {
            Segment::LineTo { x, y } => builder.line_to(x, y),
            Segment::QuadTo { cx, cy, x, y } => builder.quad_to(cx, cy, x, y),
        }
    }
    builder.close();
    builder.finish()
}

impl PieceRenderer for RasterRenderer {
    fn render_piece(
        &self,
        shape: &PieceShape,
        origin: (f32, f32),
    ) -> Result<PieceBody, GenerateError> {
        let (piece, (x, y)) = self.clip_piece(shape, origin)?;
        let png = encode_png(&piece)?;
        let data = base64::engine::general_purpose::STANDARD.encode(png);
        let content = format!(
            r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="none" href="data:image/png;base64,{}"/>"#,
            fmt_f32(x),
            fmt_f32(y),
            piece.width(),
            piece.height(),
            data
        );
        Ok(PieceBody {
            defs: String::new(),
            content,
        })
    }
}

/// Decodes PNG/JPEG and applies the EXIF orientation, if any.
pub fn decode_rgba8(bytes: &[u8]) -> Result<RgbaImage, GenerateError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| GenerateError::Decode(err.to_string()))?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|err| GenerateError::Decode(err.to_string()))?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut image =
        DynamicImage::from_decoder(decoder).map_err(|err| GenerateError::Decode(err.to_string()))?;
    image.apply_orientation(orientation);
    if image.width() == 0 || image.height() == 0 {
        return Err(GenerateError::Decode("image has no pixels".to_string()));
    }
    Ok(image.to_rgba8())
}

fn resize_to(rgba: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if rgba.dimensions() == (width, height) {
        return rgba;
    }
    image::imageops::resize(&rgba, width.max(1), height.max(1), FilterType::Lanczos3)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, GenerateError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|err| GenerateError::Encode(err.to_string()))?;
    Ok(out)
}
