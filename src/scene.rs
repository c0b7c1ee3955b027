use std::fmt::Write;

use pazuru_core::shape::fmt_f32;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::render::{PieceSprite, PieceSurface};

pub const SCENE_WIDTH_DEFAULT: f32 = 800.0;
pub const SCENE_HEIGHT_DEFAULT: f32 = 600.0;

const SELECTED_STROKE: &str = "#1e64ff";

/// A loaded piece document plus the numbers needed to place it.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceAsset {
    content: String,
    width: f32,
    height: f32,
    view_box: [f32; 4],
    cell_center: (f32, f32),
}

impl PieceAsset {
    /// Parses the root `<svg>` of a piece document. Anything before the
    /// root element (XML declaration, comments) is dropped.
    pub fn new(text: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(text);
        loop {
            let start = reader.buffer_position() as usize;
            match reader.read_event() {
                Ok(Event::Start(root)) | Ok(Event::Empty(root)) => {
                    if root.local_name().as_ref() != b"svg" {
                        return Err("root element is not <svg>".to_string());
                    }
                    let mut asset = Self::from_root(&root)?;
                    asset.content = text[start..].trim().to_string();
                    return Ok(asset);
                }
                Ok(Event::Eof) => return Err("document has no root element".to_string()),
                Ok(_) => {}
                Err(err) => return Err(err.to_string()),
            }
        }
    }

    fn from_root(root: &BytesStart<'_>) -> Result<Self, String> {
        let mut width = None;
        let mut height = None;
        let mut view_box = None;
        let mut cell_width = None;
        let mut cell_height = None;
        for attr in root.attributes() {
            let attr = attr.map_err(|err| err.to_string())?;
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            match attr.key.as_ref() {
                b"width" => width = parse_length(&value),
                b"height" => height = parse_length(&value),
                b"viewBox" => view_box = parse_view_box(&value),
                b"data-cell-width" => cell_width = parse_length(&value),
                b"data-cell-height" => cell_height = parse_length(&value),
                _ => {}
            }
        }
        let view_box = match (view_box, width, height) {
            (Some(view_box), _, _) => view_box,
            (None, Some(w), Some(h)) => [0.0, 0.0, w, h],
            _ => return Err("piece has neither viewBox nor width/height".to_string()),
        };
        if view_box[2] <= 0.0 || view_box[3] <= 0.0 {
            return Err("piece viewBox is empty".to_string());
        }
        let width = width.unwrap_or(view_box[2]);
        let height = height.unwrap_or(view_box[3]);
        let cell_center = match (cell_width, cell_height) {
            (Some(w), Some(h)) => (w * 0.5, h * 0.5),
            _ => (
                view_box[0] + view_box[2] * 0.5,
                view_box[1] + view_box[3] * 0.5,
            ),
        };
        Ok(Self {
            content: String::new(),
            width,
            height,
            view_box,
            cell_center,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Cell center in the asset's own viewport coordinates; the point that
    /// sits on the piece's board position.
    pub fn anchor(&self) -> (f32, f32) {
        let scale_x = self.width / self.view_box[2];
        let scale_y = self.height / self.view_box[3];
        (
            (self.cell_center.0 - self.view_box[0]) * scale_x,
            (self.cell_center.1 - self.view_box[1]) * scale_y,
        )
    }
}

fn parse_length(value: &str) -> Option<f32> {
    let value = value.trim();
    let value = value.strip_suffix("px").unwrap_or(value);
    value.trim().parse().ok()
}

fn parse_view_box(value: &str) -> Option<[f32; 4]> {
    let mut parts = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f32>().ok());
    let mut out = [0.0; 4];
    for slot in &mut out {
        *slot = parts.next()??;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

/// Composes the whole board into one SVG document.
#[derive(Debug, Clone)]
pub struct SvgScene {
    width: f32,
    height: f32,
    body: String,
}

impl Default for SvgScene {
    fn default() -> Self {
        Self::new(SCENE_WIDTH_DEFAULT, SCENE_HEIGHT_DEFAULT)
    }
}

impl SvgScene {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{}</svg>\n",
            self.body,
            w = fmt_f32(self.width),
            h = fmt_f32(self.height),
        )
    }
}

impl PieceSurface for SvgScene {
    fn draw_piece(&mut self, sprite: &PieceSprite, asset: &PieceAsset) {
        let (ax, ay) = asset.anchor();
        let _ = writeln!(
            self.body,
            r#"<g data-piece="{}" transform="translate({} {}) rotate({}) scale({}) translate({} {})">"#,
            sprite.id,
            fmt_f32(sprite.x),
            fmt_f32(sprite.y),
            fmt_f32(sprite.rotation_deg),
            fmt_f32(sprite.scale),
            fmt_f32(-ax),
            fmt_f32(-ay),
        );
        self.body.push_str(asset.content());
        self.body.push('\n');
        if sprite.selected {
            let (w, h) = asset.size();
            let _ = writeln!(
                self.body,
                r#"<rect width="{}" height="{}" fill="none" stroke="{SELECTED_STROKE}" stroke-width="2"/>"#,
                fmt_f32(w),
                fmt_f32(h),
            );
        }
        self.body.push_str("</g>\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIECE: &str = r#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" width="110" height="100" viewBox="-10 0 110 100" data-cell-width="100" data-cell-height="100">
<path d="M 0 0 Z"/>
</svg>
"#;

    #[test]
    fn asset_anchor_is_cell_center() {
        let asset = PieceAsset::new(PIECE).expect("asset");
        assert_eq!(asset.size(), (110.0, 100.0));
        assert_eq!(asset.anchor(), (60.0, 50.0));
        assert!(asset.content().starts_with("<svg "));
        assert!(asset.content().ends_with("</svg>"));
    }

    #[test]
    fn asset_without_cell_data_uses_view_box_center() {
        let asset = PieceAsset::new(r#"<svg width="100px" height="100px"></svg>"#).expect("asset");
        assert_eq!(asset.anchor(), (50.0, 50.0));
    }

    #[test]
    fn asset_rejects_non_svg_root() {
        assert!(PieceAsset::new("<html></html>").is_err());
        assert!(PieceAsset::new("").is_err());
        assert!(PieceAsset::new(r#"<svg viewBox="0 0 0 5"/>"#).is_err());
    }

    #[test]
    fn scene_places_anchor_on_sprite() {
        let asset = PieceAsset::new(PIECE).expect("asset");
        let sprite = PieceSprite {
            id: 1,
            file: "piece2.svg".to_string(),
            x: 150.0,
            y: 50.0,
            rotation_deg: 10.0,
            scale: 2.0,
            selected: true,
        };
        let mut scene = SvgScene::new(400.0, 300.0);
        scene.draw_piece(&sprite, &asset);
        let svg = scene.finish();
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg""#));
        assert!(svg.contains(r#"viewBox="0 0 400 300""#));
        assert!(svg.contains(
            r#"transform="translate(150 50) rotate(10) scale(2) translate(-60 -50)""#
        ));
        assert!(svg.contains(SELECTED_STROKE));
    }
}
