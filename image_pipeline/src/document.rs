use std::fmt::Write;

use pazuru_core::shape::fmt_f32;
use pazuru_core::PieceShape;

use crate::config::{GeneratorConfig, LABEL_FONT_RATIO};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Backend output for one piece, in cell-local coordinates.
#[derive(Debug, Clone, Default)]
pub struct PieceBody {
    pub defs: String,
    pub content: String,
}

/// Id of the clip path shared by the body and nothing else.
pub fn clip_id(shape: &PieceShape) -> String {
    format!("piece{}-clip", shape.number())
}

/// Prefix applied to every id copied out of a vector source.
pub fn id_prefix(shape: &PieceShape) -> String {
    format!("p{}-", shape.number())
}

pub fn piece_document(shape: &PieceShape, body: &PieceBody, config: &GeneratorConfig) -> String {
    let view_box = shape.view_box();
    let outline = shape.path.to_svg_path();
    let mut doc = String::new();
    let _ = write!(
        doc,
        r#"<svg xmlns="{SVG_NS}" xmlns:xlink="{XLINK_NS}" width="{}" height="{}" viewBox="{}" data-cell-width="{}" data-cell-height="{}">"#,
        fmt_f32(view_box.width()),
        fmt_f32(view_box.height()),
        view_box.to_view_box(),
        fmt_f32(shape.width),
        fmt_f32(shape.height),
    );
    doc.push('\n');
    if !body.defs.is_empty() {
        let _ = writeln!(doc, "<defs>{}</defs>", body.defs);
    }
    doc.push_str(&body.content);
    doc.push('\n');
    let _ = writeln!(
        doc,
        r#"<path d="{outline}" fill="none" stroke="{}" stroke-width="{}"/>"#,
        escape_attr(&config.outline_color),
        fmt_f32(config.outline_width),
    );
    if config.label {
        let font_size = shape.width.min(shape.height) * LABEL_FONT_RATIO;
        let _ = writeln!(
            doc,
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="{}" font-weight="bold" fill="white" stroke="black" stroke-width="1">{}</text>"#,
            fmt_f32(shape.width * 0.5),
            fmt_f32(shape.height * 0.5 + font_size * 0.4),
            fmt_f32(font_size),
            shape.number(),
        );
    }
    doc.push_str("</svg>\n");
    doc
}

pub(crate) fn clip_path_def(shape: &PieceShape) -> String {
    format!(
        r#"<clipPath id="{}"><path d="{}"/></clipPath>"#,
        clip_id(shape),
        shape.path.to_svg_path()
    )
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
