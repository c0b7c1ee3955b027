use std::borrow::Cow;
use std::collections::BTreeSet;

use pazuru_core::shape::fmt_f32;
use pazuru_core::PieceShape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use tracing::debug;

use crate::document::{clip_id, clip_path_def, id_prefix, PieceBody};
use crate::error::GenerateError;
use crate::generator::PieceRenderer;

/// Parsed SVG source: the root's coordinate system and namespaces plus
/// everything between the root tags.
#[derive(Debug, Clone)]
pub struct VectorSource {
    pub view_box: String,
    pub namespaces: Vec<(String, String)>,
    content: Vec<Event<'static>>,
    ids: BTreeSet<String>,
}

impl VectorSource {
    pub fn parse(text: &str) -> Result<Self, GenerateError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);

        let mut root: Option<(String, Vec<(String, String)>)> = None;
        let mut depth = 0usize;
        let mut closed = false;
        let mut content = Vec::new();
        let mut ids = BTreeSet::new();
        loop {
            let event = reader.read_event().map_err(|err| {
                GenerateError::Vector(format!(
                    "xml error at byte {}: {}",
                    reader.buffer_position(),
                    err
                ))
            })?;
            if root.is_none() {
                match event {
                    Event::Start(ref e) => {
                        root = Some(parse_root(e)?);
                        depth = 1;
                    }
                    Event::Empty(ref e) => {
                        root = Some(parse_root(e)?);
                        closed = true;
                    }
                    Event::Eof => {
                        return Err(GenerateError::Vector("no root element".to_string()));
                    }
                    _ => {}
                }
                continue;
            }
            match event {
                Event::Eof => break,
                _ if closed => {}
                Event::Start(ref e) => {
                    ids.extend(element_id(e)?);
                    depth += 1;
                    content.push(event.into_owned());
                }
                Event::Empty(ref e) => {
                    ids.extend(element_id(e)?);
                    content.push(event.into_owned());
                }
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        closed = true;
                    } else {
                        content.push(event.into_owned());
                    }
                }
                _ => content.push(event.into_owned()),
            }
        }
        if !closed {
            return Err(GenerateError::Vector("root <svg> is never closed".to_string()));
        }
        let (view_box, namespaces) =
            root.ok_or_else(|| GenerateError::Vector("no root element".to_string()))?;
        Ok(Self {
            view_box,
            namespaces,
            content,
            ids,
        })
    }

    /// Content with every id and fragment reference prefixed.
    pub fn write_content(&self, prefix: &str) -> Result<String, GenerateError> {
        let mut writer = Writer::new(Vec::new());
        let mut style_depth = 0usize;
        for event in &self.content {
            let rewritten = match event {
                Event::Start(e) => {
                    if e.local_name().as_ref() == b"style" || style_depth > 0 {
                        style_depth += 1;
                    }
                    Event::Start(prefixed_element(e, prefix)?)
                }
                Event::Empty(e) => Event::Empty(prefixed_element(e, prefix)?),
                Event::End(_) => {
                    style_depth = style_depth.saturating_sub(1);
                    event.clone()
                }
                Event::Text(text) if style_depth > 0 => {
                    let raw = utf8(text)?;
                    let css = prefix_style_refs(raw, prefix, &self.ids);
                    Event::Text(BytesText::from_escaped(css))
                }
                Event::CData(data) if style_depth > 0 => {
                    let raw = utf8(data)?;
                    let css = prefix_style_refs(raw, prefix, &self.ids);
                    Event::CData(BytesCData::new(css))
                }
                _ => event.clone(),
            };
            writer
                .write_event(rewritten)
                .map_err(|err| GenerateError::Vector(err.to_string()))?;
        }
        String::from_utf8(writer.into_inner()).map_err(|err| GenerateError::Vector(err.to_string()))
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, GenerateError> {
    std::str::from_utf8(bytes).map_err(|err| GenerateError::Vector(format!("invalid UTF-8: {err}")))
}

fn parse_root(e: &BytesStart) -> Result<(String, Vec<(String, String)>), GenerateError> {
    if e.local_name().as_ref() != b"svg" {
        let qname = e.name();
        let name = utf8(qname.into_inner())?;
        return Err(GenerateError::Vector(format!("root element is <{name}>, not <svg>")));
    }
    let mut view_box = None;
    let mut width = None;
    let mut height = None;
    let mut namespaces = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| GenerateError::Vector(format!("attribute error: {err}")))?;
        let key = utf8(attr.key.as_ref())?;
        let value = utf8(&attr.value)?;
        match key {
            "viewBox" => view_box = Some(value.trim().to_string()),
            "width" => width = parse_length(value),
            "height" => height = parse_length(value),
            _ if key.starts_with("xmlns:") => {
                namespaces.push((key.to_string(), value.to_string()));
            }
            _ => {}
        }
    }
    let view_box = match (view_box, width, height) {
        (Some(view_box), _, _) if !view_box.is_empty() => view_box,
        (_, Some(width), Some(height)) => format!("0 0 {} {}", fmt_f32(width), fmt_f32(height)),
        _ => {
            return Err(GenerateError::Vector(
                "svg source needs a viewBox or numeric width and height".to_string(),
            ))
        }
    };
    Ok((view_box, namespaces))
}

fn element_id(e: &BytesStart) -> Result<Option<String>, GenerateError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| GenerateError::Vector(format!("attribute error: {err}")))?;
        if attr.key.as_ref() == b"id" {
            return Ok(Some(utf8(&attr.value)?.to_string()));
        }
    }
    Ok(None)
}

fn parse_length(value: &str) -> Option<f32> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    number.trim().parse::<f32>().ok().filter(|v| *v > 0.0)
}

fn prefixed_element(e: &BytesStart, prefix: &str) -> Result<BytesStart<'static>, GenerateError> {
    let name = utf8(e.name().as_ref())?.to_string();
    let mut out = BytesStart::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| GenerateError::Vector(format!("attribute error: {err}")))?;
        let key = utf8(attr.key.as_ref())?;
        let value = utf8(&attr.value)?;
        let value = rewrite_attr(key, value, prefix).replace('"', "&quot;");
        out.push_attribute(Attribute {
            key: QName(attr.key.as_ref()),
            value: Cow::Owned(value.into_bytes()),
        });
    }
    Ok(out)
}

pub(crate) fn rewrite_attr(key: &str, value: &str, prefix: &str) -> String {
    match key {
        "id" => format!("{prefix}{value}"),
        "href" | "xlink:href" => match value.strip_prefix('#') {
            Some(fragment) => format!("#{prefix}{fragment}"),
            None => value.to_string(),
        },
        _ if value.contains("url(") => prefix_url_refs(value, prefix),
        _ => value.to_string(),
    }
}

/// Rewrites `url(#x)`, `url('#x')` and `url("#x")` to point at the prefixed id.
pub(crate) fn prefix_url_refs(value: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(value.len() + prefix.len());
    let mut rest = value;
    while let Some(pos) = rest.find("url(") {
        let (head, tail) = rest.split_at(pos + 4);
        out.push_str(head);
        let quote_len = tail
            .chars()
            .next()
            .filter(|ch| *ch == '\'' || *ch == '"')
            .map(char::len_utf8)
            .unwrap_or(0);
        let (quote, after) = tail.split_at(quote_len);
        out.push_str(quote);
        match after.strip_prefix('#') {
            Some(fragment) => {
                out.push('#');
                out.push_str(prefix);
                rest = fragment;
            }
            None => rest = after,
        }
    }
    out.push_str(rest);
    out
}

/// Stylesheet rewrite: `url(#x)` references plus `#x` selectors that name an
/// id declared in the source. Hex colours stay as they are.
pub(crate) fn prefix_style_refs(css: &str, prefix: &str, ids: &BTreeSet<String>) -> String {
    let mut out = String::with_capacity(css.len() + prefix.len());
    let mut rest = css;
    while let Some(pos) = rest.find('#') {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);
        let fragment = &tail[1..];
        let len = fragment
            .find(|ch: char| !is_ident_char(ch))
            .unwrap_or(fragment.len());
        let (ident, after) = fragment.split_at(len);
        let in_url = out
            .trim_end_matches(|ch: char| ch == '\'' || ch == '"')
            .ends_with("url(");
        out.push('#');
        if !ident.is_empty() && (in_url || ids.contains(ident)) {
            out.push_str(prefix);
        }
        out.push_str(ident);
        rest = after;
    }
    out.push_str(rest);
    out
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

/// Clips a shared copy of the SVG source per piece.
pub struct VectorRenderer {
    source: VectorSource,
    width: u32,
    height: u32,
}

impl VectorRenderer {
    pub fn parse(bytes: &[u8], width: u32, height: u32) -> Result<Self, GenerateError> {
        let text = utf8(bytes)?;
        let source = VectorSource::parse(text)?;
        debug!(view_box = %source.view_box, width, height, "stretching vector source");
        Ok(Self {
            source,
            width,
            height,
        })
    }
}

impl PieceRenderer for VectorRenderer {
    fn render_piece(
        &self,
        shape: &PieceShape,
        origin: (f32, f32),
    ) -> Result<PieceBody, GenerateError> {
        let inner = self.source.write_content(&id_prefix(shape))?;
        let mut namespaces = String::new();
        for (key, value) in &self.source.namespaces {
            namespaces.push_str(&format!(r#" {key}="{value}""#));
        }
        let content = format!(
            r#"<g clip-path="url(#{})"><g transform="translate({} {})"><svg x="0" y="0" width="{}" height="{}" viewBox="{}" preserveAspectRatio="none" overflow="visible"{}>{}</svg></g></g>"#,
            clip_id(shape),
            fmt_f32(-origin.0),
            fmt_f32(-origin.1),
            self.width,
            self.height,
            self.source.view_box,
            namespaces,
            inner
        );
        Ok(PieceBody {
            defs: clip_path_def(shape),
            content,
        })
    }
}
