use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE_NAME: &str = "puzzle.json";
pub const PIECE_FILE_PREFIX: &str = "piece";
pub const PIECE_FILE_EXT: &str = "svg";

/// One row of `puzzle.json`: where a piece's center sits in the solved
/// image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    pub x: f32,
    pub y: f32,
}

impl ManifestEntry {
    pub fn target(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// `piece{n}.svg` for the 0-based piece index.
pub fn piece_file_name(index: usize) -> String {
    format!("{}{}.{}", PIECE_FILE_PREFIX, index + 1, PIECE_FILE_EXT)
}

pub fn encode_manifest(entries: &[ManifestEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

pub fn decode_manifest(text: &str) -> Result<Vec<ManifestEntry>, serde_json::Error> {
    serde_json::from_str(text)
}
