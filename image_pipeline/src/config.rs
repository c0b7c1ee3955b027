use pazuru_core::shape::{PIECE_SIZE_DEFAULT, TAB_SIZE_DEFAULT};
use pazuru_core::{GridSpec, PieceGeometry};
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;

pub const OUTLINE_COLOR_DEFAULT: &str = "#333";
pub const OUTLINE_WIDTH_DEFAULT: f32 = 2.0;
pub const LABEL_FONT_RATIO: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub piece_width: u32,
    pub piece_height: u32,
    pub tab_size: u32,
    pub outline_color: String,
    pub outline_width: f32,
    pub label: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            piece_width: PIECE_SIZE_DEFAULT as u32,
            piece_height: PIECE_SIZE_DEFAULT as u32,
            tab_size: TAB_SIZE_DEFAULT as u32,
            outline_color: OUTLINE_COLOR_DEFAULT.to_string(),
            outline_width: OUTLINE_WIDTH_DEFAULT,
            label: true,
        }
    }
}

impl GeneratorConfig {
    pub fn geometry(&self) -> PieceGeometry {
        PieceGeometry {
            piece_width: self.piece_width as f32,
            piece_height: self.piece_height as f32,
            tab_size: self.tab_size as f32,
        }
    }

    /// Pixel size the whole source is stretched to.
    pub fn canvas_size(&self, grid: GridSpec) -> Result<(u32, u32), GenerateError> {
        let width = grid.cols.checked_mul(self.piece_width);
        let height = grid.rows.checked_mul(self.piece_height);
        match (width, height) {
            (Some(width), Some(height)) => Ok((width, height)),
            _ => Err(GenerateError::CanvasTooLarge {
                cols: grid.cols,
                rows: grid.rows,
                piece_width: self.piece_width,
                piece_height: self.piece_height,
            }),
        }
    }
}
