use serde::{Deserialize, Serialize};

use crate::game::{
    HINT_SPREAD, ROTATE_STEP_DEG, SCRAMBLE_MAX_X, SCRAMBLE_MAX_Y, SCRAMBLE_MIN_X, SCRAMBLE_MIN_Y,
    SCRAMBLE_ROTATION_STEPS, SCRAMBLE_ROTATION_STEP_DEG, SOLVE_REFERENCE_INDEX,
    SOLVE_TOLERANCE_PX, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP,
};

/// Axis-aligned box that freshly loaded pieces are scattered into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRegion {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for PlacementRegion {
    fn default() -> Self {
        Self {
            min_x: SCRAMBLE_MIN_X,
            max_x: SCRAMBLE_MAX_X,
            min_y: SCRAMBLE_MIN_Y,
            max_y: SCRAMBLE_MAX_Y,
        }
    }
}

impl PlacementRegion {
    /// Maps unit samples in `[0, 1)` to whole-unit coordinates in the box.
    pub fn point_at(&self, unit_x: f32, unit_y: f32) -> (f32, f32) {
        let span_x = (self.max_x - self.min_x).max(0.0);
        let span_y = (self.max_y - self.min_y).max(0.0);
        (
            (self.min_x + unit_x * span_x).round(),
            (self.min_y + unit_y * span_y).round(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardRules {
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_step: f32,
    pub rotate_step_deg: f32,
    pub solve_tolerance_px: f32,
    pub solve_reference_index: usize,
    pub hint_spread: f32,
    pub placement: PlacementRegion,
    pub scramble_rotation_step_deg: f32,
    pub scramble_rotation_steps: u32,
}

impl Default for BoardRules {
    fn default() -> Self {
        Self {
            zoom_min: ZOOM_MIN,
            zoom_max: ZOOM_MAX,
            zoom_step: ZOOM_STEP,
            rotate_step_deg: ROTATE_STEP_DEG,
            solve_tolerance_px: SOLVE_TOLERANCE_PX,
            solve_reference_index: SOLVE_REFERENCE_INDEX,
            hint_spread: HINT_SPREAD,
            placement: PlacementRegion::default(),
            scramble_rotation_step_deg: SCRAMBLE_ROTATION_STEP_DEG,
            scramble_rotation_steps: SCRAMBLE_ROTATION_STEPS,
        }
    }
}

impl BoardRules {
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        let min = self.zoom_min.max(f32::EPSILON);
        let max = self.zoom_max.max(min);
        zoom.clamp(min, max)
    }
}

/// Position and rotation of one piece; what the reveal snapshot stores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiecePose {
    pub pos: (f32, f32),
    pub rotation_deg: f32,
}
