pub const ZOOM_MIN: f32 = 0.1;
pub const ZOOM_MAX: f32 = 10.0;
pub const ZOOM_DEFAULT: f32 = 1.0;
pub const ZOOM_STEP: f32 = 0.1;

pub const ROTATE_STEP_DEG: f32 = 5.0;

pub const SOLVE_TOLERANCE_PX: f32 = 10.0;
pub const SOLVE_REFERENCE_INDEX: usize = 0;

pub const HINT_SPREAD: f32 = 1.5;

pub const SCRAMBLE_MIN_X: f32 = 50.0;
pub const SCRAMBLE_MAX_X: f32 = 450.0;
pub const SCRAMBLE_MIN_Y: f32 = 50.0;
pub const SCRAMBLE_MAX_Y: f32 = 350.0;
pub const SCRAMBLE_ROTATION_STEP_DEG: f32 = 5.0;
pub const SCRAMBLE_ROTATION_STEPS: u32 = 8;

pub fn normalize_angle(mut angle: f32) -> f32 {
    angle %= 360.0;
    if angle < 0.0 {
        angle += 360.0;
    }
    angle
}

/// Exact upright check: any whole number of turns, either direction.
pub fn is_upright(rotation_deg: f32) -> bool {
    rotation_deg % 360.0 == 0.0
}

/// Scramble angle for a drawn step. Steps start at one so a freshly
/// scrambled piece is never upright.
pub fn scramble_rotation(step: u32, step_deg: f32) -> f32 {
    (step + 1) as f32 * step_deg
}

pub fn hint_position(target: (f32, f32), spread: f32) -> (f32, f32) {
    (target.0 * spread, target.1 * spread)
}

/// Translation-invariant solve check.
///
/// Every piece's offset from the reference piece must match its target
/// offset within `tolerance` on both axes, and every rotation must be a
/// whole number of turns. An empty board is never solved.
pub fn is_solved(
    positions: &[(f32, f32)],
    rotations: &[f32],
    targets: &[(f32, f32)],
    reference: usize,
    tolerance: f32,
) -> bool {
    let total = targets.len();
    if total == 0 || positions.len() != total || rotations.len() != total {
        return false;
    }
    if reference >= total {
        return false;
    }
    let ref_pos = positions[reference];
    let ref_target = targets[reference];
    for id in 0..total {
        if !is_upright(rotations[id]) {
            return false;
        }
        let current = (positions[id].0 - ref_pos.0, positions[id].1 - ref_pos.1);
        let expected = (targets[id].0 - ref_target.0, targets[id].1 - ref_target.1);
        if (current.0 - expected.0).abs() >= tolerance
            || (current.1 - expected.1).abs() >= tolerance
        {
            return false;
        }
    }
    true
}
