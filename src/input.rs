use pazuru_core::BoardRules;

/// Host event, already resolved to a piece and display-space coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoardAction {
    Select {
        piece_id: usize,
    },
    BeginDrag {
        piece_id: usize,
        x: f32,
        y: f32,
    },
    DragMove {
        x: f32,
        y: f32,
    },
    DragEnd,
    Rotate {
        piece_id: usize,
        delta_deg: f32,
    },
    RotateSelected {
        delta_deg: f32,
    },
    Zoom {
        delta: f32,
        anchor: Option<(f32, f32)>,
    },
    CycleReveal,
    CheckSolved,
    Reset,
}

/// Keyboard shortcut table. Keys use DOM `KeyboardEvent.key` names.
pub fn action_for_key(key: &str, rules: &BoardRules) -> Option<BoardAction> {
    let action = match key {
        "q" | "Q" | "ArrowLeft" => BoardAction::RotateSelected {
            delta_deg: -rules.rotate_step_deg,
        },
        "e" | "E" | "ArrowRight" => BoardAction::RotateSelected {
            delta_deg: rules.rotate_step_deg,
        },
        "+" | "=" => BoardAction::Zoom {
            delta: rules.zoom_step,
            anchor: None,
        },
        "-" => BoardAction::Zoom {
            delta: -rules.zoom_step,
            anchor: None,
        },
        "s" | "S" => BoardAction::CycleReveal,
        "c" | "C" => BoardAction::CheckSolved,
        _ => return None,
    };
    Some(action)
}
