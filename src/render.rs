use pazuru_core::game::normalize_angle;

use crate::board::BoardSnapshot;
use crate::reveal::RevealMode;
use crate::scene::PieceAsset;

/// One piece as the host should draw it, in display coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceSprite {
    pub id: usize,
    pub file: String,
    pub x: f32,
    pub y: f32,
    pub rotation_deg: f32,
    pub scale: f32,
    pub selected: bool,
}

/// Pure projection of a board snapshot; sprites are back to front.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub zoom: f32,
    pub pan: (f32, f32),
    pub reveal: RevealMode,
    pub sprites: Vec<PieceSprite>,
}

impl RenderFrame {
    pub fn project(snapshot: &BoardSnapshot) -> Self {
        let view = snapshot.view;
        let sprites = snapshot
            .z_order
            .iter()
            .filter_map(|&id| {
                let piece = snapshot.pieces.get(id)?;
                let (x, y) = view.to_display(piece.pose.pos);
                Some(PieceSprite {
                    id,
                    file: piece.file.clone(),
                    x,
                    y,
                    rotation_deg: normalize_angle(piece.pose.rotation_deg),
                    scale: view.zoom,
                    selected: snapshot.selected == Some(id),
                })
            })
            .collect();
        Self {
            zoom: view.zoom,
            pan: view.pan,
            reveal: snapshot.reveal,
            sprites,
        }
    }
}

/// Drawing backend fed by [`render_to`].
pub trait PieceSurface {
    fn draw_piece(&mut self, sprite: &PieceSprite, asset: &PieceAsset);
}

/// Projects `snapshot` and draws every sprite in z-order.
pub fn render_to<S: PieceSurface + ?Sized>(snapshot: &BoardSnapshot, surface: &mut S) -> RenderFrame {
    let frame = RenderFrame::project(snapshot);
    for sprite in &frame.sprites {
        if let Some(piece) = snapshot.pieces.get(sprite.id) {
            surface.draw_piece(sprite, &piece.asset);
        }
    }
    frame
}
