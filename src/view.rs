use pazuru_core::game::ZOOM_DEFAULT;

/// Board-scoped affine view: `display = zoom * logical + pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f32,
    pub pan: (f32, f32),
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: ZOOM_DEFAULT,
            pan: (0.0, 0.0),
        }
    }
}

impl ViewTransform {
    pub fn to_display(&self, logical: (f32, f32)) -> (f32, f32) {
        (
            logical.0 * self.zoom + self.pan.0,
            logical.1 * self.zoom + self.pan.1,
        )
    }

    pub fn to_logical(&self, display: (f32, f32)) -> (f32, f32) {
        let zoom = self.zoom.max(1.0e-4);
        (
            (display.0 - self.pan.0) / zoom,
            (display.1 - self.pan.1) / zoom,
        )
    }

    /// Switches to `new_zoom`, keeping the logical point under `anchor`
    /// (display space) fixed. Returns false when nothing changed.
    pub fn zoom_about(&mut self, new_zoom: f32, anchor: Option<(f32, f32)>) -> bool {
        let old_zoom = self.zoom;
        if (new_zoom - old_zoom).abs() <= f32::EPSILON {
            return false;
        }
        if let Some(anchor) = anchor {
            let logical = self.to_logical(anchor);
            self.pan.0 += (old_zoom - new_zoom) * logical.0;
            self.pan.1 += (old_zoom - new_zoom) * logical.1;
        }
        self.zoom = new_zoom;
        true
    }

    /// Logical displacement for a pointer move of `(dx, dy)` display units.
    pub fn drag_delta(&self, dx: f32, dy: f32) -> (f32, f32) {
        let zoom = self.zoom.max(1.0e-4);
        (dx / zoom, dy / zoom)
    }
}
