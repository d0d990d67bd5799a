use crate::detection::domain::detection_result::{DetectionKind, DetectionResult};

use super::domain::color::Color;
use super::domain::display_surface::DisplaySurface;
use super::domain::outline_shape::OutlineShape;
use super::domain::overlay::Overlay;
use super::domain::preview_layer::PreviewLayer;

/// Stroke color for a detector's boxes.
pub fn stroke_color(kind: DetectionKind) -> Color {
    match kind {
        DetectionKind::FaceLandmarks => Color::GREEN,
        DetectionKind::TextRectangles => Color::BLUE,
    }
}

/// Draws the latest detection result over the preview.
///
/// Owns the overlay, so only the holder of the renderer (the UI context)
/// can change what is on screen.
#[derive(Debug, Default)]
pub struct OverlayRenderer {
    overlay: Overlay,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every drawn shape with outlines for `result`.
    ///
    /// The whole overlay is cleared first, whatever kind drew it, so a text
    /// result erases face boxes and vice versa.
    pub fn render(
        &mut self,
        result: &DetectionResult,
        preview: &PreviewLayer,
        surface: &mut dyn DisplaySurface,
    ) {
        self.overlay.clear(surface);

        if let Some(kind) = result.kind() {
            let stroke = stroke_color(kind);
            for region in result.regions() {
                let rect = preview.layer_rect_converted(region);
                self.overlay.draw(surface, OutlineShape::outline(rect, stroke));
            }
        }
        surface.commit();
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }
}
