use crate::shared::constants::OUTLINE_LINE_WIDTH;
use crate::shared::geometry::Rect;

use super::color::Color;

/// A rectangular outline drawn over the preview.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutlineShape {
    pub rect: Rect,
    pub fill: Color,
    pub stroke: Color,
    pub line_width: f64,
}

impl OutlineShape {
    /// Transparent-filled rectangle stroked with `stroke`.
    pub fn outline(rect: Rect, stroke: Color) -> Self {
        Self {
            rect,
            fill: Color::CLEAR,
            stroke,
            line_width: OUTLINE_LINE_WIDTH,
        }
    }
}
