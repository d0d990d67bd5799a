use super::display_surface::{DisplaySurface, LayerId};
use super::outline_shape::OutlineShape;

/// Shapes currently attached to the display surface, in drawing order.
#[derive(Debug, Default)]
pub struct Overlay {
    drawn: Vec<(LayerId, OutlineShape)>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detaches every drawn shape from `surface` and empties the overlay.
    pub fn clear(&mut self, surface: &mut dyn DisplaySurface) {
        for (id, _) in self.drawn.drain(..) {
            surface.remove_from_superlayer(id);
        }
    }

    /// Attaches `shape` to `surface` and records it.
    pub fn draw(&mut self, surface: &mut dyn DisplaySurface, shape: OutlineShape) {
        let id = surface.add_sublayer(&shape);
        self.drawn.push((id, shape));
    }

    pub fn shapes(&self) -> impl Iterator<Item = &OutlineShape> {
        self.drawn.iter().map(|(_, shape)| shape)
    }

    pub fn len(&self) -> usize {
        self.drawn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }
}
