use std::fmt;

use crate::shared::geometry::Rect;

use super::outline_shape::OutlineShape;

/// Handle to a shape attached to a display surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// The screen the overlay draws on.
///
/// Only the UI context touches a surface, so implementations need not be
/// thread-safe.
pub trait DisplaySurface {
    /// Attaches a shape above the preview and returns its handle.
    fn add_sublayer(&mut self, shape: &OutlineShape) -> LayerId;

    /// Detaches a shape. Unknown handles are ignored.
    fn remove_from_superlayer(&mut self, id: LayerId);

    /// Called whenever the preview layer's frame changes.
    fn preview_frame_changed(&mut self, _frame: Rect) {}

    /// Marks the end of one batch of shape changes.
    fn commit(&mut self) {}
}

/// In-memory surface that keeps attached shapes in attachment order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: u64,
    layers: Vec<(LayerId, OutlineShape)>,
    preview_frame: Option<Rect>,
    commits: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[(LayerId, OutlineShape)] {
        &self.layers
    }

    pub fn shapes(&self) -> impl Iterator<Item = &OutlineShape> {
        self.layers.iter().map(|(_, shape)| shape)
    }

    pub fn preview_frame(&self) -> Option<Rect> {
        self.preview_frame
    }

    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl DisplaySurface for RecordingSurface {
    fn add_sublayer(&mut self, shape: &OutlineShape) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push((id, *shape));
        id
    }

    fn remove_from_superlayer(&mut self, id: LayerId) {
        self.layers.retain(|(layer, _)| *layer != id);
    }

    fn preview_frame_changed(&mut self, frame: Rect) {
        self.preview_frame = Some(frame);
    }

    fn commit(&mut self) {
        self.commits += 1;
    }
}
