use crossbeam_channel::{Receiver, Sender};

use crate::detection::domain::detection_result::DetectionResult;
use crate::overlay::domain::display_surface::DisplaySurface;
use crate::overlay::domain::preview_layer::PreviewLayer;
use crate::overlay::overlay_renderer::OverlayRenderer;
use crate::shared::geometry::{Rect, Size};

/// Work scheduled onto the UI context from other threads.
#[derive(Clone, Debug, PartialEq)]
pub enum UiMessage {
    /// A detector finished with at least one region.
    Detection {
        frame_index: usize,
        result: DetectionResult,
    },
    /// Dimensions of the frames as the detectors see them.
    VideoSize(Size),
}

/// Cloneable sender half used by worker threads.
#[derive(Clone)]
pub struct UiHandle {
    tx: Sender<UiMessage>,
}

impl UiHandle {
    /// Schedules `message`. Returns `false` once the UI context is gone.
    pub fn dispatch(&self, message: UiMessage) -> bool {
        self.tx.send(message).is_ok()
    }
}

/// Single owner of everything on screen.
///
/// Messages are handled one at a time in arrival order, which is the only
/// serialization overlay state gets. Arrival order follows detector
/// completion, not frame order, so a late result for an older frame may
/// replace a newer one.
pub struct UiContext {
    rx: Receiver<UiMessage>,
    surface: Box<dyn DisplaySurface>,
    preview: PreviewLayer,
    renderer: OverlayRenderer,
    renders: usize,
}

/// Creates a UI context drawing on `surface` and a handle for feeding it.
pub fn ui_context(surface: Box<dyn DisplaySurface>, preview: PreviewLayer) -> (UiContext, UiHandle) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (
        UiContext {
            rx,
            surface,
            preview,
            renderer: OverlayRenderer::new(),
            renders: 0,
        },
        UiHandle { tx },
    )
}

impl UiContext {
    pub fn handle(&mut self, message: UiMessage) {
        match message {
            UiMessage::Detection {
                frame_index,
                result,
            } => {
                log::debug!(
                    "Frame {frame_index}: drawing {} {} outline(s)",
                    result.regions().len(),
                    result.kind().map(|k| k.to_string()).unwrap_or_default()
                );
                self.renderer
                    .render(&result, &self.preview, self.surface.as_mut());
                self.renders += 1;
            }
            UiMessage::VideoSize(size) => {
                if self.preview.video_size() != Some(size) {
                    log::debug!("Video size {}x{}", size.width, size.height);
                    self.preview.set_video_size(size);
                }
            }
        }
    }

    /// Fits the preview to the view bounds. Cheap and idempotent.
    pub fn layout(&mut self, bounds: Size) {
        let frame = Rect::from_size(bounds);
        self.preview.set_frame(frame);
        self.surface.preview_frame_changed(frame);
    }

    /// Handles every message already queued, without blocking.
    pub fn run_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle(message);
            handled += 1;
        }
        handled
    }

    /// Handles messages until every [`UiHandle`] has been dropped.
    pub fn run(&mut self) {
        while let Ok(message) = self.rx.recv() {
            self.handle(message);
        }
    }

    pub fn preview(&self) -> &PreviewLayer {
        &self.preview
    }

    pub fn preview_mut(&mut self) -> &mut PreviewLayer {
        &mut self.preview
    }

    pub fn renderer(&self) -> &OverlayRenderer {
        &self.renderer
    }

    pub fn surface(&self) -> &dyn DisplaySurface {
        self.surface.as_ref()
    }

    /// Number of detection results drawn so far.
    pub fn renders(&self) -> usize {
        self.renders
    }
}
