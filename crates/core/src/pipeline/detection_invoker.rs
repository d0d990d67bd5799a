use crate::detection::domain::detection_result::{DetectionKind, DetectionResult};
use crate::detection::domain::image_orientation::ImageOrientation;
use crate::detection::domain::observation::Observation;
use crate::detection::domain::vision_capability::{DetectionRequest, VisionCapability, VisionError};
use crate::shared::frame::Frame;
use crate::shared::geometry::Size;
use crate::ui::ui_context::{UiHandle, UiMessage};

/// Front camera frames are read mirrored and rotated.
pub const FRAME_ORIENTATION: ImageOrientation = ImageOrientation::LeftMirrored;

/// Fans each frame out to the face and text detectors and forwards
/// non-empty results to the UI context.
pub struct DetectionInvoker {
    vision: Box<dyn VisionCapability>,
    ui: UiHandle,
    video_size: Option<Size>,
}

impl DetectionInvoker {
    pub fn new(vision: Box<dyn VisionCapability>, ui: UiHandle) -> Self {
        Self {
            vision,
            ui,
            video_size: None,
        }
    }

    /// Submits one request per detection kind in a single `perform` call.
    ///
    /// Returns `false` when the vision capability rejected the frame; the
    /// overlay is then left untouched.
    pub fn process(&mut self, frame: &Frame) -> bool {
        self.announce_video_size(frame);

        let requests = DetectionKind::ALL
            .iter()
            .map(|&kind| self.request(kind, frame.index()))
            .collect();

        match self.vision.perform(frame, FRAME_ORIENTATION, requests) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to perform detection on frame {}: {e}", frame.index());
                false
            }
        }
    }

    fn request(&self, kind: DetectionKind, frame_index: usize) -> DetectionRequest {
        let ui = self.ui.clone();
        DetectionRequest::new(kind, move |outcome| {
            complete(&ui, kind, frame_index, outcome);
        })
    }

    fn announce_video_size(&mut self, frame: &Frame) {
        let (width, height) = if FRAME_ORIENTATION.swaps_axes() {
            (frame.height(), frame.width())
        } else {
            (frame.width(), frame.height())
        };
        let size = Size::new(width as f64, height as f64);
        if self.video_size != Some(size) {
            self.video_size = Some(size);
            self.ui.dispatch(UiMessage::VideoSize(size));
        }
    }
}

fn complete(
    ui: &UiHandle,
    kind: DetectionKind,
    frame_index: usize,
    outcome: Result<Vec<Observation>, VisionError>,
) {
    let observations = match outcome {
        Ok(observations) => observations,
        Err(e) => {
            log::warn!("Frame {frame_index}: {e}");
            return;
        }
    };

    let result = DetectionResult::from_observations(kind, &observations);
    if result.is_empty() {
        log::info!("No {kind} detected");
        return;
    }

    log::info!("Number of {kind}: {}", observations.len());
    let (located, slots) = observations
        .iter()
        .map(Observation::located_landmarks)
        .fold((0, 0), |(l, s), (ol, os)| (l + ol, s + os));
    if slots > 0 {
        log::debug!("Frame {frame_index}: {located} of {slots} landmarks located");
    }
    if !ui.dispatch(UiMessage::Detection {
        frame_index,
        result,
    }) {
        log::debug!("UI context gone, dropping {kind} result for frame {frame_index}");
    }
}
