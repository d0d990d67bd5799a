use std::collections::HashMap;

use crate::detection::domain::decoded_image::DecodedImage;
use crate::detection::domain::detection_result::DetectionKind;
use crate::detection::domain::image_orientation::ImageOrientation;
use crate::detection::domain::region_detector::RegionDetector;
use crate::detection::domain::vision_capability::{DetectionRequest, VisionCapability, VisionError};
use crate::shared::frame::Frame;

/// Vision capability backed by one [`RegionDetector`] per detection kind.
///
/// `perform` decodes the frame once, then runs each kind's requests on its
/// own scoped thread. A request's completion fires on that thread as soon as
/// its detector returns, so completions for different kinds arrive in
/// whatever order the detectors finish. `perform` returns once all of them
/// have fired.
pub struct DetectorVision {
    detectors: HashMap<DetectionKind, Box<dyn RegionDetector>>,
}

impl DetectorVision {
    pub fn new() -> Self {
        Self {
            detectors: HashMap::new(),
        }
    }

    pub fn with_detector(mut self, kind: DetectionKind, detector: Box<dyn RegionDetector>) -> Self {
        self.detectors.insert(kind, detector);
        self
    }

    pub fn supports(&self, kind: DetectionKind) -> bool {
        self.detectors.contains_key(&kind)
    }
}

impl Default for DetectorVision {
    fn default() -> Self {
        Self::new()
    }
}

impl VisionCapability for DetectorVision {
    fn perform(
        &mut self,
        frame: &Frame,
        orientation: ImageOrientation,
        requests: Vec<DetectionRequest>,
    ) -> Result<(), VisionError> {
        let image = DecodedImage::decode(frame, orientation).ok_or(VisionError::InvalidFrame {
            index: frame.index(),
            width: frame.width(),
            height: frame.height(),
        })?;

        let mut by_kind: HashMap<DetectionKind, Vec<DetectionRequest>> = HashMap::new();
        for request in requests {
            if self.detectors.contains_key(&request.kind) {
                by_kind.entry(request.kind).or_default().push(request);
            } else {
                (request.completion)(Err(VisionError::Unsupported(request.kind)));
            }
        }

        let image = &image;
        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .detectors
                .iter_mut()
                .filter_map(|(&kind, detector)| {
                    let requests = by_kind.remove(&kind)?;
                    Some((
                        kind,
                        scope.spawn(move || run_requests(kind, detector.as_mut(), image, requests)),
                    ))
                })
                .collect();

            for (kind, handle) in handles {
                if handle.join().is_err() {
                    log::error!("{kind} detection worker panicked");
                }
            }
        });

        Ok(())
    }
}

fn run_requests(
    kind: DetectionKind,
    detector: &mut dyn RegionDetector,
    image: &DecodedImage,
    requests: Vec<DetectionRequest>,
) {
    for request in requests {
        let outcome = detector.detect(image).map_err(|e| VisionError::Detector {
            kind,
            message: e.to_string(),
        });
        (request.completion)(outcome);
    }
}
