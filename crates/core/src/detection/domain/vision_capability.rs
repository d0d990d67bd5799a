use thiserror::Error;

use crate::shared::frame::Frame;

use super::detection_result::DetectionKind;
use super::image_orientation::ImageOrientation;
use super::observation::Observation;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("frame {index} is not a valid {width}x{height} BGRA buffer")]
    InvalidFrame { index: usize, width: u32, height: u32 },
    #[error("no detector is configured for {0} requests")]
    Unsupported(DetectionKind),
    #[error("{kind} detection failed: {message}")]
    Detector { kind: DetectionKind, message: String },
}

/// Callback invoked exactly once when a request finishes.
pub type Completion = Box<dyn FnOnce(Result<Vec<Observation>, VisionError>) + Send>;

/// One detection to run against a frame, with its completion handler.
pub struct DetectionRequest {
    pub kind: DetectionKind,
    pub completion: Completion,
}

impl DetectionRequest {
    pub fn new(
        kind: DetectionKind,
        completion: impl FnOnce(Result<Vec<Observation>, VisionError>) + Send + 'static,
    ) -> Self {
        Self {
            kind,
            completion: Box::new(completion),
        }
    }
}

/// The external detection capability.
///
/// `perform` decodes the frame once and runs every request against it.
/// Each request's completion fires independently and in no guaranteed
/// order relative to the others. An `Err` from `perform` means the
/// requests were not submitted; their completions are then never called.
pub trait VisionCapability: Send {
    fn perform(
        &mut self,
        frame: &Frame,
        orientation: ImageOrientation,
        requests: Vec<DetectionRequest>,
    ) -> Result<(), VisionError>;
}
