use std::fmt;

use crate::shared::geometry::NormalizedRect;

use super::observation::Observation;

/// Which detector produced a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetectionKind {
    FaceLandmarks,
    TextRectangles,
}

impl DetectionKind {
    pub const ALL: &[DetectionKind] = &[DetectionKind::FaceLandmarks, DetectionKind::TextRectangles];
}

impl fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionKind::FaceLandmarks => write!(f, "faces"),
            DetectionKind::TextRectangles => write!(f, "text"),
        }
    }
}

/// The outcome of one completed detection request.
///
/// Results are never merged: each one replaces whatever is on screen,
/// whichever detector produced it.
#[derive(Clone, Debug, PartialEq)]
pub enum DetectionResult {
    FaceSet(Vec<NormalizedRect>),
    TextSet(Vec<NormalizedRect>),
    Empty,
}

impl DetectionResult {
    /// Builds a result from a detector's observations; no observations
    /// yields [`DetectionResult::Empty`].
    pub fn from_observations(kind: DetectionKind, observations: &[Observation]) -> Self {
        if observations.is_empty() {
            return DetectionResult::Empty;
        }
        let boxes = observations.iter().map(|o| o.bounding_box).collect();
        match kind {
            DetectionKind::FaceLandmarks => DetectionResult::FaceSet(boxes),
            DetectionKind::TextRectangles => DetectionResult::TextSet(boxes),
        }
    }

    pub fn kind(&self) -> Option<DetectionKind> {
        match self {
            DetectionResult::FaceSet(_) => Some(DetectionKind::FaceLandmarks),
            DetectionResult::TextSet(_) => Some(DetectionKind::TextRectangles),
            DetectionResult::Empty => None,
        }
    }

    pub fn regions(&self) -> &[NormalizedRect] {
        match self {
            DetectionResult::FaceSet(r) | DetectionResult::TextSet(r) => r,
            DetectionResult::Empty => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.regions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(x: f64) -> Observation {
        Observation::new(NormalizedRect::new(x, 0.1, 0.2, 0.2), 0.9)
    }

    #[test]
    fn test_no_observations_is_empty() {
        let result = DetectionResult::from_observations(DetectionKind::FaceLandmarks, &[]);
        assert_eq!(result, DetectionResult::Empty);
        assert!(result.is_empty());
        assert_eq!(result.kind(), None);
    }

    #[test]
    fn test_face_observations_become_face_set() {
        let result = DetectionResult::from_observations(
            DetectionKind::FaceLandmarks,
            &[observation(0.1), observation(0.5)],
        );
        assert_eq!(result.kind(), Some(DetectionKind::FaceLandmarks));
        assert_eq!(result.regions().len(), 2);
        assert_eq!(result.regions()[1].x, 0.5);
    }

    #[test]
    fn test_text_observations_become_text_set() {
        let result =
            DetectionResult::from_observations(DetectionKind::TextRectangles, &[observation(0.3)]);
        assert!(matches!(result, DetectionResult::TextSet(ref r) if r.len() == 1));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(DetectionKind::FaceLandmarks.to_string(), "faces");
        assert_eq!(DetectionKind::TextRectangles.to_string(), "text");
    }
}
