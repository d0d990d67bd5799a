use crate::shared::geometry::NormalizedRect;

/// One region reported by a detector.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub bounding_box: NormalizedRect,
    pub confidence: f64,
    /// Normalized landmark points (eyes, nose, mouth corners) when the
    /// detector provides them. Slots keep their position; a point the
    /// detector could not locate is `None`.
    pub landmarks: Option<Vec<Option<(f64, f64)>>>,
}

impl Observation {
    pub fn new(bounding_box: NormalizedRect, confidence: f64) -> Self {
        Self {
            bounding_box,
            confidence,
            landmarks: None,
        }
    }

    pub fn with_landmarks(mut self, landmarks: Vec<Option<(f64, f64)>>) -> Self {
        self.landmarks = Some(landmarks);
        self
    }

    /// Landmark points actually located, out of the slots reported.
    pub fn located_landmarks(&self) -> (usize, usize) {
        self.landmarks.as_ref().map_or((0, 0), |slots| {
            (slots.iter().filter(|p| p.is_some()).count(), slots.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_landmarks_reports_no_slots() {
        let obs = Observation::new(NormalizedRect::new(0.1, 0.1, 0.2, 0.2), 0.9);
        assert_eq!(obs.located_landmarks(), (0, 0));
    }

    #[test]
    fn test_missing_landmark_keeps_its_slot() {
        let obs = Observation::new(NormalizedRect::new(0.1, 0.1, 0.2, 0.2), 0.9)
            .with_landmarks(vec![Some((0.2, 0.2)), None, Some((0.25, 0.3))]);
        assert_eq!(obs.located_landmarks(), (2, 3));
        assert_eq!(obs.landmarks.as_ref().unwrap()[2], Some((0.25, 0.3)));
    }
}
