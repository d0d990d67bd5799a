use super::decoded_image::DecodedImage;
use super::observation::Observation;

/// Domain interface for one detector behind the vision capability.
///
/// Implementations may keep per-frame state, hence `&mut self`. Returned
/// boxes are normalized against the image they were given.
pub trait RegionDetector: Send {
    fn detect(&mut self, image: &DecodedImage) -> Result<Vec<Observation>, Box<dyn std::error::Error>>;
}
