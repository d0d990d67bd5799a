use ndarray::ArrayView3;

use crate::shared::frame::Frame;

use super::image_orientation::ImageOrientation;

/// Upright RGB pixels decoded once per frame and shared by every detector.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl DecodedImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * 3);
        Self {
            data,
            width,
            height,
        }
    }

    /// Converts a BGRA frame to RGB and applies `orientation` so the result
    /// is upright. Returns `None` for a malformed frame.
    pub fn decode(frame: &Frame, orientation: ImageOrientation) -> Option<Self> {
        if !frame.is_well_formed() {
            return None;
        }
        let src = frame.as_ndarray()?;
        let (w, h) = (frame.width() as usize, frame.height() as usize);
        let (out_w, out_h) = if orientation.swaps_axes() { (h, w) } else { (w, h) };

        let mut data = Vec::with_capacity(out_w * out_h * 3);
        for y in 0..out_h {
            for x in 0..out_w {
                let (sx, sy) = orientation.source_pixel(x, y, w, h);
                data.push(src[[sy, sx, 2]]);
                data.push(src[[sy, sx, 1]]);
                data.push(src[[sy, sx, 0]]);
            }
        }
        Some(Self::new(data, out_w as u32, out_h as u32))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, 3),
            &self.data,
        )
        .expect("DecodedImage data length must match dimensions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x1 BGRA frame: left pixel blue, right pixel red.
    fn two_pixel_frame() -> Frame {
        Frame::new(vec![255, 0, 0, 255, 0, 0, 255, 255], 2, 1, 0)
    }

    #[test]
    fn test_decode_up_swaps_channels_to_rgb() {
        let image = DecodedImage::decode(&two_pixel_frame(), ImageOrientation::Up).unwrap();
        assert_eq!((image.width(), image.height()), (2, 1));
        assert_eq!(image.data(), &[0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn test_decode_left_mirrored_transposes() {
        let image =
            DecodedImage::decode(&two_pixel_frame(), ImageOrientation::LeftMirrored).unwrap();
        assert_eq!((image.width(), image.height()), (1, 2));
        let arr = image.as_ndarray();
        assert_eq!(arr[[0, 0, 2]], 255); // blue on top
        assert_eq!(arr[[1, 0, 0]], 255); // red below
    }

    #[test]
    fn test_decode_malformed_frame_is_none() {
        let frame = Frame::new(Vec::new(), 0, 0, 0);
        assert!(DecodedImage::decode(&frame, ImageOrientation::Up).is_none());
    }
}
