use crate::shared::geometry::{NormalizedRect, Rect, Size};

/// How video is fitted into the preview layer's frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VideoGravity {
    /// Preserve aspect ratio and fill the frame, cropping the overflow.
    #[default]
    ResizeAspectFill,
    /// Preserve aspect ratio and fit inside the frame, letterboxing.
    ResizeAspect,
    /// Stretch to the frame.
    Resize,
}

/// Geometry of the live camera preview.
///
/// Coordinates are in the space of the view hosting the preview, which is
/// also where overlay shapes are drawn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreviewLayer {
    frame: Rect,
    gravity: VideoGravity,
    video_size: Option<Size>,
}

impl PreviewLayer {
    pub fn new(gravity: VideoGravity) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    pub fn gravity(&self) -> VideoGravity {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: VideoGravity) {
        self.gravity = gravity;
    }

    pub fn video_size(&self) -> Option<Size> {
        self.video_size
    }

    pub fn set_video_size(&mut self, size: Size) {
        self.video_size = (!size.is_empty()).then_some(size);
    }

    /// Where the video is drawn once gravity is applied. Until the video
    /// size is known this is the layer frame.
    pub fn video_rect(&self) -> Rect {
        let f = self.frame;
        let Some(video) = self.video_size else {
            return f;
        };
        let scale = match self.gravity {
            VideoGravity::Resize => return f,
            VideoGravity::ResizeAspect => (f.width / video.width).min(f.height / video.height),
            VideoGravity::ResizeAspectFill => (f.width / video.width).max(f.height / video.height),
        };
        let width = video.width * scale;
        let height = video.height * scale;
        Rect::new(
            f.x + (f.width - width) / 2.0,
            f.y + (f.height - height) / 2.0,
            width,
            height,
        )
    }

    /// Maps a normalized detector box onto the preview.
    pub fn layer_rect_converted(&self, rect: &NormalizedRect) -> Rect {
        let v = self.video_rect();
        Rect::new(
            v.x + rect.x * v.width,
            v.y + rect.y * v.height,
            rect.width * v.width,
            rect.height * v.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn portrait_layer(gravity: VideoGravity) -> PreviewLayer {
        let mut layer = PreviewLayer::new(gravity);
        layer.set_frame(Rect::new(0.0, 0.0, 390.0, 844.0));
        layer
    }

    #[test]
    fn test_without_video_size_maps_onto_frame() {
        let layer = portrait_layer(VideoGravity::ResizeAspectFill);
        let r = layer.layer_rect_converted(&NormalizedRect::new(0.5, 0.25, 0.1, 0.5));
        assert_relative_eq!(r.x, 195.0, epsilon = 1e-9);
        assert_relative_eq!(r.y, 211.0, epsilon = 1e-9);
        assert_relative_eq!(r.width, 39.0, epsilon = 1e-9);
        assert_relative_eq!(r.height, 422.0, epsilon = 1e-9);
    }

    #[test]
    fn test_aspect_fill_crops_overflowing_axis() {
        let mut layer = portrait_layer(VideoGravity::ResizeAspectFill);
        layer.set_video_size(Size::new(1080.0, 1920.0));

        let v = layer.video_rect();
        // scale = max(390/1080, 844/1920) = 844/1920
        let scale = 844.0 / 1920.0;
        assert_relative_eq!(v.width, 1080.0 * scale, epsilon = 1e-9);
        assert_relative_eq!(v.height, 844.0, epsilon = 1e-9);
        assert!(v.x < 0.0);
        assert_relative_eq!(v.x + v.width / 2.0, 195.0, epsilon = 1e-9);

        let r = layer.layer_rect_converted(&NormalizedRect::new(0.5, 0.5, 0.1, 0.1));
        assert_relative_eq!(r.x, 195.0, epsilon = 1e-9);
        assert_relative_eq!(r.y, 422.0, epsilon = 1e-9);
        assert_relative_eq!(r.height, 84.4, epsilon = 1e-9);
    }

    #[test]
    fn test_aspect_fit_letterboxes() {
        let mut layer = portrait_layer(VideoGravity::ResizeAspect);
        layer.set_video_size(Size::new(1920.0, 1080.0));

        let v = layer.video_rect();
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(v.width, 390.0, epsilon = 1e-9);
        assert!(v.y > 0.0);
        assert_relative_eq!(v.y + v.height / 2.0, 422.0, epsilon = 1e-9);
    }

    #[test]
    fn test_resize_ignores_video_aspect() {
        let mut layer = portrait_layer(VideoGravity::Resize);
        layer.set_video_size(Size::new(1920.0, 1080.0));
        assert_eq!(layer.video_rect(), layer.frame());
    }

    #[test]
    fn test_frame_origin_offsets_converted_rects() {
        let mut layer = PreviewLayer::new(VideoGravity::Resize);
        layer.set_frame(Rect::new(10.0, 20.0, 100.0, 100.0));
        let r = layer.layer_rect_converted(&NormalizedRect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(r, Rect::new(10.0, 20.0, 100.0, 100.0));
    }

    #[test]
    fn test_empty_video_size_is_ignored() {
        let mut layer = portrait_layer(VideoGravity::ResizeAspectFill);
        layer.set_video_size(Size::new(0.0, 0.0));
        assert_eq!(layer.video_size(), None);
    }

    #[rstest]
    #[case::fill(VideoGravity::ResizeAspectFill)]
    #[case::fit(VideoGravity::ResizeAspect)]
    #[case::stretch(VideoGravity::Resize)]
    fn test_set_frame_is_idempotent(#[case] gravity: VideoGravity) {
        let bounds = Rect::new(0.0, 0.0, 390.0, 844.0);
        let mut once = PreviewLayer::new(gravity);
        once.set_video_size(Size::new(640.0, 480.0));
        once.set_frame(bounds);

        let mut twice = once.clone();
        twice.set_frame(bounds);

        assert_eq!(once, twice);
        assert_eq!(once.video_rect(), twice.video_rect());
    }
}
