/// How the stored frame relates to the upright image, as EXIF orientations.
///
/// The front camera delivers frames that must be read as `LeftMirrored`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageOrientation {
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    LeftMirrored,
    Right,
    RightMirrored,
    Left,
}

impl ImageOrientation {
    /// Whether reading the frame upright swaps width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(
            self,
            ImageOrientation::LeftMirrored
                | ImageOrientation::Right
                | ImageOrientation::RightMirrored
                | ImageOrientation::Left
        )
    }

    /// Maps an upright output pixel `(x, y)` to the stored pixel it comes
    /// from, for a stored image of `width` x `height`.
    pub fn source_pixel(self, x: usize, y: usize, width: usize, height: usize) -> (usize, usize) {
        match self {
            ImageOrientation::Up => (x, y),
            ImageOrientation::UpMirrored => (width - 1 - x, y),
            ImageOrientation::Down => (width - 1 - x, height - 1 - y),
            ImageOrientation::DownMirrored => (x, height - 1 - y),
            ImageOrientation::LeftMirrored => (y, x),
            ImageOrientation::Right => (y, height - 1 - x),
            ImageOrientation::RightMirrored => (width - 1 - y, height - 1 - x),
            ImageOrientation::Left => (width - 1 - y, x),
        }
    }
}
