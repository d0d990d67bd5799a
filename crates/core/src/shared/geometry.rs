/// Width and height in layer points (or pixels, for video dimensions).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// An axis-aligned rectangle in layer coordinates, origin top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlapping region, if the rectangles share any area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        (max_x > x && max_y > y).then(|| Rect::new(x, y, max_x - x, max_y - y))
    }

    /// Intersection over union, 0 when disjoint.
    pub fn iou(&self, other: &Rect) -> f64 {
        let Some(overlap) = self.intersection(other) else {
            return 0.0;
        };
        let inter = overlap.area();
        inter / (self.area() + other.area() - inter)
    }
}

/// A detector bounding box relative to the frame extent.
///
/// All components lie in `[0, 1]`; the origin is the top-left corner of the
/// (oriented) frame the detector saw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalizes a pixel-space `[x1, y1, x2, y2]` box against a frame of
    /// `frame_w` x `frame_h`, clamping to the frame.
    pub fn from_pixel_box(bbox: [f64; 4], frame_w: u32, frame_h: u32) -> Self {
        let fw = frame_w.max(1) as f64;
        let fh = frame_h.max(1) as f64;
        let x1 = (bbox[0] / fw).clamp(0.0, 1.0);
        let y1 = (bbox[1] / fh).clamp(0.0, 1.0);
        let x2 = (bbox[2] / fw).clamp(0.0, 1.0);
        let y2 = (bbox[3] / fh).clamp(0.0, 1.0);
        Self::new(x1, y1, (x2 - x1).max(0.0), (y2 - y1).max(0.0))
    }
}
