use ndarray::ArrayView3;

/// Bytes per pixel of the only pixel format camera devices deliver.
pub const BGRA_CHANNELS: u8 = 4;

/// A single camera frame: contiguous BGRA bytes in row-major order.
///
/// Frames are handed from the capture thread to the detection worker and
/// never shared between steps; the pipeline treats pixel data as opaque
/// until the vision capability decodes it.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * BGRA_CHANNELS as usize,
            "data length must equal width * height * 4"
        );
        Self {
            data,
            width,
            height,
            index,
        }
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

    /// Position of the frame in the source's delivery order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `false` when the buffer does not cover `width * height` pixels.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == self.width as usize * self.height as usize * 4
    }

    /// `[H, W, 4]` view over the BGRA bytes, or `None` for a malformed buffer.
    pub fn as_ndarray(&self) -> Option<ArrayView3<'_, u8>> {
        ArrayView3::from_shape(
            (
                self.height as usize,
                self.width as usize,
                BGRA_CHANNELS as usize,
            ),
            &self.data,
        )
        .ok()
    }
}
