use std::fmt;

/// Hardware class of a camera, in the order discovery prefers them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceType {
    TrueDepth,
    DualCamera,
    WideAngle,
}

impl DeviceType {
    /// Discovery preference: depth-capable first, plain wide-angle last.
    pub const DISCOVERY_ORDER: &[DeviceType] = &[
        DeviceType::TrueDepth,
        DeviceType::DualCamera,
        DeviceType::WideAngle,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DevicePosition {
    Front,
    Back,
    Unspecified,
}

/// Identifies one discoverable camera.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub id: String,
    pub name: String,
    pub device_type: DeviceType,
    pub position: DevicePosition,
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}, {:?})", self.name, self.device_type, self.position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 32-bit BGRA, 8 bits per channel.
    Bgra32,
}

/// Rotation applied to frames on the output connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Frame output configuration attached to a capture session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputSettings {
    pub pixel_format: PixelFormat,
    /// Drop a new frame while the previous one is still being processed.
    pub always_discard_late_frames: bool,
    /// `None` when the connection does not support setting an orientation.
    pub orientation: Option<VideoOrientation>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat::Bgra32,
            always_discard_late_frames: true,
            orientation: Some(VideoOrientation::Portrait),
        }
    }
}
