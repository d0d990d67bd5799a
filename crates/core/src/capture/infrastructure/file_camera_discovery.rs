use std::path::{Path, PathBuf};

use crate::capture::domain::capture_device::{CaptureDevice, DeviceDiscovery};
use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::device::{DeviceDescriptor, DevicePosition, DeviceType};

use super::ffmpeg_camera::FfmpegCamera;

/// Discovery over video files registered as cameras.
///
/// Each file is announced as a wide-angle camera at the configured position.
/// Files that do not exist are not announced.
pub struct FileCameraDiscovery {
    sources: Vec<(DeviceDescriptor, PathBuf)>,
}

impl FileCameraDiscovery {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>, position: DevicePosition) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let descriptor = DeviceDescriptor {
            id: path.display().to_string(),
            name,
            device_type: DeviceType::WideAngle,
            position,
        };
        self.sources.push((descriptor, path));
        self
    }

    fn path_for(&self, descriptor: &DeviceDescriptor) -> Option<&Path> {
        self.sources
            .iter()
            .find(|(d, _)| d.id == descriptor.id)
            .map(|(_, p)| p.as_path())
    }
}

impl Default for FileCameraDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDiscovery for FileCameraDiscovery {
    fn devices(&self, device_type: DeviceType, position: DevicePosition) -> Vec<DeviceDescriptor> {
        self.sources
            .iter()
            .filter(|(d, path)| {
                d.device_type == device_type && d.position == position && path.is_file()
            })
            .map(|(d, _)| d.clone())
            .collect()
    }

    fn open(&self, descriptor: &DeviceDescriptor) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        let path = self
            .path_for(descriptor)
            .ok_or_else(|| CaptureError::UnknownDevice(descriptor.id.clone()))?;
        Ok(Box::new(FfmpegCamera::open(descriptor.clone(), path)?))
    }
}
