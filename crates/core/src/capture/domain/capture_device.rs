use super::capture_error::CaptureError;
use super::device::{DeviceDescriptor, DevicePosition, DeviceType, OutputSettings, VideoOrientation};
use super::frame_slot::FrameSink;

/// A camera that pushes frames into a [`FrameSink`] from its own thread.
pub trait CaptureDevice: Send {
    fn descriptor(&self) -> &DeviceDescriptor;

    /// Whether the output connection accepts the given orientation.
    fn supports_orientation(&self, orientation: VideoOrientation) -> bool;

    /// Starts delivering frames. Returns once the capture thread is running.
    fn start(&mut self, settings: OutputSettings, sink: FrameSink) -> Result<(), CaptureError>;

    /// Stops delivery and joins the capture thread. Safe to call twice.
    fn stop(&mut self);
}

/// Enumerates cameras and constructs inputs for them.
pub trait DeviceDiscovery {
    /// Devices of `device_type` at `position`, in enumeration order.
    fn devices(&self, device_type: DeviceType, position: DevicePosition) -> Vec<DeviceDescriptor>;

    /// Builds a capture input for a previously discovered device.
    fn open(&self, descriptor: &DeviceDescriptor) -> Result<Box<dyn CaptureDevice>, CaptureError>;
}

/// First device at `position`, searching types in [`DeviceType::DISCOVERY_ORDER`].
pub fn first_device(
    discovery: &dyn DeviceDiscovery,
    position: DevicePosition,
) -> Option<DeviceDescriptor> {
    DeviceType::DISCOVERY_ORDER
        .iter()
        .find_map(|&device_type| discovery.devices(device_type, position).into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubDiscovery {
        known: Vec<DeviceDescriptor>,
    }

    impl DeviceDiscovery for StubDiscovery {
        fn devices(&self, device_type: DeviceType, position: DevicePosition) -> Vec<DeviceDescriptor> {
            self.known
                .iter()
                .filter(|d| d.device_type == device_type && d.position == position)
                .cloned()
                .collect()
        }

        fn open(&self, descriptor: &DeviceDescriptor) -> Result<Box<dyn CaptureDevice>, CaptureError> {
            Err(CaptureError::UnknownDevice(descriptor.id.clone()))
        }
    }

    fn descriptor(id: &str, device_type: DeviceType, position: DevicePosition) -> DeviceDescriptor {
        DeviceDescriptor {
            id: id.into(),
            name: id.into(),
            device_type,
            position,
        }
    }

    #[test]
    fn test_prefers_true_depth_over_wide_angle() {
        let discovery = StubDiscovery {
            known: vec![
                descriptor("wide", DeviceType::WideAngle, DevicePosition::Front),
                descriptor("depth", DeviceType::TrueDepth, DevicePosition::Front),
            ],
        };
        let found = first_device(&discovery, DevicePosition::Front).unwrap();
        assert_eq!(found.id, "depth");
    }

    #[test]
    fn test_ignores_devices_at_other_positions() {
        let discovery = StubDiscovery {
            known: vec![descriptor("back", DeviceType::TrueDepth, DevicePosition::Back)],
        };
        assert!(first_device(&discovery, DevicePosition::Front).is_none());
    }

    #[test]
    fn test_falls_back_to_wide_angle() {
        let discovery = StubDiscovery {
            known: vec![descriptor("wide", DeviceType::WideAngle, DevicePosition::Front)],
        };
        let found = first_device(&discovery, DevicePosition::Front).unwrap();
        assert_eq!(found.id, "wide");
    }
}
