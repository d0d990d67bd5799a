use super::domain::capture_device::CaptureDevice;
use super::domain::capture_error::CaptureError;
use super::domain::device::OutputSettings;
use super::domain::frame_slot::FrameSink;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Camera input and frame output are both attached.
    Configured,
    Running,
}

/// Connects one camera input to one frame output.
pub struct CaptureSession {
    input: Option<Box<dyn CaptureDevice>>,
    output: Option<(OutputSettings, FrameSink)>,
    running: bool,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            input: None,
            output: None,
            running: false,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.running {
            SessionState::Running
        } else if self.input.is_some() && self.output.is_some() {
            SessionState::Configured
        } else {
            SessionState::Idle
        }
    }

    pub fn add_input(&mut self, device: Box<dyn CaptureDevice>) {
        log::info!("Camera input: {}", device.descriptor());
        self.input = Some(device);
    }

    /// Attaches the frame output.
    ///
    /// The requested orientation is kept only when the input's connection
    /// supports it; without an input there is no connection to configure.
    pub fn add_output(&mut self, mut settings: OutputSettings, sink: FrameSink) {
        if let Some(orientation) = settings.orientation {
            let supported = self
                .input
                .as_ref()
                .is_some_and(|device| device.supports_orientation(orientation));
            if !supported {
                log::warn!("Video orientation {orientation:?} not supported, leaving device default");
                settings.orientation = None;
            }
        }
        self.output = Some((settings, sink));
    }

    pub fn output_settings(&self) -> Option<&OutputSettings> {
        self.output.as_ref().map(|(settings, _)| settings)
    }

    /// Hands the frame sink to the camera and starts delivery.
    pub fn start_running(&mut self) -> Result<(), CaptureError> {
        if self.running {
            return Err(CaptureError::AlreadyRunning);
        }
        // The sink leaves the session even on failure so the consumer sees
        // the source close.
        let (settings, sink) = self.output.take().ok_or(CaptureError::NoOutput)?;
        let device = self.input.as_mut().ok_or(CaptureError::NoInput)?;

        device.start(settings, sink)?;
        self.running = true;
        Ok(())
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Some(device) = self.input.as_mut() {
            device.stop();
        }
    }
}
