use std::thread::JoinHandle;

use thiserror::Error;

use crate::capture::capture_session::{CaptureSession, SessionState};
use crate::capture::domain::capture_device::{first_device, DeviceDiscovery};
use crate::capture::domain::device::{DevicePosition, OutputSettings};
use crate::capture::domain::frame_slot::{frame_slot, FrameStats};
use crate::detection::domain::vision_capability::VisionCapability;
use crate::overlay::domain::display_surface::DisplaySurface;
use crate::overlay::domain::preview_layer::{PreviewLayer, VideoGravity};
use crate::pipeline::detection_invoker::DetectionInvoker;
use crate::pipeline::frame_worker::spawn_frame_worker;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::geometry::Size;
use crate::ui::ui_context::{ui_context, UiContext, UiHandle};

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("no front-facing camera device found")]
    NoCameraDevice,
    #[error("controller was already activated")]
    AlreadyActivated,
    #[error("failed to start frame worker: {0}")]
    Worker(#[from] std::io::Error),
}

/// Wires the camera, the detection pipeline and the on-screen overlay.
///
/// Lifecycle: `activate` once, call `layout` whenever the view bounds
/// change, then `run` drives the UI context until the frame source ends.
pub struct Controller {
    discovery: Box<dyn DeviceDiscovery>,
    session: CaptureSession,
    ui: UiContext,
    handle: Option<UiHandle>,
    vision: Option<Box<dyn VisionCapability>>,
    logger: Option<Box<dyn PipelineLogger>>,
    worker: Option<JoinHandle<FrameStats>>,
    gravity: VideoGravity,
    bounds: Size,
}

impl Controller {
    pub fn new(
        discovery: Box<dyn DeviceDiscovery>,
        vision: Box<dyn VisionCapability>,
        surface: Box<dyn DisplaySurface>,
        logger: Box<dyn PipelineLogger>,
        bounds: Size,
    ) -> Self {
        let (ui, handle) = ui_context(surface, PreviewLayer::default());
        Self {
            discovery,
            session: CaptureSession::new(),
            ui,
            handle: Some(handle),
            vision: Some(vision),
            logger: Some(logger),
            worker: None,
            gravity: VideoGravity::ResizeAspectFill,
            bounds,
        }
    }

    /// Overrides how the preview fits the video. Defaults to aspect fill.
    pub fn with_gravity(mut self, gravity: VideoGravity) -> Self {
        self.gravity = gravity;
        self
    }

    /// Configures capture, attaches the preview and starts frame delivery.
    ///
    /// Only a missing camera is fatal. A camera that cannot be opened or a
    /// session that fails to start is logged and leaves the preview empty.
    pub fn activate(&mut self) -> Result<(), ControllerError> {
        // A second activation must not touch the running input.
        if self.vision.is_none() {
            return Err(ControllerError::AlreadyActivated);
        }
        self.add_camera_input()?;
        self.show_camera_feed();
        self.get_camera_frames()?;

        if let Err(e) = self.session.start_running() {
            log::error!("Failed to start capture session: {e}");
        }
        Ok(())
    }

    /// Fits the preview to new view bounds.
    pub fn layout(&mut self, bounds: Size) {
        self.bounds = bounds;
        self.ui.layout(bounds);
    }

    /// Runs the UI context until the frame source ends, then joins the
    /// frame worker. Returns its final counters when it was started.
    pub fn run(&mut self) -> Option<FrameStats> {
        // Our own handle would keep the UI loop alive forever.
        self.handle = None;
        self.ui.run();

        let worker = self.worker.take()?;
        match worker.join() {
            Ok(stats) => Some(stats),
            Err(_) => {
                log::error!("Frame worker panicked");
                None
            }
        }
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn ui(&self) -> &UiContext {
        &self.ui
    }

    fn add_camera_input(&mut self) -> Result<(), ControllerError> {
        let descriptor = first_device(self.discovery.as_ref(), DevicePosition::Front)
            .ok_or(ControllerError::NoCameraDevice)?;

        match self.discovery.open(&descriptor) {
            Ok(device) => self.session.add_input(device),
            Err(e) => log::error!("Failed to create camera input for {descriptor}: {e}"),
        }
        Ok(())
    }

    fn show_camera_feed(&mut self) {
        self.ui.preview_mut().set_gravity(self.gravity);
        self.ui.layout(self.bounds);
    }

    fn get_camera_frames(&mut self) -> Result<(), ControllerError> {
        let (vision, handle, logger) = match (
            self.vision.take(),
            self.handle.clone(),
            self.logger.take(),
        ) {
            (Some(vision), Some(handle), Some(logger)) => (vision, handle, logger),
            _ => return Err(ControllerError::AlreadyActivated),
        };

        let (sink, frames) = frame_slot();
        self.session.add_output(OutputSettings::default(), sink);

        let invoker = DetectionInvoker::new(vision, handle);
        self.worker = Some(spawn_frame_worker(frames, invoker, logger)?);
        Ok(())
    }
}
