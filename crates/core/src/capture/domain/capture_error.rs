use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no camera device matches {0}")]
    UnknownDevice(String),
    #[error("failed to open capture source {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("capture source {0} has no video stream")]
    NoVideoStream(PathBuf),
    #[error("capture session has no camera input")]
    NoInput,
    #[error("capture session has no frame output")]
    NoOutput,
    #[error("camera cannot deliver the requested output: {0}")]
    UnsupportedSettings(String),
    #[error("capture session is already running")]
    AlreadyRunning,
    #[error("failed to spawn capture thread: {0}")]
    Spawn(#[source] std::io::Error),
}
