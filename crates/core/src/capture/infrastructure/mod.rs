pub mod ffmpeg_camera;
pub mod file_camera_discovery;
