pub const FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Application directory name used under the platform config and cache dirs.
pub const APP_DIR_NAME: &str = "FaceCheck";

/// Default view size: a portrait phone screen in points.
pub const DEFAULT_VIEW_WIDTH: f64 = 390.0;
pub const DEFAULT_VIEW_HEIGHT: f64 = 844.0;

/// Stroke width of overlay outlines, in points.
pub const OUTLINE_LINE_WIDTH: f64 = 1.0;
