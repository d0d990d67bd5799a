pub mod detector_vision;
pub mod model_resolver;
pub mod onnx_yolo_detector;
