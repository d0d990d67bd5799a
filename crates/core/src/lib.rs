pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod geometry;
}

pub mod capture {
    pub mod domain {
        pub mod capture_device;
        pub mod capture_error;
        pub mod device;
        pub mod frame_slot;
    }
    pub mod capture_session;
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod decoded_image;
        pub mod detection_result;
        pub mod image_orientation;
        pub mod observation;
        pub mod region_detector;
        pub mod vision_capability;
    }
    pub mod infrastructure;
}

pub mod overlay {
    pub mod domain {
        pub mod color;
        pub mod display_surface;
        pub mod outline_shape;
        pub mod overlay;
        pub mod preview_layer;
    }
    pub mod overlay_renderer;
}

pub mod pipeline {
    pub mod detection_invoker;
    pub mod frame_worker;
    pub mod pipeline_logger;
}

pub mod ui {
    pub mod ui_context;
}

pub mod controller;
