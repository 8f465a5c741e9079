//! Side-by-side viewer of a color camera and its depth camera.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::Float;

pub mod frame;
pub mod source;
pub mod viewer;

pub use frame::{
    apply_colormap_jet, compose, convert_scale_abs, hstack, resize_area, ColorFrame, DepthFrame,
    Frame, GrayFrame,
};
pub use source::{Bgr24, FrameSink, FrameSource, Gray16Le, PngSink, RawVideoSource};
pub use viewer::{run_viewer, ViewerExit, ViewerStats};

/// Camera streams and display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub color_url: String,
    pub depth_url: String,
    /// Raw bgr24 frames decoded from the color stream
    pub color_input: PathBuf,
    /// Raw gray16le frames decoded from the depth stream
    pub depth_input: PathBuf,
    pub color_size: [usize; 2],
    pub depth_size: [usize; 2],
    pub depth_alpha: Float,
    pub output: PathBuf,
}

impl Default for VisionConfig {
    fn default() -> Self {
        VisionConfig {
            color_url: "rtsp://192.168.1.10/color".to_string(),
            depth_url: "rtsp://192.168.1.10/depth".to_string(),
            color_input: PathBuf::from("color.raw"),
            depth_input: PathBuf::from("depth.raw"),
            color_size: [1280, 720],
            depth_size: [480, 270],
            depth_alpha: 1.,
            output: PathBuf::from("kinova_vision.png"),
        }
    }
}
