//! OpenCV webcam source (`camera` feature)

use image::RgbImage;
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{VideoCapture, CAP_ANY},
};

use crate::core::FrameSource;
use crate::{Error, Result};

pub struct CameraSource {
    index: i32,
    capture: VideoCapture,
}

impl CameraSource {
    pub fn open(index: i32) -> Result<Self> {
        let unavailable = |reason: String| Error::CameraUnavailable { index, reason };

        let capture = VideoCapture::new(index, CAP_ANY).map_err(|e| unavailable(e.to_string()))?;
        let opened = capture.is_opened().map_err(|e| unavailable(e.to_string()))?;
        if !opened {
            return Err(unavailable("device did not open".to_string()));
        }
        Ok(Self { index, capture })
    }
}

impl FrameSource for CameraSource {
    fn read_frame(&mut self) -> Result<RgbImage> {
        let mut mat = Mat::default();
        let grabbed = self
            .capture
            .read(&mut mat)
            .map_err(|e| Error::FrameRead(format!("camera {}: {}", self.index, e)))?;
        if !grabbed || mat.empty() {
            return Err(Error::FrameRead(format!("camera {}: empty frame", self.index)));
        }
        bgr_mat_to_rgb(&mat)
    }
}

/// Copy a continuous 8-bit BGR `Mat` into an RGB image buffer
fn bgr_mat_to_rgb(mat: &Mat) -> Result<RgbImage> {
    let width = mat.cols() as u32;
    let height = mat.rows() as u32;
    let bytes = mat
        .data_bytes()
        .map_err(|e| Error::FrameRead(format!("frame data: {}", e)))?;

    let expected = (width * height * 3) as usize;
    if bytes.len() < expected {
        return Err(Error::FrameRead(format!(
            "unexpected frame layout: {} bytes for {}x{}",
            bytes.len(),
            width,
            height
        )));
    }

    let mut rgb = Vec::with_capacity(expected);
    for px in bytes[..expected].chunks_exact(3) {
        rgb.extend_from_slice(&[px[2], px[1], px[0]]);
    }
    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| Error::FrameRead("frame buffer size mismatch".to_string()))
}
