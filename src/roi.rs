use image::{imageops, RgbImage};

use crate::config::{RoiConfig, ROI_SCALE};

/// Crop window in pixel coordinates, end bounds exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiRect {
    pub x_start: u32,
    pub x_end: u32,
    pub y_start: u32,
    pub y_end: u32,
}

impl RoiRect {
    /// Scales the configured thousandths to the frame size.
    ///
    /// The result always satisfies `x_start <= x_end <= width` and
    /// `y_start <= y_end <= height`: an end past the frame is cut to the frame
    /// and a start past its end collapses the window to zero width.
    pub fn from_config(width: u32, height: u32, roi: &RoiConfig) -> Self {
        let (x_start, x_end) = scale_span(width, roi.x_start, roi.x_end);
        let (y_start, y_end) = scale_span(height, roi.y_start, roi.y_end);
        Self { x_start, x_end, y_start, y_end }
    }

    pub fn width(&self) -> u32 {
        self.x_end.saturating_sub(self.x_start)
    }

    pub fn height(&self) -> u32 {
        self.y_end.saturating_sub(self.y_start)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Copies the window out of `frame`; `None` when there is nothing to crop
    pub fn crop(&self, frame: &RgbImage) -> Option<RgbImage> {
        // Frames may not match the dimensions the rect was computed for
        let x_end = self.x_end.min(frame.width());
        let y_end = self.y_end.min(frame.height());
        let x_start = self.x_start.min(x_end);
        let y_start = self.y_start.min(y_end);
        if x_end == x_start || y_end == y_start {
            return None;
        }
        Some(imageops::crop_imm(frame, x_start, y_start, x_end - x_start, y_end - y_start).to_image())
    }
}

fn scale_span(extent: u32, start_permille: u32, end_permille: u32) -> (u32, u32) {
    let end = scale(extent, end_permille).min(extent);
    let start = scale(extent, start_permille).min(end);
    (start, end)
}

fn scale(extent: u32, permille: u32) -> u32 {
    let scaled = u64::from(extent) * u64::from(permille) / u64::from(ROI_SCALE);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}
