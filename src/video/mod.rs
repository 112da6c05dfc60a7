pub mod reader;
#[cfg(test)]
pub mod fixtures;

use image::RgbImage;

use crate::error::AnalysisError;

pub use reader::VideoReader;

/// An ordered stream of decoded frames with fixed dimensions
pub trait FrameSource {
    /// Width and height reported by the container
    fn dimensions(&self) -> (u32, u32);

    /// Next frame in presentation order, `None` once the stream is exhausted
    fn next_frame(&mut self) -> Result<Option<RgbImage>, AnalysisError>;
}

/// Frames held in memory, handed out front to back
#[cfg(test)]
pub struct FrameSequence {
    width: u32,
    height: u32,
    frames: std::collections::VecDeque<RgbImage>,
}

#[cfg(test)]
impl FrameSequence {
    pub fn new(width: u32, height: u32, frames: Vec<RgbImage>) -> Self {
        Self {
            width,
            height,
            frames: frames.into(),
        }
    }
}

#[cfg(test)]
impl FrameSource for FrameSequence {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>, AnalysisError> {
        Ok(self.frames.pop_front())
    }
}
