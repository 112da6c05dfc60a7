use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a whole analysis run
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("video file not found at {}", .0.display())]
    VideoNotFound(PathBuf),
    #[error("could not open video {}: {reason}", .path.display())]
    VideoOpen { path: PathBuf, reason: String },
    #[error("failed to decode video: {0}")]
    Decode(#[from] ffmpeg_next::Error),
    #[error("video {} contains no decodable frames", .0.display())]
    NoFrames(PathBuf),
    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),
}

/// Failures of a single OCR call; never abort the run
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("could not encode frame for OCR: {0}")]
    Encode(#[from] image::ImageError),
    #[error("could not start {}: {source}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error talking to OCR engine: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}
