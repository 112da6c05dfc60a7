use std::path::PathBuf;

use crate::error::AnalysisError;

// ROI bounds are expressed in thousandths of the frame size, not percent.
pub const X_START_PERMILLE: u32 = 500;
pub const X_END_PERMILLE: u32 = 1000;
pub const Y_START_PERMILLE: u32 = 150;
pub const Y_END_PERMILLE: u32 = 950;

/// Denominator applied to every ROI bound
pub const ROI_SCALE: u32 = 1000;

/// Only every Nth decoded frame is handed to OCR
pub const DEFAULT_FRAME_INTERVAL: usize = 30;

/// Snippets with this many trimmed characters or fewer are treated as noise
pub const MIN_SNIPPET_CHARS: usize = 10;

/// Gray level above which a pixel becomes white
pub const BINARY_THRESHOLD: u8 = 120;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const MAX_UPLOAD_BYTES: usize = 128 * 1024 * 1024;

/// Extensions accepted by the upload endpoint, in the order they are reported
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["mp4", "mov", "avi"];

/// Crop window bounds, each out of [`ROI_SCALE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiConfig {
    pub x_start: u32,
    pub x_end: u32,
    pub y_start: u32,
    pub y_end: u32,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            x_start: X_START_PERMILLE,
            x_end: X_END_PERMILLE,
            y_start: Y_START_PERMILLE,
            y_end: Y_END_PERMILLE,
        }
    }
}

/// Everything the analysis pipeline needs, passed in explicitly per call
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub roi: RoiConfig,
    pub frame_interval: usize,
    /// Explicit tesseract binary; `None` means whatever `tesseract` is on PATH
    pub tesseract_path: Option<PathBuf>,
    pub min_snippet_chars: usize,
    pub binary_threshold: u8,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            roi: RoiConfig::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            tesseract_path: None,
            min_snippet_chars: MIN_SNIPPET_CHARS,
            binary_threshold: BINARY_THRESHOLD,
        }
    }
}

impl AnalysisConfig {
    pub fn with_frame_interval(mut self, frame_interval: usize) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    pub fn with_tesseract_path(mut self, path: Option<PathBuf>) -> Self {
        self.tesseract_path = path;
        self
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.frame_interval == 0 {
            return Err(AnalysisError::InvalidConfig(
                "frame interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the upload server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Upload limit in megabytes, as shown in error messages
    pub fn max_upload_mb(&self) -> f64 {
        self.max_upload_bytes as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roi_uses_thousandths() {
        let roi = RoiConfig::default();
        assert_eq!(roi.x_start, 500);
        assert_eq!(roi.x_end, ROI_SCALE);
        assert_eq!(roi.y_start, 150);
        assert_eq!(roi.y_end, 950);
    }

    #[test]
    fn test_zero_frame_interval_is_rejected() {
        let config = AnalysisConfig::default().with_frame_interval(0);
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_upload_limit_in_megabytes() {
        assert_eq!(ServerConfig::default().max_upload_mb(), 128.0);
        let half = ServerConfig {
            max_upload_bytes: 512 * 1024,
            ..ServerConfig::default()
        };
        assert_eq!(half.max_upload_mb(), 0.5);
    }
}
