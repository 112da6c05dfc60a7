use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::{GrayImage, ImageFormat};
use log::{debug, warn};

use crate::error::OcrError;

/// Binary looked up on PATH when no usable override is configured
pub const DEFAULT_TESSERACT_BINARY: &str = "tesseract";

/// Tesseract page segmentation mode 6: a single uniform block of text
const PAGE_SEGMENTATION_MODE: &str = "6";

/// Anything that can turn a preprocessed frame into text
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError>;
}

/// Runs the `tesseract` command line tool once per image
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    /// Picks the configured binary if it exists, otherwise falls back to PATH.
    ///
    /// The second value is a warning for the caller when a configured path
    /// had to be ignored.
    pub fn resolve(configured: Option<&Path>) -> (Self, Option<String>) {
        match configured {
            Some(path) if path.exists() => (Self::new(path), None),
            Some(path) => {
                let message = format!(
                    "tesseract executable not found at {}, falling back to `{}` on PATH",
                    path.display(),
                    DEFAULT_TESSERACT_BINARY
                );
                warn!("{}", message);
                (Self::new(DEFAULT_TESSERACT_BINARY), Some(message))
            }
            None => (Self::new(DEFAULT_TESSERACT_BINARY), None),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new(DEFAULT_TESSERACT_BINARY)
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "--psm", PAGE_SEGMENTATION_MODE])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| OcrError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        // Dropping stdin closes the pipe so tesseract sees EOF
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&png)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract returned {} bytes", text.len());
        Ok(text)
    }
}
