use std::path::Path;

use image::RgbImage;
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::format::GeneratedCode;
use crate::ocr::{OcrEngine, TesseractCli};
use crate::preprocess::preprocess_frame;
use crate::roi::RoiRect;
use crate::snippets::{classify, FrameOutcome, SkipReason};
use crate::video::{FrameSource, VideoReader};

/// Counters describing how the sampled frames fared
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub frames_read: usize,
    pub frames_sampled: usize,
    pub snippets_accepted: usize,
    pub skipped_empty_region: usize,
    pub skipped_too_short: usize,
    pub ocr_failures: usize,
}

impl FrameStats {
    fn record(&mut self, outcome: &FrameOutcome) {
        self.frames_sampled += 1;
        match outcome {
            FrameOutcome::Accepted { .. } => self.snippets_accepted += 1,
            FrameOutcome::Skipped { reason, .. } => match reason {
                SkipReason::EmptyRegion => self.skipped_empty_region += 1,
                SkipReason::TooShort { .. } => self.skipped_too_short += 1,
                SkipReason::OcrFailed { .. } => self.ocr_failures += 1,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub code: GeneratedCode,
    pub roi: RoiSummary,
    pub stats: FrameStats,
    pub warnings: Vec<String>,
}

/// Serializable view of the crop window used for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoiSummary {
    pub x_start: u32,
    pub x_end: u32,
    pub y_start: u32,
    pub y_end: u32,
}

impl From<RoiRect> for RoiSummary {
    fn from(rect: RoiRect) -> Self {
        Self {
            x_start: rect.x_start,
            x_end: rect.x_end,
            y_start: rect.y_start,
            y_end: rect.y_end,
        }
    }
}

/// Crops, preprocesses and OCRs a single sampled frame
pub fn process_frame(
    frame_index: usize,
    frame: &RgbImage,
    rect: &RoiRect,
    config: &AnalysisConfig,
    ocr: &dyn OcrEngine,
) -> FrameOutcome {
    let Some(cropped) = rect.crop(frame) else {
        return FrameOutcome::Skipped {
            frame_index,
            reason: SkipReason::EmptyRegion,
        };
    };

    let processed = preprocess_frame(&cropped, config.binary_threshold);
    match ocr.recognize(&processed) {
        Ok(text) => FrameOutcome::from_text(frame_index, &text, config.min_snippet_chars),
        Err(e) => FrameOutcome::Skipped {
            frame_index,
            reason: SkipReason::OcrFailed {
                message: e.to_string(),
            },
        },
    }
}

/// Samples every `frame_interval`th frame of `source`, OCRs its crop window
/// and turns the collected snippets into classified, formatted code.
pub fn analyze_frames<S: FrameSource + ?Sized>(
    source: &mut S,
    config: &AnalysisConfig,
    ocr: &dyn OcrEngine,
) -> Result<AnalysisReport, AnalysisError> {
    config.validate()?;

    let (width, height) = source.dimensions();
    let rect = RoiRect::from_config(width, height, &config.roi);
    info!(
        "Cropping ROI to: X[{}:{}], Y[{}:{}]",
        rect.x_start, rect.x_end, rect.y_start, rect.y_end
    );

    let mut warnings = Vec::new();
    if rect.is_empty() {
        let message = format!(
            "ROI {:?} is empty for a {}x{} video, every sampled frame will be skipped",
            config.roi, width, height
        );
        warn!("{}", message);
        warnings.push(message);
    }

    let mut stats = FrameStats::default();
    let mut snippets = Vec::new();
    let mut frame_index = 0;

    loop {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                // A broken packet ends the video the same way running out of frames does
                let message = format!("decoding stopped after {} frames: {}", frame_index, e);
                warn!("{}", message);
                warnings.push(message);
                break;
            }
        };

        if frame_index % config.frame_interval == 0 {
            let outcome = process_frame(frame_index, &frame, &rect, config, ocr);
            stats.record(&outcome);
            match outcome {
                FrameOutcome::Accepted { frame_index, text } => {
                    debug!(
                        "Snippet found in frame {}: {}...",
                        frame_index,
                        text.lines().next().unwrap_or_default()
                    );
                    snippets.push(text);
                }
                FrameOutcome::Skipped { frame_index, reason } => match reason {
                    SkipReason::EmptyRegion => debug!("Frame {}: empty crop window", frame_index),
                    SkipReason::TooShort { chars } => {
                        debug!("Frame {}: {} characters is too short, ignored", frame_index, chars)
                    }
                    SkipReason::OcrFailed { message } => {
                        debug!("Frame {}: OCR failed: {}", frame_index, message)
                    }
                },
            }
        }

        frame_index += 1;
    }

    stats.frames_read = frame_index;
    if stats.ocr_failures > 0 {
        warnings.push(format!(
            "OCR failed on {} of {} sampled frames",
            stats.ocr_failures, stats.frames_sampled
        ));
    }
    info!(
        "Analysis complete. Total frames processed: {}. Snippets found: {}.",
        stats.frames_read,
        snippets.len()
    );

    let buckets = classify(&snippets);
    let code = GeneratedCode::from_buckets(&buckets);

    Ok(AnalysisReport {
        code,
        roi: rect.into(),
        stats,
        warnings,
    })
}

/// Runs the whole pipeline on a video file with an already chosen OCR engine
pub fn analyze_video_with(
    video_path: &Path,
    config: &AnalysisConfig,
    ocr: &dyn OcrEngine,
) -> Result<AnalysisReport, AnalysisError> {
    info!("Starting analysis for video: {}", video_path.display());
    let mut reader = VideoReader::open(video_path)?;
    let report = analyze_frames(&mut reader, config, ocr)?;
    if report.stats.frames_read == 0 {
        return Err(AnalysisError::NoFrames(video_path.to_path_buf()));
    }
    Ok(report)
}

/// Runs the whole pipeline on a video file using tesseract as configured
pub fn analyze_video_for_code(
    video_path: &Path,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    let (engine, warning) = TesseractCli::resolve(config.tesseract_path.as_deref());
    let mut report = analyze_video_with(video_path, config, &engine)?;
    if let Some(warning) = warning {
        report.warnings.insert(0, warning);
    }
    Ok(report)
}
