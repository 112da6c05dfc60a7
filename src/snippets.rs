const JS_MARKERS: [&str; 3] = ["function", "document.", "const"];
const HTML_MARKERS: [&str; 5] = ["<div", "<h1", "<p", "<button", "<body"];

/// Why a sampled frame contributed no snippet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The crop window had no pixels for this frame
    EmptyRegion,
    /// Recognized text was too short to be anything but noise
    TooShort { chars: usize },
    OcrFailed { message: String },
}

/// Result of running one sampled frame through OCR
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Accepted { frame_index: usize, text: String },
    Skipped { frame_index: usize, reason: SkipReason },
}

impl FrameOutcome {
    /// Trims OCR output and keeps it only when longer than `min_chars`
    pub fn from_text(frame_index: usize, raw: &str, min_chars: usize) -> Self {
        let text = raw.trim();
        let chars = text.chars().count();
        if chars > min_chars {
            FrameOutcome::Accepted {
                frame_index,
                text: text.to_string(),
            }
        } else {
            FrameOutcome::Skipped {
                frame_index,
                reason: SkipReason::TooShort { chars },
            }
        }
    }
}

pub fn is_css(snippet: &str) -> bool {
    snippet.contains('{') && snippet.contains('}') && snippet.contains(':')
}

pub fn is_js(snippet: &str) -> bool {
    JS_MARKERS.iter().any(|marker| snippet.contains(marker))
}

pub fn is_html(snippet: &str) -> bool {
    HTML_MARKERS.iter().any(|marker| snippet.contains(marker))
}

/// Snippets sorted by the language they look like.
///
/// The three tests run independently, so one snippet can land in several
/// buckets or in none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    pub html: Vec<String>,
    pub css: Vec<String>,
    pub js: Vec<String>,
}

impl Buckets {
    pub fn is_empty(&self) -> bool {
        self.html.is_empty() && self.css.is_empty() && self.js.is_empty()
    }
}

pub fn classify(snippets: &[String]) -> Buckets {
    let pick = |predicate: fn(&str) -> bool| -> Vec<String> {
        snippets.iter().filter(|s| predicate(s)).cloned().collect()
    };

    Buckets {
        css: pick(is_css),
        js: pick(is_js),
        html: pick(is_html),
    }
}
