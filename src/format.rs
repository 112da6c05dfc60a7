use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::snippets::Buckets;

pub const NO_CSS_FOUND: &str = "/* No distinct CSS found. */";
pub const NO_JS_FOUND: &str = "// No distinct JavaScript found.";

pub const FALLBACK_HTML: &str = "<h1>OCR Fallback Title V2</h1>\n<div class=\"ocr-fallback-box\">OCR found noise or video needs clearer code.</div>";
pub const FALLBACK_CSS: &str = ".ocr-fallback-box { background-color: darkred; color: white; padding: 10px; text-align: center;}";
pub const FALLBACK_JS: &str = "// Fallback: Check video quality or ROI settings.";

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Html,
    Css,
    Js,
}

/// The reconstructed code, one string per language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedCode {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl GeneratedCode {
    /// Sentinel for a run that never got to look at frames
    pub fn empty() -> Self {
        Self {
            html: String::new(),
            css: String::new(),
            js: String::new(),
        }
    }

    /// Placeholder returned when OCR produced nothing classifiable
    pub fn fallback() -> Self {
        Self {
            html: FALLBACK_HTML.to_string(),
            css: FALLBACK_CSS.to_string(),
            js: FALLBACK_JS.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty() && self.css.is_empty() && self.js.is_empty()
    }

    /// Formats every bucket, or returns [`GeneratedCode::fallback`] when all are empty
    pub fn from_buckets(buckets: &Buckets) -> Self {
        if buckets.is_empty() {
            return Self::fallback();
        }

        let html = if buckets.html.is_empty() {
            String::new()
        } else {
            clean_and_format_code(&buckets.html, Language::Html)
        };
        let css = if buckets.css.is_empty() {
            NO_CSS_FOUND.to_string()
        } else {
            clean_and_format_code(&buckets.css, Language::Css)
        };
        let js = if buckets.js.is_empty() {
            NO_JS_FOUND.to_string()
        } else {
            clean_and_format_code(&buckets.js, Language::Js)
        };

        Self { html, css, js }
    }
}

/// Drops exact duplicates, flattens whitespace, and breaks HTML between tags
pub fn clean_and_format_code(snippets: &[String], language: Language) -> String {
    let mut seen = HashSet::new();
    let mut output = String::new();

    for snippet in snippets {
        if !seen.insert(snippet.as_str()) {
            continue;
        }

        let line = WHITESPACE_RUN.replace_all(snippet.trim(), " ");
        let formatted = match language {
            Language::Html => line.replace("><", ">\n<"),
            Language::Css | Language::Js => line.into_owned(),
        };

        output.push_str(&formatted);
        output.push('\n');
    }

    output.trim().to_string()
}
