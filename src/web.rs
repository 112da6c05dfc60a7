use actix_files::Files;
use actix_multipart::{Field, Multipart};
use actix_web::{middleware, web, App, HttpResponse, HttpResponseBuilder, HttpServer, Result};
use futures::StreamExt;
use log::{error, info, warn};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{AnalysisConfig, ServerConfig, ALLOWED_EXTENSIONS};
use crate::format::GeneratedCode;
use crate::ocr::OcrEngine;
use crate::pipeline::analyze_video_with;

/// Multipart field carrying the recording
const VIDEO_FIELD: &str = "videoFile";

pub struct AppState {
    pub server: ServerConfig,
    pub analysis: AnalysisConfig,
    pub ocr: Arc<dyn OcrEngine>,
}

#[derive(Serialize)]
pub struct GenerateCodeResponse {
    success: bool,
    html: String,
    css: String,
    js: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Debug, Error)]
enum UploadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("upload exceeds {0} bytes")]
    TooLarge(usize),
    #[error("upload interrupted: {0}")]
    Stream(String),
}

fn json_error(mut builder: HttpResponseBuilder, message: impl Into<String>) -> HttpResponse {
    builder.json(ErrorResponse {
        error: message.into(),
    })
}

/// Checks the text after the last dot against the allow-list, ignoring case
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Last path component of a client supplied filename
fn base_name(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

/// Name the upload is stored under: `<unix seconds>_<original name>`
pub fn stored_file_name(filename: &str, timestamp: i64) -> String {
    format!("{}_{}", timestamp, base_name(filename))
}

// Streams one multipart field to disk, refusing to grow past `limit` bytes
async fn save_field(field: &mut Field, path: &Path, limit: usize) -> Result<(), UploadError> {
    let mut file = std::fs::File::create(path)?;
    let mut written = 0usize;

    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| UploadError::Stream(e.to_string()))?;
        written += chunk.len();
        if written > limit {
            return Err(UploadError::TooLarge(limit));
        }
        file.write_all(&chunk)?;
    }

    file.flush()?;
    Ok(())
}

// Video upload endpoint
async fn generate_code(mut payload: Multipart, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut saved: Option<PathBuf> = None;

    while let Some(field) = payload.next().await {
        let mut field = field?;

        // Skip anything that is not the first video field
        if saved.is_some() || field.name() != Some(VIDEO_FIELD) {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("")
            .to_string();

        if filename.is_empty() {
            return Ok(json_error(HttpResponse::BadRequest(), "No selected file"));
        }

        if !allowed_file(&filename) {
            return Ok(json_error(
                HttpResponse::BadRequest(),
                format!("File type not supported. Use {}.", ALLOWED_EXTENSIONS.join(", ")),
            ));
        }

        let stored_name = stored_file_name(&filename, chrono::Utc::now().timestamp());
        let path = state.server.upload_dir.join(stored_name);

        if let Err(e) = save_field(&mut field, &path, state.server.max_upload_bytes).await {
            error!("Could not save upload to {}: {}", path.display(), e);
            let _ = std::fs::remove_file(&path);
            return Ok(json_error(
                HttpResponse::InternalServerError(),
                format!(
                    "Could not save file (Limit is {:.1} MB): {}",
                    state.server.max_upload_mb(),
                    e
                ),
            ));
        }

        info!("Saved upload to {}", path.display());
        saved = Some(path);
    }

    let Some(video_path) = saved else {
        return Ok(json_error(HttpResponse::BadRequest(), "No video file provided"));
    };

    // OCR blocks for the length of the video, keep it off the async workers
    let analysis = state.analysis.clone();
    let ocr = Arc::clone(&state.ocr);
    let job_path = video_path.clone();
    let result = web::block(move || analyze_video_with(&job_path, &analysis, ocr.as_ref())).await;

    let (code, warnings) = match result {
        Ok(Ok(report)) => {
            for warning in &report.warnings {
                warn!("{}: {}", video_path.display(), warning);
            }
            (report.code, report.warnings)
        }
        Ok(Err(e)) => {
            error!("Analysis of {} failed: {}", video_path.display(), e);
            (GeneratedCode::empty(), Vec::new())
        }
        Err(e) => {
            error!("Analysis task for {} did not finish: {}", video_path.display(), e);
            (GeneratedCode::empty(), Vec::new())
        }
    };

    if code.is_empty() {
        return Ok(json_error(
            HttpResponse::InternalServerError(),
            "Analysis failed to produce structured code.",
        ));
    }

    Ok(HttpResponse::Ok().json(GenerateCodeResponse {
        success: true,
        html: code.html,
        css: code.css,
        js: code.js,
        warnings,
    }))
}

// HTML page handler
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

/// Routes shared by the server and the tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/generate-code", web::post().to(generate_code));
}

pub async fn start_server(
    server: ServerConfig,
    analysis: AnalysisConfig,
    ocr: Arc<dyn OcrEngine>,
) -> std::io::Result<()> {
    std::fs::create_dir_all(&server.upload_dir)?;

    let host = server.host.clone();
    let port = server.port;
    let static_dir = server.static_dir.clone();
    let app_state = web::Data::new(AppState {
        server,
        analysis,
        ocr,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", &static_dir))
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
