mod config;
mod error;
mod format;
mod ocr;
mod pipeline;
mod preprocess;
mod roi;
mod snippets;
mod video;
mod web;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};

use config::{AnalysisConfig, ServerConfig, DEFAULT_FRAME_INTERVAL, DEFAULT_PORT, DEFAULT_STATIC_DIR, DEFAULT_UPLOAD_DIR};
use ocr::TesseractCli;
use pipeline::analyze_video_for_code;

/// Recovers HTML, CSS and JavaScript from screen recordings of a code editor.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the tesseract executable (defaults to `tesseract` on PATH)
    #[arg(long, global = true, env = "TESSERACT_PATH")]
    tesseract: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the upload web server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Directory uploaded videos are written to
        #[arg(long, default_value = DEFAULT_UPLOAD_DIR)]
        uploads_dir: PathBuf,

        /// Directory served under /static
        #[arg(long, default_value = DEFAULT_STATIC_DIR)]
        static_dir: PathBuf,
    },
    /// Analyze a local video and print the result as JSON
    Analyze {
        /// Path to the recording (mp4, mov, avi, ...)
        video: PathBuf,

        /// Only every Nth frame is run through OCR
        #[arg(short, long, default_value_t = DEFAULT_FRAME_INTERVAL)]
        frame_interval: usize,
    },
}

#[derive(ValueEnum, Clone, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Command::Serve {
            host,
            port,
            uploads_dir,
            static_dir,
        } => {
            let analysis = AnalysisConfig::default().with_tesseract_path(cli.tesseract);
            let (engine, _) = TesseractCli::resolve(analysis.tesseract_path.as_deref());
            info!("Using OCR engine: {}", engine.binary().display());

            let server = ServerConfig {
                host,
                port,
                upload_dir: uploads_dir,
                static_dir,
                ..ServerConfig::default()
            };
            info!("Starting web server on http://{}:{}", server.host, server.port);
            info!("Uploads are stored in {}", server.upload_dir.display());

            web::start_server(server, analysis, Arc::new(engine)).await?;
        }
        Command::Analyze {
            video,
            frame_interval,
        } => {
            let analysis = AnalysisConfig::default()
                .with_frame_interval(frame_interval)
                .with_tesseract_path(cli.tesseract);

            match analyze_video_for_code(&video, &analysis) {
                Ok(report) => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                Err(e) => {
                    error!("Analysis failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
