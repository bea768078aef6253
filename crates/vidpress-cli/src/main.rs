//! vidpress CLI: submit videos to the processing backend.
//!
//! Set VIDPRESS_API_URL (default http://localhost:5000). Paths may be typed,
//! or dragged onto the terminal, which pastes them quoted or escaped.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;
use vidpress_api_client::{ApiClient, RealtimeClient, RealtimeEvent};
use vidpress_cli::render::{progress_line, render};
use vidpress_cli::speech::SpeechAnnouncer;
use vidpress_cli::{init_tracing, intake, Uploader};
use vidpress_core::{
    validate_video, Action, Announcer, ClientConfig, ErrorMetadata, NoOpAnnouncer, Phase,
    Template, TextSize,
};

#[derive(Parser)]
#[command(name = "vidpress", about = "Video processing uploader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a file would be accepted for upload
    Validate {
        /// Path to the video (dropped/pasted paths are accepted)
        input: String,
    },
    /// Upload a video and apply a processing action
    Process {
        /// Path to the video (dropped/pasted paths are accepted)
        input: String,
        /// Action: compress, convert, trim
        #[arg(long, default_value = "compress")]
        action: Action,
        /// Download the processed video when done
        #[arg(long)]
        download: bool,
        /// Directory for the downloaded video (defaults to VIDPRESS_DOWNLOAD_DIR)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Do not subscribe to real-time progress
        #[arg(long)]
        no_progress: bool,
        /// Visual template: default, school, birthday
        #[arg(long)]
        template: Option<Template>,
        /// Larger, uppercase status labels
        #[arg(long)]
        large_text: bool,
    },
    /// Download a processed video through the backend proxy
    Download {
        /// Processed-video URL returned by `process`
        url: String,
        /// Destination directory (defaults to VIDPRESS_DOWNLOAD_DIR)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print real-time progress events until interrupted
    Watch,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Announcer used by the commands, plus the concrete speech announcer when
/// enabled so pending announcements can be flushed before exit.
struct Feedback {
    announcer: Arc<dyn Announcer>,
    speech: Option<Arc<SpeechAnnouncer>>,
}

impl Feedback {
    fn from_config(config: &ClientConfig) -> Self {
        if config.speech_enabled {
            let speech = Arc::new(SpeechAnnouncer::from_config(config));
            Self {
                announcer: speech.clone(),
                speech: Some(speech),
            }
        } else {
            Self {
                announcer: Arc::new(NoOpAnnouncer),
                speech: None,
            }
        }
    }

    async fn flush(&self) {
        if let Some(speech) = &self.speech {
            speech.flush().await;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env().context("Invalid VIDPRESS_* configuration")?;
    let cli = Cli::parse();

    let feedback = Feedback::from_config(&config);
    let code = run(cli.command, &config, &feedback).await;
    feedback.flush().await;
    code
}

async fn run(
    command: Commands,
    config: &ClientConfig,
    feedback: &Feedback,
) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Validate { input } => {
            let path = intake::first_dropped_path(&input).context("No path given")?;
            let video = match intake::inspect(&path).await {
                Ok(video) => video,
                Err(err) => {
                    eprintln!("{}", err);
                    return Ok(ExitCode::FAILURE);
                }
            };
            if let Err(err) = validate_video(&video, config.max_file_size_bytes) {
                eprintln!("{}", err.client_message());
                return Ok(ExitCode::FAILURE);
            }
            print_json(&video)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Process {
            input,
            action,
            download,
            output_dir,
            no_progress,
            template,
            large_text,
        } => {
            let template = template.unwrap_or(config.template);
            let text_size = if large_text {
                TextSize::Large
            } else {
                config.text_size
            };
            let api = ApiClient::from_config(config).context("Failed to create API client")?;
            let uploader = Uploader::new(
                api,
                feedback.announcer.clone(),
                config.max_file_size_bytes,
                template,
                text_size,
            );

            if uploader.drop_paths(&input).await.is_err() {
                print!("{}", render(&uploader.snapshot()));
                return Ok(ExitCode::FAILURE);
            }

            let subscription = if no_progress {
                None
            } else {
                match RealtimeClient::from_config(config).connect().await {
                    Ok(connection) => Some(uploader.attach_progress(connection)),
                    Err(err) => {
                        warn!(error = %err, "Progress updates unavailable");
                        None
                    }
                }
            };

            let redraw = tokio::spawn(redraw_progress(uploader.subscribe()));
            let result = uploader.process(action).await;
            redraw.abort();
            drop(subscription);
            eprintln!();

            print!("{}", render(&uploader.snapshot()));
            let url = match result {
                Ok(url) => url,
                Err(_) => return Ok(ExitCode::FAILURE),
            };
            if let Some(link) = uploader.play_link() {
                println!("Play: {}", link);
            }

            if download {
                let dest_dir = output_dir.unwrap_or_else(|| config.download_dir.clone());
                match uploader.download_from(&url, &dest_dir).await {
                    Ok(path) => println!("Saved: {}", path.display()),
                    Err(err) => {
                        eprintln!("{}", err.client_message());
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Download { url, output_dir } => {
            let api = ApiClient::from_config(config).context("Failed to create API client")?;
            let uploader = Uploader::new(
                api,
                feedback.announcer.clone(),
                config.max_file_size_bytes,
                config.template,
                config.text_size,
            );
            let dest_dir = output_dir.unwrap_or_else(|| config.download_dir.clone());
            match uploader.download_from(&url, &dest_dir).await {
                Ok(path) => {
                    println!("Saved: {}", path.display());
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{}", err.client_message());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Watch => {
            let mut connection = RealtimeClient::from_config(config)
                .connect()
                .await
                .context("Failed to connect to progress channel")?;
            let sid = connection.sid().to_string();
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    event = connection.next_event() => match event {
                        Some(RealtimeEvent::Connected) => println!("connected ({})", sid),
                        Some(RealtimeEvent::Progress(progress)) => println!("progress {}", progress),
                        Some(RealtimeEvent::Disconnected { reason }) => println!("disconnected: {}", reason),
                        None => break,
                    },
                }
            }
            connection.close().await;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Redraw the progress line in place on stderr while a request is in flight.
async fn redraw_progress(mut rx: tokio::sync::watch::Receiver<vidpress_core::UploaderState>) {
    while rx.changed().await.is_ok() {
        let line = {
            let state = rx.borrow_and_update();
            if state.phase != Phase::Processing {
                continue;
            }
            progress_line(&state)
        };
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r{}", line);
        let _ = stderr.flush();
    }
}
