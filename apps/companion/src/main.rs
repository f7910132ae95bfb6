//! radar-companion: command-line stand-in for the browser extension.
//!
//! Sends captures to the Radar API and keeps a local outbox of the most recent
//! ones, so nothing is lost while the backend is unreachable.

mod config;
mod state;
mod store;
mod sync;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::CompanionConfig;
use crate::state::{detect_platform, CaptureMode, CapturePayload};
use crate::store::StateFile;
use crate::sync::{submit_or_queue, sync_file, CaptureSink, HttpCaptureSink};

#[derive(Parser, Debug)]
#[command(name = "radar-companion")]
#[command(about = "Capture content into Radar from the command line")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture a piece of content into the current project
    Capture {
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        content: String,
        /// Page the content came from; also used to detect the platform
        #[arg(short, long)]
        url: Option<String>,
        #[arg(long = "type", value_enum, default_value_t = CaptureKind::Text)]
        kind: CaptureKind,
        #[arg(short, long)]
        note: Option<String>,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Overrides the current project for this capture only
        #[arg(long)]
        project: Option<Uuid>,
    },
    /// Resubmit captures that never reached the backend
    Sync,
    /// Show local state and backend connectivity
    Status,
    /// Set the project new captures go to
    UseProject { project_id: Uuid },
    /// Switch capture mode
    Mode {
        #[arg(value_enum)]
        mode: ModeArg,
    },
    /// Store a voice note transcript for this session
    Note { transcript: String },
    /// Run the session janitor and periodic sync until interrupted
    Watch {
        #[arg(long, default_value_t = 3600)]
        purge_every_secs: u64,
        #[arg(long, default_value_t = 300)]
        sync_every_secs: u64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CaptureKind {
    Screenshot,
    Text,
    Url,
    VideoFrame,
    Thread,
}

impl CaptureKind {
    fn as_str(self) -> &'static str {
        match self {
            CaptureKind::Screenshot => "screenshot",
            CaptureKind::Text => "text",
            CaptureKind::Url => "url",
            CaptureKind::VideoFrame => "video-frame",
            CaptureKind::Thread => "thread",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Precision,
    Context,
}

impl From<ModeArg> for CaptureMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Precision => CaptureMode::Precision,
            ModeArg::Context => CaptureMode::Context,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = CompanionConfig::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("radar_companion={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let file = StateFile::new(config.state_file.clone());

    match cli.command {
        Command::Capture {
            title,
            content,
            url,
            kind,
            note,
            tags,
            project,
        } => {
            let mut state = file.load().await?;
            state.is_authenticated = config.user_id.is_some();
            if state.current_project.is_none() {
                state.current_project = config.default_project;
            }

            let Some(user_id) = config.user_id else {
                bail!("RADAR_USER_ID is not set; cannot attribute captures");
            };
            let Some(project_id) = project.or(state.current_project) else {
                bail!("No current project. Run `radar-companion use-project <id>` first");
            };
            if title.trim().is_empty() {
                bail!("A capture needs a title");
            }

            let platform = url.as_deref().map(detect_platform).unwrap_or("web");
            let payload = CapturePayload {
                user_id,
                project_id,
                capture_type: kind.as_str().to_string(),
                platform: platform.to_string(),
                title,
                content,
                source_url: url,
                screenshot_ref: None,
                user_note: note,
                tags,
            };

            let sink = HttpCaptureSink::new(&config.api_url)?;
            let synced = submit_or_queue(&mut state, &sink, payload).await;
            file.save(&state).await?;

            if synced {
                println!("Captured to project {project_id}");
            } else {
                println!(
                    "Backend unreachable; capture saved locally ({} waiting to sync)",
                    state.unsynced_count()
                );
            }
        }
        Command::Sync => {
            let sink = HttpCaptureSink::new(&config.api_url)?;
            let report = sync_file(&file, &sink).await?;
            println!("Synced {} of {} captures", report.synced, report.attempted);
        }
        Command::Status => {
            let mut state = file.load().await?;
            state.is_authenticated = config.user_id.is_some();
            let sink = HttpCaptureSink::new(&config.api_url)?;
            let reachable = sink.backend_reachable(&config.health_url()).await;

            let status = state.status(Utc::now());
            println!("{}", serde_json::to_string_pretty(&status)?);
            println!(
                "backend: {} ({})",
                if reachable { "reachable" } else { "unreachable" },
                config.api_url
            );
        }
        Command::UseProject { project_id } => {
            let mut state = file.load().await?;
            state.current_project = Some(project_id);
            file.save(&state).await?;
            println!("Current project set to {project_id}");
        }
        Command::Mode { mode } => {
            let mut state = file.load().await?;
            state.capture_mode = mode.into();
            file.save(&state).await?;
            println!("Capture mode: {:?}", state.capture_mode);
        }
        Command::Note { transcript } => {
            let mut state = file.load().await?;
            state.record_voice_note(transcript, Utc::now());
            file.save(&state).await?;
            println!("Voice note saved ({} this session)", state.voice_notes.len());
        }
        Command::Watch {
            purge_every_secs,
            sync_every_secs,
        } => {
            let sink: Option<Box<dyn CaptureSink>> = match config.user_id {
                Some(_) => Some(Box::new(HttpCaptureSink::new(&config.api_url)?)),
                None => None,
            };
            info!(
                "Watching {} (purge every {purge_every_secs}s, sync every {sync_every_secs}s)",
                file.path().display()
            );

            tokio::select! {
                _ = sync::run_background(
                    file.clone(),
                    sink,
                    Duration::from_secs(purge_every_secs.max(1)),
                    Duration::from_secs(sync_every_secs.max(1)),
                ) => {}
                res = tokio::signal::ctrl_c() => {
                    res.context("Failed to listen for Ctrl-C")?;
                    info!("Stopping companion watch");
                }
            }
        }
    }

    Ok(())
}
