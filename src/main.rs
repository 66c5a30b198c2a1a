//! handpose-replay - run a landmark recording through the gesture controller
//!
//! Prints one JSON line per frame with the control signal, and one per
//! gesture event, using the recording's own timestamps.

use anyhow::Context;
use clap::Parser;
use handpose_control::input::{HandTracker, ReplayTracker};
use handpose_control::{init_tracing, EventType, GestureConfig, GestureController, PoseTag};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "handpose-replay", about = "Replay hand landmarks through the gesture controller")]
struct Cli {
    /// JSON recording: array of {timestampMs, frame}
    recording: PathBuf,

    /// Gesture configuration (JSON, camelCase fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the themes profile (fist / restore / victory) instead of the default
    #[arg(long, conflicts_with = "config")]
    themes: bool,

    /// Only print gesture events
    #[arg(long)]
    events_only: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
enum OutputLine {
    Signal {
        #[serde(rename = "timestampMs")]
        timestamp_ms: f64,
        rotation: f64,
        scale: Option<f64>,
    },
    Gesture {
        #[serde(rename = "timestampMs")]
        timestamp_ms: f64,
        pose: PoseTag,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing("handpose_control=debug,handpose_replay=info");
    info!("handpose-replay v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => GestureConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None if cli.themes => GestureConfig::themes(),
        None => GestureConfig::default(),
    };
    let mut controller = GestureController::new(config).context("invalid gesture config")?;
    let (_, events) = controller.subscribe(EventType::Gesture);

    let mut tracker = ReplayTracker::open(&cli.recording);
    tracker
        .initialize()
        .with_context(|| format!("reading recording {}", cli.recording.display()))?;
    tracker.start()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut frames = 0usize;
    let mut gestures = 0usize;

    while let Some(recorded) = tracker.next_frame()? {
        let timestamp_ms = recorded.timestamp_ms;
        let signal = controller.process_at(&recorded.frame, timestamp_ms);
        frames += 1;

        if !cli.events_only {
            let line = OutputLine::Signal {
                timestamp_ms,
                rotation: signal.rotation,
                scale: signal.scale,
            };
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        }
        for event in events.try_iter() {
            gestures += 1;
            let line = OutputLine::Gesture {
                timestamp_ms,
                pose: event.pose,
            };
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        }
    }

    tracker.stop()?;
    info!("Replayed {} frames, {} gestures", frames, gestures);
    Ok(())
}
