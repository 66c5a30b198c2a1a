//! Landmark source trait and JSON recording replay
//!
//! Defines the lifecycle every hand-landmark provider goes through
//! (initialize, start, poll frames, stop) so the detector is an owned
//! resource handed to the caller rather than process-wide state.

use crate::input::types::Frame;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by landmark providers
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Tracker not initialized")]
    NotInitialized,

    #[error("Tracker already running")]
    AlreadyRunning,

    #[error("Tracker not running")]
    NotRunning,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Recording parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Source error: {0}")]
    SourceError(String),
}

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

/// A frame stamped with the time it was detected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedFrame {
    /// Milliseconds since the recording started
    pub timestamp_ms: f64,
    pub frame: Frame,
}

/// Trait for hand-landmark providers
///
/// A provider owns its detector; dropping it releases everything.
pub trait HandTracker {
    /// Provider identifier (e.g. "replay", "camera")
    fn id(&self) -> &str;

    /// Load models or open the source
    fn initialize(&mut self) -> TrackerResult<()>;

    /// Begin producing frames
    fn start(&mut self) -> TrackerResult<()>;

    /// Stop producing frames
    fn stop(&mut self) -> TrackerResult<()>;

    fn is_running(&self) -> bool;

    /// Next detection tick, or `None` once the source is exhausted
    fn next_frame(&mut self) -> TrackerResult<Option<RecordedFrame>>;
}

/// Replays a JSON landmark recording
pub struct ReplayTracker {
    id: String,
    source: Option<PathBuf>,
    frames: Vec<RecordedFrame>,
    cursor: usize,
    initialized: bool,
    running: bool,
}

impl ReplayTracker {
    /// Replay the recording stored at `path`; read on `initialize`
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            id: "replay".to_string(),
            source: Some(path.as_ref().to_path_buf()),
            frames: Vec::new(),
            cursor: 0,
            initialized: false,
            running: false,
        }
    }

    /// Replay frames already in memory
    pub fn from_frames(frames: Vec<RecordedFrame>) -> Self {
        Self {
            id: "replay".to_string(),
            source: None,
            frames,
            cursor: 0,
            initialized: false,
            running: false,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl HandTracker for ReplayTracker {
    fn id(&self) -> &str {
        &self.id
    }

    fn initialize(&mut self) -> TrackerResult<()> {
        if let Some(path) = &self.source {
            let content = std::fs::read_to_string(path)?;
            self.frames = serde_json::from_str(&content)?;
        }
        self.cursor = 0;
        self.initialized = true;

        tracing::info!(
            "Replay tracker initialized ({} frames, source={:?})",
            self.frames.len(),
            self.source
        );
        Ok(())
    }

    fn start(&mut self) -> TrackerResult<()> {
        if !self.initialized {
            return Err(TrackerError::NotInitialized);
        }
        if self.running {
            return Err(TrackerError::AlreadyRunning);
        }
        self.running = true;
        tracing::info!("Replay tracker started");
        Ok(())
    }

    fn stop(&mut self) -> TrackerResult<()> {
        if !self.running {
            return Ok(());
        }
        self.running = false;
        tracing::info!("Replay tracker stopped at frame {}/{}", self.cursor, self.frames.len());
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn next_frame(&mut self) -> TrackerResult<Option<RecordedFrame>> {
        if !self.running {
            return Err(TrackerError::NotRunning);
        }
        let frame = self.frames.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }
}

/// Accumulates frames and writes them as a replayable recording
#[derive(Debug, Default)]
pub struct FrameRecorder {
    frames: Vec<RecordedFrame>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, timestamp_ms: f64, frame: Frame) {
        self.frames.push(RecordedFrame { timestamp_ms, frame });
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn write_to(&self, path: &Path) -> TrackerResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&self.frames)?;
        std::fs::write(path, data)?;

        tracing::info!("Wrote {} frames to {}", self.frames.len(), path.display());
        Ok(())
    }
}
