//! Handpose Control - hand-pose gestures and continuous controls from landmarks.
//!
//! Consumes per-frame hand landmarks from an external detector, recognizes a
//! small vocabulary of static poses, debounces them into discrete `gesture`
//! events, and derives continuous rotation and scale signals.

pub mod clock;
pub mod config;
pub mod controller;
pub mod events;
pub mod input;
pub mod processing;
pub mod recognition;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{ConfigError, ConfigResult, GestureConfig};
pub use controller::GestureController;
pub use events::{EventDispatcher, EventType, GestureEvent, ListenerId};
pub use input::{Frame, Handedness, Landmark};
pub use processing::ControlSignal;
pub use recognition::PoseTag;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_err()
    {
        tracing::warn!("Tracing subscriber already installed");
    }
}
