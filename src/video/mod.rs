//! Video playback: identifier parsing, player backends, and tracking

pub mod error;
pub mod id;
#[cfg(unix)]
pub mod mpv;
pub mod simulated;
pub mod tracker;
pub mod widget;

pub use error::{PlaybackError, WidgetFault};
pub use id::VideoId;
pub use simulated::SimulatedFactory;
pub use tracker::{POLL_INTERVAL, PlaybackTracker, TrackerEvent};
pub use widget::{VideoWidget, WidgetFactory, WidgetStatus};
