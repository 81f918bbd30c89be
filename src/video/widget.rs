//! Video widget abstraction
//!
//! A widget is one player instance bound to one video. The tracker owns it
//! for its whole life and is the only caller of these methods.

use async_trait::async_trait;

use super::error::WidgetFault;
use super::id::VideoId;

/// Lifecycle status reported on each poll
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetStatus {
    /// Still buffering or resolving the stream
    Loading,
    /// Playable; duration in seconds
    Ready { duration: f64 },
    /// Unrecoverable failure
    Failed(WidgetFault),
}

/// One embedded player bound to a single video
#[async_trait]
pub trait VideoWidget: Send {
    /// Current lifecycle status
    async fn status(&mut self) -> WidgetStatus;

    /// Current playback position in seconds
    async fn current_time(&mut self) -> Result<f64, WidgetFault>;

    async fn pause(&mut self) -> Result<(), WidgetFault>;

    async fn resume(&mut self) -> Result<(), WidgetFault>;

    /// Release every resource held by the widget. Called exactly once.
    async fn destroy(&mut self);
}

/// Builds widgets for a video identifier
#[async_trait]
pub trait WidgetFactory: Send + Sync {
    async fn create(&self, video_id: &VideoId) -> Result<Box<dyn VideoWidget>, WidgetFault>;

    /// Short name for logs and the header
    fn name(&self) -> &'static str;
}
