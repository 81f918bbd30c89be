//! Playback tracking
//!
//! Owns one widget inside a background task and turns its state into a
//! stream of [`TrackerEvent`]s. The position is sampled at a fixed
//! interval instead of relying on player-side notifications.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::error::{PlaybackError, WidgetFault};
use super::id::VideoId;
use super::widget::{VideoWidget, WidgetFactory, WidgetStatus};

/// How often the widget position is sampled.
/// Must stay below the scheduler's matching window.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Event queue capacity; a full queue blocks the poll loop
const EVENT_BUFFER: usize = 64;

/// Events reported by the tracker
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// Widget finished loading. Sent once per binding.
    Ready { duration: f64 },
    /// Periodic position sample in seconds
    TimeUpdate(f64),
    /// A pause request was carried out
    Paused,
    /// A cleared pause request resumed playback
    Resumed,
    /// Terminal failure; no further events follow
    Error(PlaybackError),
}

/// One live widget task
struct Binding {
    video_id: VideoId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    pause_tx: watch::Sender<bool>,
    events: mpsc::Receiver<TrackerEvent>,
}

/// Owns the player for the current video identifier
pub struct PlaybackTracker {
    factory: Arc<dyn WidgetFactory>,
    binding: Option<Binding>,
}

impl PlaybackTracker {
    /// Create a tracker and start a widget for `video_id`.
    /// Must be called from within a tokio runtime.
    pub fn spawn(factory: Arc<dyn WidgetFactory>, video_id: VideoId) -> Self {
        let binding = Self::bind(&factory, video_id);
        Self { factory, binding: Some(binding) }
    }

    fn bind(factory: &Arc<dyn WidgetFactory>, video_id: VideoId) -> Binding {
        tracing::info!("Binding {} player to video {}", factory.name(), video_id);

        let cancel = CancellationToken::new();
        let (pause_tx, pause_rx) = watch::channel(false);
        let (events_tx, events) = mpsc::channel(EVENT_BUFFER);

        let handle = tokio::spawn(tracking_loop(
            Arc::clone(factory),
            video_id.clone(),
            events_tx,
            pause_rx,
            cancel.clone(),
        ));

        Binding { video_id, cancel, handle, pause_tx, events }
    }

    /// The video the current widget is bound to
    pub fn video_id(&self) -> Option<&VideoId> {
        self.binding.as_ref().map(|b| &b.video_id)
    }

    /// Ask the widget to pause (`true`) or release a previous pause (`false`)
    pub fn request_pause(&self, pause: bool) {
        if let Some(binding) = &self.binding {
            binding.pause_tx.send_if_modified(|current| {
                let changed = *current != pause;
                *current = pause;
                changed
            });
        }
    }

    /// Next queued event without waiting
    pub fn try_next_event(&mut self) -> Option<TrackerEvent> {
        self.binding.as_mut().and_then(|b| b.events.try_recv().ok())
    }

    /// Wait for the next event; `None` once the widget task has ended
    pub async fn next_event(&mut self) -> Option<TrackerEvent> {
        match self.binding.as_mut() {
            Some(binding) => binding.events.recv().await,
            None => None,
        }
    }

    /// Tear down the current widget and bind a new one.
    /// The old widget is fully destroyed before the new one is created.
    pub async fn rebind(&mut self, video_id: VideoId) {
        self.release().await;
        self.binding = Some(Self::bind(&self.factory, video_id));
    }

    /// Stop polling and destroy the widget
    pub async fn shutdown(mut self) {
        self.release().await;
    }

    async fn release(&mut self) {
        let Some(binding) = self.binding.take() else {
            return;
        };
        binding.cancel.cancel();
        if let Err(e) = binding.handle.await {
            tracing::error!("Player task for {} failed to join: {}", binding.video_id, e);
        }
        tracing::debug!("Released player for {}", binding.video_id);
    }
}

impl Drop for PlaybackTracker {
    fn drop(&mut self) {
        // The task still destroys its widget after cancellation
        if let Some(binding) = &self.binding {
            binding.cancel.cancel();
        }
    }
}

/// Create the widget, poll it until told to stop, then destroy it
async fn tracking_loop(
    factory: Arc<dyn WidgetFactory>,
    video_id: VideoId,
    events: mpsc::Sender<TrackerEvent>,
    pause_rx: watch::Receiver<bool>,
    cancel: CancellationToken,
) {
    let created = tokio::select! {
        _ = cancel.cancelled() => return,
        created = factory.create(&video_id) => created,
    };

    let mut widget = match created {
        Ok(widget) => widget,
        Err(fault) => {
            report_fault(&events, &video_id, &fault).await;
            return;
        }
    };

    poll_widget(widget.as_mut(), &video_id, &events, pause_rx, &cancel).await;
    widget.destroy().await;
    tracing::debug!("Player loop for {} stopped", video_id);
}

/// Pause bookkeeping for one binding
#[derive(Debug, Default)]
struct PauseState {
    ready: bool,
    /// Whether the last command we issued was a pause
    paused: bool,
}

async fn poll_widget(
    widget: &mut dyn VideoWidget,
    video_id: &VideoId,
    events: &mpsc::Sender<TrackerEvent>,
    mut pause_rx: watch::Receiver<bool>,
    cancel: &CancellationToken,
) {
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut state = PauseState::default();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,

            changed = pause_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                if state.ready
                    && apply_pause(widget, video_id, events, &pause_rx, &mut state).await.is_err()
                {
                    return;
                }
                continue;
            }

            _ = interval.tick() => {}
        }

        match widget.status().await {
            WidgetStatus::Loading => continue,
            WidgetStatus::Failed(fault) => {
                report_fault(events, video_id, &fault).await;
                return;
            }
            WidgetStatus::Ready { duration } => {
                if !state.ready {
                    state.ready = true;
                    tracing::info!("Video {} ready ({:.1}s)", video_id, duration);
                    if events.send(TrackerEvent::Ready { duration }).await.is_err() {
                        return;
                    }
                }
            }
        }

        match widget.current_time().await {
            Ok(t) => {
                if events.send(TrackerEvent::TimeUpdate(t)).await.is_err() {
                    return;
                }
            }
            Err(fault) => {
                report_fault(events, video_id, &fault).await;
                return;
            }
        }

        if apply_pause(widget, video_id, events, &pause_rx, &mut state).await.is_err() {
            return;
        }
    }
}

/// Issue at most one pause per activation and one resume per release.
/// `Err` means the loop should stop.
async fn apply_pause(
    widget: &mut dyn VideoWidget,
    video_id: &VideoId,
    events: &mpsc::Sender<TrackerEvent>,
    pause_rx: &watch::Receiver<bool>,
    state: &mut PauseState,
) -> Result<(), ()> {
    let wanted = *pause_rx.borrow();

    let (result, event) = match (wanted, state.paused) {
        (true, false) => (widget.pause().await, TrackerEvent::Paused),
        (false, true) => (widget.resume().await, TrackerEvent::Resumed),
        _ => return Ok(()),
    };

    if let Err(fault) = result {
        report_fault(events, video_id, &fault).await;
        return Err(());
    }

    state.paused = wanted;
    tracing::debug!("Video {} {:?}", video_id, event);
    events.send(event).await.map_err(|_| ())
}

async fn report_fault(
    events: &mpsc::Sender<TrackerEvent>,
    video_id: &VideoId,
    fault: &WidgetFault,
) {
    let error = PlaybackError::from(fault);
    tracing::error!("Player fault on {} (code {}): {}", video_id, fault.code, fault.detail);
    let _ = events.send(TrackerEvent::Error(error)).await;
}
