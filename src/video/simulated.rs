//! Clock-driven stand-in for a real player
//!
//! Plays a fixed-length "video" against the tokio clock, so it runs under
//! paused test time as well as in the terminal when no player is installed.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::error::WidgetFault;
use super::id::VideoId;
use super::widget::{VideoWidget, WidgetFactory, WidgetStatus};

/// Simulated player for one video
#[derive(Debug)]
pub struct SimulatedWidget {
    /// Total length in seconds
    length: f64,
    /// When the widget becomes ready
    ready_at: Instant,
    /// Position when the clock was last anchored
    anchor_position: f64,
    /// Clock anchor while playing, `None` while paused or not started
    anchor: Option<Instant>,
    started: bool,
    /// Fault raised once playback reaches the given position
    fault: Option<(f64, WidgetFault)>,
    destroyed: bool,
}

impl SimulatedWidget {
    pub fn new(length: f64, load_delay: Duration, fault: Option<(f64, WidgetFault)>) -> Self {
        Self {
            length: length.max(0.0),
            ready_at: Instant::now() + load_delay,
            anchor_position: 0.0,
            anchor: None,
            started: false,
            fault,
            destroyed: false,
        }
    }

    fn position(&self) -> f64 {
        let position = match self.anchor {
            Some(anchor) => self.anchor_position + anchor.elapsed().as_secs_f64(),
            None => self.anchor_position,
        };
        position.min(self.length)
    }

    fn freeze(&mut self) {
        self.anchor_position = self.position();
        self.anchor = None;
    }

    fn active_fault(&self) -> Option<&WidgetFault> {
        self.fault.as_ref().filter(|(at, _)| self.position() >= *at).map(|(_, fault)| fault)
    }

    fn ensure_alive(&self) -> Result<(), WidgetFault> {
        if self.destroyed {
            return Err(WidgetFault::new(WidgetFault::PLAYER_FAULT, "widget destroyed"));
        }
        Ok(())
    }
}

#[async_trait]
impl VideoWidget for SimulatedWidget {
    async fn status(&mut self) -> WidgetStatus {
        if self.destroyed {
            return WidgetStatus::Failed(WidgetFault::new(
                WidgetFault::PLAYER_FAULT,
                "widget destroyed",
            ));
        }
        if Instant::now() < self.ready_at {
            return WidgetStatus::Loading;
        }
        if !self.started {
            // Autoplay once loaded
            self.started = true;
            self.anchor = Some(Instant::now());
        }
        if let Some(fault) = self.active_fault() {
            return WidgetStatus::Failed(fault.clone());
        }
        if self.position() >= self.length {
            self.freeze();
        }
        WidgetStatus::Ready { duration: self.length }
    }

    async fn current_time(&mut self) -> Result<f64, WidgetFault> {
        self.ensure_alive()?;
        Ok(self.position())
    }

    async fn pause(&mut self) -> Result<(), WidgetFault> {
        self.ensure_alive()?;
        self.freeze();
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), WidgetFault> {
        self.ensure_alive()?;
        if self.anchor.is_none() && self.position() < self.length {
            self.anchor = Some(Instant::now());
        }
        Ok(())
    }

    async fn destroy(&mut self) {
        self.freeze();
        self.destroyed = true;
    }
}

/// Builds [`SimulatedWidget`]s with a shared configuration
#[derive(Debug, Clone)]
pub struct SimulatedFactory {
    length: f64,
    load_delay: Duration,
    fault: Option<(f64, WidgetFault)>,
}

impl SimulatedFactory {
    pub fn new(length_secs: f64) -> Self {
        Self { length: length_secs, load_delay: Duration::ZERO, fault: None }
    }

    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Fail with `code` once playback reaches `at_secs`
    pub fn with_fault(mut self, at_secs: f64, code: i32) -> Self {
        self.fault = Some((at_secs, WidgetFault::new(code, "simulated fault")));
        self
    }
}

#[async_trait]
impl WidgetFactory for SimulatedFactory {
    async fn create(&self, video_id: &VideoId) -> Result<Box<dyn VideoWidget>, WidgetFault> {
        tracing::debug!("Creating simulated player for {} ({:.0}s)", video_id, self.length);
        Ok(Box::new(SimulatedWidget::new(self.length, self.load_delay, self.fault.clone())))
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn loads_then_plays() {
        let mut widget = SimulatedWidget::new(60.0, Duration::from_secs(2), None);
        assert_eq!(widget.status().await, WidgetStatus::Loading);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(widget.status().await, WidgetStatus::Ready { duration: 60.0 });

        tokio::time::advance(Duration::from_secs(5)).await;
        let t = widget.current_time().await.unwrap();
        assert!((t - 5.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_position() {
        let mut widget = SimulatedWidget::new(60.0, Duration::ZERO, None);
        widget.status().await;
        tokio::time::advance(Duration::from_secs(3)).await;
        widget.pause().await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!((widget.current_time().await.unwrap() - 3.0).abs() < 1e-6);

        widget.resume().await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!((widget.current_time().await.unwrap() - 4.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_end() {
        let mut widget = SimulatedWidget::new(10.0, Duration::ZERO, None);
        widget.status().await;
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(widget.status().await, WidgetStatus::Ready { duration: 10.0 });
        assert_eq!(widget.current_time().await.unwrap(), 10.0);
    }

    #[tokio::test(start_paused = true)]
    async fn fault_fires_at_position() {
        let mut widget = SimulatedWidget::new(
            60.0,
            Duration::ZERO,
            Some((4.0, WidgetFault::new(WidgetFault::NOT_FOUND, "gone"))),
        );
        assert!(matches!(widget.status().await, WidgetStatus::Ready { .. }));
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(matches!(widget.status().await, WidgetStatus::Failed(f) if f.code == 100));
    }

    #[tokio::test(start_paused = true)]
    async fn destroyed_widget_rejects_commands() {
        let mut widget = SimulatedWidget::new(60.0, Duration::ZERO, None);
        widget.destroy().await;
        assert!(widget.pause().await.is_err());
        assert!(matches!(widget.status().await, WidgetStatus::Failed(_)));
    }
}
