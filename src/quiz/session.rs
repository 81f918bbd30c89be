//! Session controller
//!
//! Holds all mutable quiz state and applies the setup, playback, and answer
//! events to it. Children (tracker, question card) only report events; they
//! never mutate the session directly.

use serde_json::Value;

use super::error::QuizError;
use super::item::{AnsweredSet, QuizItem, Score, parse_quiz_items};
use super::provider::{DEFAULT_DURATION_MINUTES, GenerationRequest, QuestionProvider};
use super::scheduler::due_index;
use crate::video::{PlaybackError, VideoId};

/// Which phase the session is in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Collecting URL and topic
    #[default]
    Setup,
    /// Waiting on the question provider
    Generating,
    /// Video running, questions pending
    Playing,
    /// Every question answered; the video may keep running
    Finished,
}

/// Per-question status for the slot list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Upcoming,
    Asking,
    Correct,
    Incorrect,
}

/// Top-level quiz state
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    /// Minutes used to space suggested timestamps
    estimated_minutes: f64,
    /// Video requested by the in-flight generation
    pending_video: Option<VideoId>,
    video_id: Option<VideoId>,
    /// Sorted by timestamp; replaced wholesale on each generation
    items: Vec<QuizItem>,
    answered: AnsweredSet,
    score: Score,
    playback_time: f64,
    video_duration: Option<f64>,
    /// Index into `items` of the question on screen
    active: Option<usize>,
    pause_requested: bool,
    /// Setup-time error shown under the form
    error: Option<String>,
    /// Terminal player error shown as an overlay
    playback_error: Option<PlaybackError>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_MINUTES)
    }
}

impl Session {
    pub fn new(estimated_minutes: f64) -> Self {
        Self {
            state: SessionState::Setup,
            estimated_minutes,
            pending_video: None,
            video_id: None,
            items: Vec::new(),
            answered: AnsweredSet::default(),
            score: Score::default(),
            playback_time: 0.0,
            video_duration: None,
            active: None,
            pause_requested: false,
            error: None,
            playback_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn video_id(&self) -> Option<&VideoId> {
        self.video_id.as_ref()
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    pub fn answered(&self) -> &AnsweredSet {
        &self.answered
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn playback_time(&self) -> f64 {
        self.playback_time
    }

    pub fn video_duration(&self) -> Option<f64> {
        self.video_duration
    }

    pub fn active_question(&self) -> Option<&QuizItem> {
        self.active.map(|i| &self.items[i])
    }

    pub fn pause_requested(&self) -> bool {
        self.pause_requested
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn playback_error(&self) -> Option<&PlaybackError> {
        self.playback_error.as_ref()
    }

    pub fn estimated_minutes(&self) -> f64 {
        self.estimated_minutes
    }

    /// Validate setup input and move to `Generating`.
    /// On failure the message is kept for display and the state stays `Setup`.
    pub fn begin_generation(
        &mut self,
        video_url: &str,
        topic: &str,
        transcript: &str,
    ) -> Result<GenerationRequest, QuizError> {
        if self.state != SessionState::Setup {
            return Err(QuizError::NotInSetup);
        }

        let prepared = VideoId::parse(video_url).and_then(|video_id| {
            GenerationRequest::new(topic, transcript, self.estimated_minutes)
                .map(|request| (video_id, request))
        });

        match prepared {
            Ok((video_id, request)) => {
                tracing::info!("Generating quiz for video {}", video_id);
                self.pending_video = Some(video_id);
                self.error = None;
                self.state = SessionState::Generating;
                Ok(request)
            }
            Err(e) => {
                tracing::info!("Setup rejected: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Apply the provider's result. A valid payload replaces the question
    /// set and starts playback; anything else returns to `Setup` with the
    /// error recorded and the previous question set untouched.
    pub fn finish_generation(&mut self, result: Result<Value, QuizError>) -> Result<(), QuizError> {
        if self.state != SessionState::Generating {
            tracing::debug!("Discarding generation result in state {:?}", self.state);
            return Ok(());
        }

        match result.and_then(parse_quiz_items) {
            Ok(items) => {
                tracing::info!("Quiz ready with {} questions", items.len());
                self.items = items;
                self.answered.clear();
                self.score = Score::default();
                self.active = None;
                self.pause_requested = false;
                self.playback_time = 0.0;
                self.video_duration = None;
                self.playback_error = None;
                self.video_id = self.pending_video.take();
                self.state = SessionState::Playing;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Quiz generation failed: {}", e);
                self.error = Some(e.to_string());
                self.pending_video = None;
                self.state = SessionState::Setup;
                Err(e)
            }
        }
    }

    /// Run a whole generation against `provider`
    pub async fn generate<P>(
        &mut self,
        provider: &P,
        video_url: &str,
        topic: &str,
        transcript: &str,
    ) -> Result<(), QuizError>
    where
        P: QuestionProvider + ?Sized,
    {
        let request = self.begin_generation(video_url, topic, transcript)?;
        let result = provider.generate(&request).await;
        self.finish_generation(result)
    }

    /// Record the player's reported length
    pub fn on_ready(&mut self, duration: f64) {
        self.video_duration = Some(duration);
    }

    /// Record a playback position and activate a due question.
    /// Returns the question that became active on this tick, if any.
    pub fn on_time_update(&mut self, time: f64) -> Option<&QuizItem> {
        self.playback_time = time;

        if self.state != SessionState::Playing || self.active.is_some() {
            return None;
        }

        let index = due_index(time, &self.items, &self.answered)?;
        self.active = Some(index);
        self.pause_requested = true;

        let item = &self.items[index];
        tracing::info!("Question {} due at {:.1}s (t={:.1}s)", item.id, item.timestamp, time);
        Some(item)
    }

    /// Resolve the active question and release the pause.
    /// Returns `false` if no question was active.
    pub fn on_question_complete(&mut self, is_correct: bool) -> bool {
        let Some(index) = self.active.take() else {
            tracing::warn!("Answer reported with no active question");
            return false;
        };
        self.pause_requested = false;

        let id = self.items[index].id.clone();
        if self.answered.record(id.clone(), is_correct) {
            self.score.record(is_correct);
        }
        tracing::info!(
            "Question {} answered {} (score {}/{})",
            id,
            if is_correct { "correctly" } else { "incorrectly" },
            self.score.correct,
            self.score.total
        );

        if self.answered.len() >= self.items.len() {
            tracing::info!("All questions answered");
            self.state = SessionState::Finished;
        }
        true
    }

    /// Record a terminal player error; the learner has to restart
    pub fn on_playback_error(&mut self, error: PlaybackError) {
        tracing::warn!("Playback error: {}", error);
        self.playback_error = Some(error);
    }

    /// Return to setup with a clean slate
    pub fn restart(&mut self) {
        tracing::info!("Restarting session");
        let estimated_minutes = self.estimated_minutes;
        *self = Self::new(estimated_minutes);
    }

    /// Status of every question, in timestamp order
    pub fn slot_statuses(&self) -> Vec<SlotStatus> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| match self.answered.outcome(&item.id) {
                Some(true) => SlotStatus::Correct,
                Some(false) => SlotStatus::Incorrect,
                None if self.active == Some(i) => SlotStatus::Asking,
                None => SlotStatus::Upcoming,
            })
            .collect()
    }
}
