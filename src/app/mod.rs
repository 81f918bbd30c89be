//! Application state and event handling

pub mod input;
pub mod state;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde_json::Value;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::config::{Config, PlayerBackend};
use crate::quiz::{QuestionProvider, QuizError, Session, SessionState};
use crate::ui;
use crate::video::{PlaybackTracker, SimulatedFactory, WidgetFactory};
use input::{Action, FormAction};
use state::{AppState, Screen, TextField};

/// Pick the player backend named in the config
pub fn player_factory(config: &Config) -> Arc<dyn WidgetFactory> {
    match config.player {
        #[cfg(unix)]
        PlayerBackend::Mpv => Arc::new(crate::video::mpv::MpvFactory::new(config.mpv_path.clone())),
        #[cfg(not(unix))]
        PlayerBackend::Mpv => {
            tracing::warn!("mpv backend needs a unix socket; using the simulated player");
            Arc::new(SimulatedFactory::new(config.simulated_secs()))
        }
        PlayerBackend::Simulated => Arc::new(SimulatedFactory::new(config.simulated_secs())),
    }
}

/// The main application
pub struct App {
    /// Application configuration
    config: Config,

    /// Current application state
    state: AppState,

    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,

    provider: Arc<dyn QuestionProvider>,

    factory: Arc<dyn WidgetFactory>,

    /// Player for the current quiz
    tracker: Option<PlaybackTracker>,

    /// In-flight generation result
    pending: Option<oneshot::Receiver<Result<Value, QuizError>>>,
}

impl App {
    /// Create a new application instance
    pub fn new(
        config: Config,
        provider: Arc<dyn QuestionProvider>,
        factory: Arc<dyn WidgetFactory>,
    ) -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        let state = AppState::new(Session::new(config.estimated_minutes));

        Ok(Self { config, state, terminal, provider, factory, tracker: None, pending: None })
    }

    /// Prefill the transcript field
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.state.form.transcript = TextField::with_text(transcript);
        self
    }

    /// Set up the terminal for TUI rendering
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore the terminal to its original state
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> Result<()> {
        // Set up panic hook to restore terminal
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        let theme = self.config.active_theme();

        loop {
            self.poll_generation().await;
            self.drain_tracker_events();

            // Pause follows the session; the tracker drops repeats
            if let Some(tracker) = &self.tracker {
                tracker.request_pause(self.state.session.pause_requested());
            }

            // Draw UI
            self.terminal.draw(|frame| {
                ui::draw(frame, &self.state, &theme);
            })?;

            // Handle events
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        match self.handle_key(key).await {
                            Ok(true) => break, // Exit requested
                            Ok(false) => {}
                            Err(e) => {
                                tracing::error!("Error handling key: {}", e);
                            }
                        }
                    }
                }
            }

            self.state.tick = self.state.tick.wrapping_add(1);
        }

        if let Some(tracker) = self.tracker.take() {
            tracker.shutdown().await;
        }
        self.restore_terminal()?;
        Ok(())
    }

    /// Pick up a finished generation and start the player
    async fn poll_generation(&mut self) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => {
                Err(QuizError::Generation("generation task ended unexpectedly".to_string()))
            }
        };
        self.pending = None;

        // Failure is recorded on the session and shown on the form
        if self.state.session.finish_generation(result).is_err() {
            return;
        }

        let Some(video_id) = self.state.session.video_id().cloned() else {
            return;
        };
        match self.tracker.as_mut() {
            Some(tracker) => tracker.rebind(video_id).await,
            None => {
                self.tracker = Some(PlaybackTracker::spawn(Arc::clone(&self.factory), video_id));
            }
        }
    }

    fn drain_tracker_events(&mut self) {
        let Some(tracker) = self.tracker.as_mut() else {
            return;
        };
        while let Some(event) = tracker.try_next_event() {
            tracing::trace!("Tracker event: {:?}", event);
            self.state.apply_tracker_event(event);
        }
    }

    /// Handle a key press, returns true if should exit
    async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.state.screen() {
            Screen::Setup => Ok(self.handle_form_key(key)),
            Screen::Playing => self.handle_player_key(key).await,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> bool {
        let Some(action) = input::form_key_to_action(key.code, key.modifiers) else {
            return false;
        };

        if action == FormAction::Quit {
            return true;
        }
        // Form is locked while a quiz is generated
        if self.state.session.state() == SessionState::Generating {
            return false;
        }

        let form = &mut self.state.form;
        match action {
            FormAction::Insert(c) => form.focused_mut().insert_char(c),
            FormAction::DeleteBack => form.focused_mut().delete_char(),
            FormAction::DeleteForward => form.focused_mut().delete_char_forward(),
            FormAction::Left => form.focused_mut().move_left(),
            FormAction::Right => form.focused_mut().move_right(),
            FormAction::Home => form.focused_mut().move_start(),
            FormAction::End => form.focused_mut().move_end(),
            FormAction::Clear => form.focused_mut().clear(),
            FormAction::NextField => form.focus_next(),
            FormAction::PrevField => form.focus_prev(),
            FormAction::Paste => self.paste(),
            FormAction::Submit => self.submit_form(),
            FormAction::Quit => {}
        }
        false
    }

    /// Paste clipboard text into the focused field
    fn paste(&mut self) {
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text()) {
            Ok(text) => {
                self.state.form.focused_mut().insert_str(text.trim());
                self.state.notice = None;
            }
            Err(e) => {
                tracing::warn!("Clipboard read failed: {}", e);
                self.state.notice = Some(format!("Couldn't read the clipboard: {}", e));
            }
        }
    }

    /// Validate the form and start generating in the background
    fn submit_form(&mut self) {
        let form = &self.state.form;
        let request = match self.state.session.begin_generation(
            &form.url.input,
            &form.topic.input,
            &form.transcript.input,
        ) {
            Ok(request) => request,
            // Error is kept on the session for the form to show
            Err(_) => return,
        };

        let provider = Arc::clone(&self.provider);
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(provider.generate(&request).await);
        });
        self.pending = Some(rx);
        self.state.notice = None;
    }

    async fn handle_player_key(&mut self, key: KeyEvent) -> Result<bool> {
        let Some(action) = input::key_with_modifier_to_action(key.code, key.modifiers) else {
            return Ok(false);
        };

        match action {
            Action::Quit => return Ok(true),
            Action::Restart => self.restart().await,
            Action::Up => {
                if let Some(card) = self.state.card.as_mut() {
                    card.move_up();
                }
            }
            Action::Down => {
                if let Some(card) = self.state.card.as_mut() {
                    card.move_down();
                }
            }
            Action::Choose(index) => {
                if let Some(card) = self.state.card.as_mut() {
                    card.select(index);
                }
            }
            Action::Select => self.state.select_or_continue(),
        }
        Ok(false)
    }

    /// Tear down the player and return to setup
    async fn restart(&mut self) {
        // A late generation result would otherwise land in the new session
        self.pending = None;
        if let Some(tracker) = self.tracker.take() {
            tracker.shutdown().await;
        }
        self.state.restart();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_backend_uses_simulated_factory() {
        let config = Config { player: PlayerBackend::Simulated, ..Config::default() };
        assert_eq!(player_factory(&config).name(), "simulated");
    }

    #[cfg(unix)]
    #[test]
    fn mpv_backend_uses_mpv_factory() {
        let config = Config::default();
        assert_eq!(player_factory(&config).name(), "mpv");
    }
}
