//! Application state definitions

use crate::quiz::{QuestionCard, Session, SessionState};
use crate::video::TrackerEvent;

/// Which screen is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Setup form, also shown while generating
    Setup,
    /// Player view with timeline and questions
    Playing,
}

impl Screen {
    pub fn for_session(state: SessionState) -> Self {
        match state {
            SessionState::Setup | SessionState::Generating => Screen::Setup,
            SessionState::Playing | SessionState::Finished => Screen::Playing,
        }
    }
}

/// Fields on the setup form, in tab order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetupField {
    #[default]
    Url,
    Topic,
    Transcript,
}

impl SetupField {
    pub const ALL: [SetupField; 3] = [SetupField::Url, SetupField::Topic, SetupField::Transcript];

    pub fn label(self) -> &'static str {
        match self {
            SetupField::Url => "YouTube URL",
            SetupField::Topic => "Topic",
            SetupField::Transcript => "Transcript (optional)",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SetupField::Url => SetupField::Topic,
            SetupField::Topic => SetupField::Transcript,
            SetupField::Transcript => SetupField::Url,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SetupField::Url => SetupField::Transcript,
            SetupField::Topic => SetupField::Url,
            SetupField::Transcript => SetupField::Topic,
        }
    }
}

/// Single-line text input with a character cursor
#[derive(Debug, Clone, Default)]
pub struct TextField {
    /// Input buffer
    pub input: String,
    /// Cursor position as a character index
    pub cursor: usize,
}

impl TextField {
    pub fn with_text(text: impl Into<String>) -> Self {
        let input = text.into();
        let cursor = input.chars().count();
        Self { input, cursor }
    }

    /// Convert character index to byte index
    fn char_to_byte_index(&self, char_idx: usize) -> usize {
        self.input.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(self.input.len())
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    /// Insert a character at cursor
    pub fn insert_char(&mut self, c: char) {
        let byte_idx = self.char_to_byte_index(self.cursor);
        self.input.insert(byte_idx, c);
        self.cursor += 1;
    }

    /// Insert pasted text at cursor; line breaks become spaces
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\r' => {}
                '\n' | '\t' => self.insert_char(' '),
                c => self.insert_char(c),
            }
        }
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.input.remove(byte_idx);
        }
    }

    /// Delete character at cursor
    pub fn delete_char_forward(&mut self) {
        if self.cursor < self.char_count() {
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.input.remove(byte_idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }
}

/// The three setup inputs and which one has focus
#[derive(Debug, Clone, Default)]
pub struct SetupForm {
    pub url: TextField,
    pub topic: TextField,
    pub transcript: TextField,
    pub focused: SetupField,
}

impl SetupForm {
    pub fn field(&self, field: SetupField) -> &TextField {
        match field {
            SetupField::Url => &self.url,
            SetupField::Topic => &self.topic,
            SetupField::Transcript => &self.transcript,
        }
    }

    pub fn focused_mut(&mut self) -> &mut TextField {
        match self.focused {
            SetupField::Url => &mut self.url,
            SetupField::Topic => &mut self.topic,
            SetupField::Transcript => &mut self.transcript,
        }
    }

    pub fn focus_next(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn focus_prev(&mut self) {
        self.focused = self.focused.prev();
    }
}

/// Full application state
#[derive(Debug, Default)]
pub struct AppState {
    pub session: Session,

    pub form: SetupForm,

    /// Card for the active question, if one is on screen
    pub card: Option<QuestionCard>,

    /// Last pause state the player confirmed
    pub player_paused: bool,

    /// Player has reported its duration
    pub player_ready: bool,

    /// Transient notice shown in the footer
    pub notice: Option<String>,

    /// Frame counter for the generating spinner
    pub tick: usize,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self { session, ..Self::default() }
    }

    pub fn screen(&self) -> Screen {
        Screen::for_session(self.session.state())
    }

    /// Feed one tracker event into the session
    pub fn apply_tracker_event(&mut self, event: TrackerEvent) {
        match event {
            TrackerEvent::Ready { duration } => {
                self.player_ready = true;
                self.session.on_ready(duration);
            }
            TrackerEvent::TimeUpdate(time) => {
                if let Some(item) = self.session.on_time_update(time) {
                    self.card = Some(QuestionCard::new(item.clone()));
                }
            }
            TrackerEvent::Paused => self.player_paused = true,
            TrackerEvent::Resumed => self.player_paused = false,
            TrackerEvent::Error(error) => self.session.on_playback_error(error),
        }
    }

    /// Close a submitted card and report its outcome.
    /// Returns `false` if there was nothing to continue from.
    pub fn continue_question(&mut self) -> bool {
        let Some(correct) = self.card.as_mut().and_then(QuestionCard::finish) else {
            return false;
        };
        self.card = None;
        self.session.on_question_complete(correct)
    }

    /// Submit the highlighted option, or continue once feedback is showing
    pub fn select_or_continue(&mut self) {
        if self.card.as_ref().is_some_and(QuestionCard::is_submitted) {
            self.continue_question();
        } else if let Some(card) = self.card.as_mut() {
            card.submit_highlighted();
        }
    }

    /// Back to the setup form; the form keeps its text
    pub fn restart(&mut self) {
        self.session.restart();
        self.card = None;
        self.player_paused = false;
        self.player_ready = false;
        self.notice = None;
    }
}
