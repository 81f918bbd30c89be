//! Timed vocabulary quiz
//!
//! Questions are generated up front, bound to playback timestamps, and
//! asked one at a time as the video reaches them.

pub mod error;
pub mod item;
pub mod presentation;
pub mod provider;
pub mod scheduler;
pub mod session;

pub use error::QuizError;
pub use item::{AnsweredSet, QUESTION_COUNT, QuizItem, Score, parse_quiz_items};
pub use presentation::{CardPhase, OptionMark, QuestionCard};
pub use provider::{
    ClaudeQuestionProvider, DEFAULT_DURATION_MINUTES, GenerationRequest, QuestionProvider,
    extract_json_array,
};
pub use scheduler::{MATCH_WINDOW_SECS, due_index};
pub use session::{Session, SessionState, SlotStatus};
