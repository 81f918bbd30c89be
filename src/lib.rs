//! tubequiz - vocabulary quizzes timed to YouTube videos
//!
//! Claude writes a handful of multiple-choice questions for a topic, each
//! bound to a point in the video. The player pauses when one comes due and
//! resumes once the learner has answered.

pub mod app;
pub mod claude;
pub mod config;
pub mod quiz;
pub mod theme;
pub mod ui;
pub mod video;

pub use app::App;
pub use config::Config;
pub use quiz::{Session, SessionState};
pub use theme::Theme;
