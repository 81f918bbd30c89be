//! Playback error classification

use thiserror::Error;

/// Raw fault reported by a video widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetFault {
    /// IFrame-style error code (2, 5, 100, 101, 150, ...)
    pub code: i32,
    /// Backend-specific detail for the log
    pub detail: String,
}

impl WidgetFault {
    /// Invalid parameter
    pub const INVALID_PARAM: i32 = 2;
    /// Player could not decode or play the stream
    pub const PLAYER_FAULT: i32 = 5;
    /// Video removed, private, or not found
    pub const NOT_FOUND: i32 = 100;
    /// Owner disallows embedded playback
    pub const EMBED_RESTRICTED: i32 = 101;
    /// Same as 101, reported by some embeds
    pub const EMBED_RESTRICTED_ALT: i32 = 150;

    pub fn new(code: i32, detail: impl Into<String>) -> Self {
        Self { code, detail: detail.into() }
    }
}

/// Terminal playback failure, classified for display
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The owner does not allow this video to be played outside YouTube
    #[error("This video can't be played here: the owner has restricted playback")]
    Restricted,

    /// Removed, private, or otherwise missing
    #[error("This video is unavailable. It may have been removed or made private")]
    Unavailable,

    /// Anything else the player could not recover from
    #[error("The video failed to play (error {code}). Try a different video")]
    Generic {
        /// Underlying widget code
        code: i32,
    },
}

impl PlaybackError {
    /// Map a widget error code to a category
    pub fn classify(code: i32) -> Self {
        match code {
            WidgetFault::EMBED_RESTRICTED | WidgetFault::EMBED_RESTRICTED_ALT => Self::Restricted,
            WidgetFault::NOT_FOUND => Self::Unavailable,
            code => Self::Generic { code },
        }
    }
}

impl From<&WidgetFault> for PlaybackError {
    fn from(fault: &WidgetFault) -> Self {
        Self::classify(fault.code)
    }
}
