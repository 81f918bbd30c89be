//! Video identifier extraction from YouTube URLs

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::quiz::QuizError;

/// Path and query shapes that carry an identifier:
/// `watch?v=`, `&v=`, `youtu.be/`, `embed/`, `v/`, `u/<x>/`, `shorts/`
static URL_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:youtu\.be/|/embed/|/v/|/u/\w/|/shorts/|[?&]v=)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    )
    .unwrap()
});

static BARE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// Opaque 11-character token identifying one video
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Extract the identifier from any supported URL shape, or accept a bare id
    pub fn parse(input: &str) -> Result<Self, QuizError> {
        let input = input.trim();

        if BARE_ID_RE.is_match(input) {
            return Ok(Self(input.to_string()));
        }

        URL_ID_RE
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
            .ok_or_else(|| QuizError::InvalidUrl(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL, used by players that take a URL
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for VideoId {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
