//! Errors surfaced by quiz setup and generation

use thiserror::Error;

use crate::claude::ClaudeError;

/// Errors the session controller reports back to the setup screen
#[derive(Debug, Error)]
pub enum QuizError {
    /// No 11-character video identifier in the input
    #[error("Couldn't find a YouTube video id in \"{0}\"")]
    InvalidUrl(String),

    /// Topic field left blank
    #[error("Enter a topic to build the quiz around")]
    EmptyTopic,

    /// Provider called without an API key
    #[error("Missing credential: no Claude API key configured. Run `tubequiz key set <KEY>` or set ANTHROPIC_API_KEY")]
    MissingCredential,

    /// Provider unreachable, or its response did not have the quiz shape
    #[error("Question generation failed: {0}")]
    Generation(String),

    /// Operation requires the setup screen
    #[error("A quiz is already in progress; restart first")]
    NotInSetup,
}

impl From<ClaudeError> for QuizError {
    fn from(err: ClaudeError) -> Self {
        match err {
            ClaudeError::ApiKeyNotFound => QuizError::MissingCredential,
            other => QuizError::Generation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_maps_to_missing_credential() {
        assert!(matches!(QuizError::from(ClaudeError::ApiKeyNotFound), QuizError::MissingCredential));
    }

    #[test]
    fn api_failures_map_to_generation() {
        let err = QuizError::from(ClaudeError::ApiError { status: 500, message: "boom".into() });
        match err {
            QuizError::Generation(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_credential_message_names_the_problem() {
        assert!(QuizError::MissingCredential.to_string().contains("Missing credential"));
    }
}
