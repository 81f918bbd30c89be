//! Question generation
//!
//! A [`QuestionProvider`] returns the raw payload for a topic; validation
//! happens in [`parse_quiz_items`](super::item::parse_quiz_items) so a
//! provider never has to be trusted.

use async_trait::async_trait;
use serde_json::Value;

use super::error::QuizError;
use super::item::QUESTION_COUNT;
use crate::claude::{ApiKeyManager, ClaudeClient, ClaudeModel, CreateMessageRequest, Message};

/// Assumed video length when the caller has no better estimate
pub const DEFAULT_DURATION_MINUTES: f64 = 15.0;

/// Transcript text beyond this is dropped from the prompt
pub const MAX_TRANSCRIPT_CHARS: usize = 12_000;

/// Where the questions should fall, as fractions of the video length
const OFFSET_FRACTIONS: [f64; QUESTION_COUNT] = [0.1, 0.3, 0.5, 0.7, 0.9];

const SYSTEM_PROMPT: &str = "You write vocabulary quizzes for language learners who are \
watching a video. You reply with a JSON array only, no prose and no code fences.";

/// Input to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub topic: String,
    /// May be empty
    pub transcript: String,
    pub duration_minutes: f64,
}

impl GenerationRequest {
    /// Build a request. A blank topic is rejected; a non-positive or
    /// non-finite duration falls back to [`DEFAULT_DURATION_MINUTES`].
    pub fn new(
        topic: impl Into<String>,
        transcript: impl Into<String>,
        duration_minutes: f64,
    ) -> Result<Self, QuizError> {
        let topic = topic.into().trim().to_string();
        if topic.is_empty() {
            return Err(QuizError::EmptyTopic);
        }

        let duration_minutes = if duration_minutes.is_finite() && duration_minutes > 0.0 {
            duration_minutes
        } else {
            DEFAULT_DURATION_MINUTES
        };

        Ok(Self { topic, transcript: transcript.into().trim().to_string(), duration_minutes })
    }

    /// Suggested question timestamps in whole seconds
    pub fn suggested_offsets(&self) -> [f64; QUESTION_COUNT] {
        let total = self.duration_minutes * 60.0;
        OFFSET_FRACTIONS.map(|fraction| (total * fraction).round())
    }

    /// Transcript clipped to [`MAX_TRANSCRIPT_CHARS`] on a char boundary
    fn transcript_excerpt(&self) -> &str {
        match self.transcript.char_indices().nth(MAX_TRANSCRIPT_CHARS) {
            Some((byte_idx, _)) => &self.transcript[..byte_idx],
            None => &self.transcript,
        }
    }

    /// User prompt sent to the model
    pub fn prompt(&self) -> String {
        let offsets = self
            .suggested_offsets()
            .iter()
            .map(|s| format!("{}", *s as u64))
            .collect::<Vec<_>>()
            .join(", ");

        let transcript = if self.transcript.is_empty() {
            "No transcript is available; base the questions on the topic.".to_string()
        } else {
            format!("Transcript of the video:\n\"\"\"\n{}\n\"\"\"", self.transcript_excerpt())
        };

        format!(
            "Create exactly {count} multiple-choice vocabulary questions about \"{topic}\" for a \
video of about {minutes} minutes.\n\n\
{transcript}\n\n\
Place the questions close to these timestamps (seconds): {offsets}.\n\n\
Return a JSON array of {count} objects with these fields:\n\
- \"id\": unique string such as \"q1\"\n\
- \"timestamp\": number of seconds into the video\n\
- \"question\": the question text\n\
- \"options\": array of 4 answer strings\n\
- \"correctAnswerIndex\": zero-based index of the correct option\n\
- \"feedback\": one or two sentences explaining the answer\n\
- \"verbFocus\": the word or phrase being tested",
            count = QUESTION_COUNT,
            topic = self.topic,
            minutes = self.duration_minutes,
            transcript = transcript,
            offsets = offsets,
        )
    }
}

/// Source of quiz payloads
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Generate questions for `request`. The returned value is untrusted.
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, QuizError>;
}

/// Provider backed by Claude's messages API
pub struct ClaudeQuestionProvider {
    /// `None` when no credential is configured
    client: Option<ClaudeClient>,
    model: ClaudeModel,
}

impl ClaudeQuestionProvider {
    pub fn new(api_key: Option<String>, model: ClaudeModel) -> Result<Self, QuizError> {
        let client = api_key.map(ClaudeClient::new).transpose()?;
        Ok(Self { client, model })
    }

    /// Use the key from the environment or keyring, if any
    pub fn from_environment(model: ClaudeModel) -> Result<Self, QuizError> {
        Self::new(ApiKeyManager::resolve_optional(), model)
    }

    pub fn has_credential(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl QuestionProvider for ClaudeQuestionProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, QuizError> {
        let client = self.client.as_ref().ok_or(QuizError::MissingCredential)?;

        tracing::info!(
            "Generating {} questions on {:?} with {}",
            QUESTION_COUNT,
            request.topic,
            self.model.display_name()
        );

        // Prefilling the reply with "[" keeps the model on a bare array
        let message_request = CreateMessageRequest::new(
            self.model,
            vec![Message::user(request.prompt()), Message::assistant("[")],
        )
        .with_system(SYSTEM_PROMPT)
        .with_max_tokens(2048)
        .with_temperature(0.4);

        let text = client.send_text(&message_request).await?;
        extract_json_array(&format!("[{}", text))
    }
}

/// Find the first JSON array in free-form model output
pub fn extract_json_array(text: &str) -> Result<Value, QuizError> {
    for (start, _) in text.match_indices('[') {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        if let Some(Ok(value @ Value::Array(_))) = values.next() {
            return Ok(value);
        }
    }
    Err(QuizError::Generation("response contained no JSON array".to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn offsets_follow_duration() {
        let request = GenerationRequest::new("phrasal verbs", "", 15.0).unwrap();
        assert_eq!(request.suggested_offsets(), [90.0, 270.0, 450.0, 630.0, 810.0]);

        let short = GenerationRequest::new("cooking", "", 2.0).unwrap();
        assert_eq!(short.suggested_offsets(), [12.0, 36.0, 60.0, 84.0, 108.0]);
    }

    #[test]
    fn invalid_duration_uses_default() {
        for minutes in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let request = GenerationRequest::new("travel", "", minutes).unwrap();
            assert_eq!(request.duration_minutes, DEFAULT_DURATION_MINUTES);
        }
    }

    #[test]
    fn blank_topic_rejected() {
        assert!(matches!(GenerationRequest::new("   ", "text", 10.0), Err(QuizError::EmptyTopic)));
    }

    #[test]
    fn prompt_mentions_topic_offsets_and_transcript() {
        let request = GenerationRequest::new("kitchen verbs", "Chop the onions.", 10.0).unwrap();
        let prompt = request.prompt();
        assert!(prompt.contains("kitchen verbs"));
        assert!(prompt.contains("60, 180, 300, 420, 540"));
        assert!(prompt.contains("Chop the onions."));
        assert!(prompt.contains("correctAnswerIndex"));
    }

    #[test]
    fn long_transcript_is_clipped() {
        let transcript = "é".repeat(MAX_TRANSCRIPT_CHARS + 500);
        let request = GenerationRequest::new("t", transcript, 10.0).unwrap();
        assert_eq!(request.transcript_excerpt().chars().count(), MAX_TRANSCRIPT_CHARS);
    }

    #[test]
    fn extracts_array_from_noisy_text() {
        let text = "Sure! [not json] here you go:\n```json\n[{\"id\":\"q1\"}]\n```";
        assert_eq!(extract_json_array(text).unwrap(), json!([{"id": "q1"}]));
    }

    #[test]
    fn extracts_prefilled_array() {
        let text = format!("[{}", r#"{"id":"a"},{"id":"b"}] trailing words"#);
        assert_eq!(extract_json_array(&text).unwrap(), json!([{"id": "a"}, {"id": "b"}]));
    }

    #[test]
    fn missing_array_is_generation_error() {
        assert!(matches!(
            extract_json_array("no questions today"),
            Err(QuizError::Generation(_))
        ));
        assert!(matches!(extract_json_array("[1, 2"), Err(QuizError::Generation(_))));
    }

    #[tokio::test]
    async fn missing_credential_fails_before_any_request() {
        let provider = ClaudeQuestionProvider::new(None, ClaudeModel::default()).unwrap();
        assert!(!provider.has_credential());
        let request = GenerationRequest::new("weather", "", 5.0).unwrap();
        assert!(matches!(provider.generate(&request).await, Err(QuizError::MissingCredential)));
    }
}
