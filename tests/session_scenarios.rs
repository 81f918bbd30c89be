//! End-to-end session flows driven through a scripted question provider

use std::sync::Mutex;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tubequiz::claude::ClaudeModel;
use tubequiz::quiz::{
    ClaudeQuestionProvider, GenerationRequest, QuestionCard, QuestionProvider, QuizError, Score,
    Session, SessionState,
};

const URL: &str = "https://www.youtube.com/watch?v=M7lc1UVf-VE&t=42s";

/// Replies with a fixed payload and remembers what it was asked
struct ScriptedProvider {
    payload: Value,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    fn new(payload: Value) -> Self {
        Self { payload, requests: Mutex::new(Vec::new()) }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl QuestionProvider for ScriptedProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, QuizError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.payload.clone())
    }
}

fn quiz(timestamps: [f64; 5]) -> Value {
    Value::Array(
        timestamps
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                json!({
                    "id": format!("q{}", i + 1),
                    "timestamp": t,
                    "question": format!("Which verb fits sentence {}?", i + 1),
                    "options": ["make", "do", "take", "have"],
                    "correctAnswerIndex": 2,
                    "feedback": "We say 'take a break'.",
                    "verbFocus": "take"
                })
            })
            .collect(),
    )
}

async fn started(timestamps: [f64; 5]) -> Session {
    let provider = ScriptedProvider::new(quiz(timestamps));
    let mut session = Session::new(10.0);
    session.generate(&provider, URL, "collocations", "").await.unwrap();
    session
}

#[tokio::test]
async fn generate_binds_video_and_sorts_questions() {
    let provider = ScriptedProvider::new(quiz([540.0, 60.0, 300.0, 180.0, 420.0]));
    let mut session = Session::new(10.0);

    session.generate(&provider, URL, "collocations", "Take a seat.").await.unwrap();

    assert_eq!(session.state(), SessionState::Playing);
    assert_eq!(session.video_id().unwrap().as_str(), "M7lc1UVf-VE");
    let timestamps: Vec<f64> = session.items().iter().map(|i| i.timestamp).collect();
    assert_eq!(timestamps, vec![60.0, 180.0, 300.0, 420.0, 540.0]);

    let requests = provider.requests.lock().unwrap();
    assert_eq!(requests[0].topic, "collocations");
    assert_eq!(requests[0].transcript, "Take a seat.");
    assert_eq!(requests[0].suggested_offsets(), [60.0, 180.0, 300.0, 420.0, 540.0]);
}

#[tokio::test]
async fn invalid_url_never_reaches_provider() {
    let provider = ScriptedProvider::new(quiz([1.0, 2.0, 3.0, 4.0, 5.0]));
    let mut session = Session::default();

    let err = session.generate(&provider, "https://vimeo.com/12345", "verbs", "").await;

    assert!(matches!(err, Err(QuizError::InvalidUrl(_))));
    assert_eq!(provider.calls(), 0);
    assert_eq!(session.state(), SessionState::Setup);
}

#[tokio::test]
async fn question_activates_once_inside_window() {
    let mut session = started([10.0, 100.0, 200.0, 300.0, 400.0]).await;

    let mut activations = Vec::new();
    for t in [0.0, 5.0, 10.0, 10.4] {
        if let Some(item) = session.on_time_update(t) {
            activations.push((t, item.id.clone()));
        }
    }

    assert_eq!(activations, vec![(10.0, "q1".to_string())]);
    assert!(session.pause_requested());
}

#[tokio::test]
async fn correct_answer_flows_back_to_score() {
    let mut session = started([10.0, 100.0, 200.0, 300.0, 400.0]).await;
    let before = session.score();

    let item = session.on_time_update(10.0).cloned().unwrap();
    let mut card = QuestionCard::new(item);
    assert!(card.select(2));
    let is_correct = card.finish().unwrap();
    assert!(is_correct);

    assert!(session.on_question_complete(is_correct));
    assert_eq!(
        session.score(),
        Score { correct: before.correct + 1, total: before.total + 1 }
    );
    assert!(!session.pause_requested());
}

#[tokio::test]
async fn answered_question_never_returns() {
    let mut session = started([10.0, 100.0, 200.0, 300.0, 400.0]).await;
    session.on_time_update(10.0);
    session.on_question_complete(false);

    // Seeking back over the same spot
    for t in [8.5, 9.0, 10.0, 11.0, 11.5, 10.0] {
        assert!(session.on_time_update(t).is_none());
    }
    assert_eq!(session.score(), Score { correct: 0, total: 1 });
}

#[tokio::test]
async fn questions_come_in_timestamp_order() {
    let mut session = started([250.0, 50.0, 150.0, 350.0, 450.0]).await;

    let mut seen = Vec::new();
    let mut t = 0.0;
    while t < 500.0 {
        if let Some(item) = session.on_time_update(t) {
            seen.push(item.timestamp);
            session.on_question_complete(true);
        }
        t += 0.5;
    }

    assert_eq!(seen, vec![50.0, 150.0, 250.0, 350.0, 450.0]);
    assert_eq!(session.state(), SessionState::Finished);
    assert_eq!(session.score(), Score { correct: 5, total: 5 });
}

#[tokio::test]
async fn restart_after_playing_resets_session() {
    let mut session = started([10.0, 100.0, 200.0, 300.0, 400.0]).await;
    session.on_time_update(100.0);
    session.on_question_complete(true);

    session.restart();

    assert_eq!(session.state(), SessionState::Setup);
    assert_eq!(session.score(), Score { correct: 0, total: 0 });
    assert!(session.answered().is_empty());
    assert!(session.items().is_empty());
    assert!(session.active_question().is_none());
    assert_eq!(session.estimated_minutes(), 10.0);
}

#[tokio::test]
async fn missing_credential_keeps_setup() {
    let provider = ClaudeQuestionProvider::new(None, ClaudeModel::default()).unwrap();
    let mut session = Session::default();

    let result = session.generate(&provider, URL, "phrasal verbs", "").await;

    assert!(matches!(result, Err(QuizError::MissingCredential)));
    assert_eq!(session.state(), SessionState::Setup);
    assert!(session.error().unwrap().contains("Missing credential"));
    assert!(session.items().is_empty());
    assert!(session.video_id().is_none());
}

#[tokio::test]
async fn malformed_payload_is_rejected() {
    let provider = ScriptedProvider::new(json!([{"id": "q1", "timestamp": 5}]));
    let mut session = Session::default();

    let result = session.generate(&provider, URL, "verbs", "").await;

    assert!(matches!(result, Err(QuizError::Generation(_))));
    assert_eq!(session.state(), SessionState::Setup);
    assert!(session.items().is_empty());
}

#[tokio::test]
async fn regenerate_after_restart_replaces_questions() {
    let mut session = started([10.0, 100.0, 200.0, 300.0, 400.0]).await;
    session.restart();

    let provider = ScriptedProvider::new(quiz([20.0, 40.0, 60.0, 80.0, 99.0]));
    session.generate(&provider, "https://youtu.be/M7lc1UVf-VE", "verbs", "").await.unwrap();

    assert_eq!(session.items()[4].timestamp, 99.0);
    assert_eq!(session.score(), Score::default());
}
