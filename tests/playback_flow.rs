//! Session and tracker wired together against the simulated player

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tubequiz::quiz::{MATCH_WINDOW_SECS, Session, SessionState};
use tubequiz::video::{PlaybackError, PlaybackTracker, SimulatedFactory, TrackerEvent, WidgetFault};

fn session_with(timestamps: [f64; 5]) -> Session {
    let mut session = Session::new(1.0);
    session.begin_generation("https://www.youtube.com/embed/dQw4w9WgXcQ", "weather", "").unwrap();
    let payload: Vec<_> = timestamps
        .iter()
        .enumerate()
        .map(|(i, t)| {
            json!({
                "id": i,
                "timestamp": t,
                "question": "It's ___ outside.",
                "options": ["rain", "raining", "rained"],
                "correctAnswerIndex": 1,
                "feedback": "Present progressive."
            })
        })
        .collect();
    session.finish_generation(Ok(json!(payload))).unwrap();
    session
}

#[tokio::test(start_paused = true)]
async fn video_pauses_for_each_question_and_finishes() {
    let timestamps = [5.0, 15.0, 25.0, 35.0, 45.0];
    let mut session = session_with(timestamps);
    let video_id = session.video_id().cloned().unwrap();
    let mut tracker = PlaybackTracker::spawn(Arc::new(SimulatedFactory::new(60.0)), video_id);

    let mut activations = Vec::new();
    let mut paused = 0;
    let mut ticks_while_asking = 0;

    while session.state() != SessionState::Finished {
        match tracker.next_event().await.expect("tracker ended early") {
            TrackerEvent::Paused => paused += 1,
            TrackerEvent::TimeUpdate(_) if session.active_question().is_some() => {
                ticks_while_asking += 1;
                if ticks_while_asking == 4 {
                    ticks_while_asking = 0;
                    session.on_question_complete(true);
                    tracker.request_pause(session.pause_requested());
                }
            }
            TrackerEvent::TimeUpdate(t) => {
                if session.on_time_update(t).is_some() {
                    activations.push(t);
                    tracker.request_pause(session.pause_requested());
                }
            }
            _ => {}
        }
    }

    assert_eq!(activations.len(), 5);
    for (at, expected) in activations.iter().zip(timestamps) {
        assert!((at - expected).abs() <= MATCH_WINDOW_SECS, "{at} vs {expected}");
    }
    assert_eq!(paused, 5);
    assert_eq!(session.score().correct, 5);

    tracker.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn restricted_video_surfaces_as_playback_error() {
    let mut session = session_with([5.0, 15.0, 25.0, 35.0, 45.0]);
    let video_id = session.video_id().cloned().unwrap();
    let factory = SimulatedFactory::new(60.0).with_fault(2.0, WidgetFault::EMBED_RESTRICTED_ALT);
    let mut tracker = PlaybackTracker::spawn(Arc::new(factory), video_id);

    while let Some(event) = tracker.next_event().await {
        match event {
            TrackerEvent::TimeUpdate(t) => {
                session.on_time_update(t);
            }
            TrackerEvent::Error(error) => session.on_playback_error(error),
            _ => {}
        }
    }

    assert_eq!(session.playback_error(), Some(&PlaybackError::Restricted));
    assert!(session.playback_time() < 2.0);
    tracker.shutdown().await;
}
