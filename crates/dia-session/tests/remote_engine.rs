//! `RemoteEngine` against a mocked HTTP API and a local WebSocket server.

use std::time::Duration;

use dia_config::DialectusConfig;
use dia_db::TranscriptStore;
use dia_session::{
    DebateEngine, EngineApi, EngineError, JudgingError, JudgingPlan, Orchestrator, RemoteEngine,
    SessionError, SessionRequest,
};
use dia_stream::StreamTimeouts;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn timeouts() -> StreamTimeouts {
    StreamTimeouts {
        handshake: Duration::from_secs(2),
        idle: Duration::from_secs(2),
        ping_interval: Duration::from_secs(30),
        close: Duration::from_secs(1),
    }
}

/// Serve one WebSocket connection that plays `frames` and then waits for close.
async fn stream_server(frames: Vec<serde_json::Value>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        for frame in frames {
            ws.send(Message::Text(frame.to_string())).await.unwrap();
        }
        while let Some(Ok(_)) = ws.next().await {}
    });
    format!("ws://{addr}")
}

fn message_frame(speaker: &str, position: &str, round: u32) -> serde_json::Value {
    json!({
        "type": "new_message",
        "message": {
            "speaker_id": speaker,
            "position": position,
            "phase": "opening",
            "round_number": round,
            "content": format!("{speaker} opens the debate"),
            "timestamp": "2025-10-12 10:00:00"
        }
    })
}

async fn mock_setup(server: &MockServer, debate_id: &str) {
    Mock::given(method("POST"))
        .and(path("/api/debates"))
        .and(body_partial_json(json!({"format": "oxford", "word_limit": 200})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": debate_id, "status": "created"})),
        )
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/api/debates/{debate_id}/start")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "started"})))
        .expect(1)
        .mount(server)
        .await;
}

fn engine(server: &MockServer, stream_base: &str) -> RemoteEngine {
    let api = EngineApi::new(&server.uri(), Duration::from_secs(2)).unwrap();
    RemoteEngine::new(api, stream_base, timeouts())
}

#[tokio::test]
async fn remote_session_is_streamed_and_committed() {
    let server = MockServer::start().await;
    mock_setup(&server, "abc123").await;
    let stream_base = stream_server(vec![
        message_frame("model_a", "pro", 1),
        json!({"type": "unknown_future_event"}),
        message_frame("model_b", "con", 1),
        json!({"type": "debate_completed"}),
    ])
    .await;

    let store = TranscriptStore::open_local(":memory:").await.unwrap();
    let engine = engine(&server, &stream_base);
    let request = SessionRequest::from_config(&DialectusConfig::default());

    let mut orchestrator = Orchestrator::new(
        &store,
        &engine,
        JudgingPlan::new(Vec::new(), Duration::from_secs(2)),
    );
    let outcome = orchestrator.run(&request).await.unwrap();

    assert_eq!(outcome.debate_id, "abc123");
    assert_eq!(outcome.message_count, 2);
    let loaded = store.load_session(outcome.session_id).await.unwrap();
    assert_eq!(loaded.messages[1].message.speaker_id, "model_b");
    assert_eq!(loaded.session.participants["model_a"].name, "qwen2.5:7b");
}

#[tokio::test]
async fn create_failure_is_an_init_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/debates"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model pool exhausted"))
        .mount(&server)
        .await;

    let engine = engine(&server, "ws://127.0.0.1:9");
    let request = SessionRequest::from_config(&DialectusConfig::default());
    let Err(err) = engine.start(&request).await else {
        panic!("setup should fail");
    };
    match err {
        EngineError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "model pool exhausted");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_start_is_an_init_error_and_persists_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/debates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d1", "status": "created"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/debates/d1/start"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;
    let stream_base = stream_server(Vec::new()).await;

    let store = TranscriptStore::open_local(":memory:").await.unwrap();
    let engine = engine(&server, &stream_base);
    let request = SessionRequest::from_config(&DialectusConfig::default());
    let mut orchestrator = Orchestrator::new(
        &store,
        &engine,
        JudgingPlan::new(Vec::new(), Duration::from_secs(2)),
    );

    let err = orchestrator.run(&request).await.unwrap_err();
    assert!(
        matches!(err, SessionError::Init(EngineError::Status { status: 409, .. })),
        "{err:?}"
    );
    assert!(err.produced_nothing());
    assert!(store.list_sessions(10, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn judge_missing_from_remote_stream_fails_the_session() {
    let server = MockServer::start().await;
    mock_setup(&server, "judged").await;
    let stream_base = stream_server(vec![
        message_frame("model_a", "pro", 1),
        json!({"type": "judging_started"}),
        json!({"type": "debate_completed"}),
    ])
    .await;

    let store = TranscriptStore::open_local(":memory:").await.unwrap();
    let engine = engine(&server, &stream_base);
    let mut config = DialectusConfig::default();
    config.judging.judge_models = vec!["openthinker:7b".into()];
    config.judging.judge_provider = Some("ollama".into());
    let request = SessionRequest::from_config(&config);

    let mut orchestrator = Orchestrator::new(
        &store,
        &engine,
        JudgingPlan::new(config.judging.judge_models.clone(), Duration::from_secs(2)),
    );
    let err = orchestrator.run(&request).await.unwrap_err();

    assert!(
        matches!(&err, SessionError::Judging(JudgingError::Failed { judge, .. }) if judge == "openthinker:7b"),
        "{err:?}"
    );
    assert!(store.list_sessions(10, 0).await.unwrap().is_empty());
}
