//! `WsEventStream` against a local WebSocket server.

use std::future::Future;
use std::time::Duration;

use dia_stream::{DebateEvent, EventSource, StreamError, StreamTimeouts, WsEventStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

fn timeouts() -> StreamTimeouts {
    StreamTimeouts {
        handshake: Duration::from_millis(500),
        idle: Duration::from_millis(400),
        ping_interval: Duration::from_secs(30),
        close: Duration::from_millis(500),
    }
}

/// Accept one connection and run `script` against it.
async fn serve<F, Fut>(script: F) -> String
where
    F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        script(ws).await;
    });
    format!("ws://{addr}/ws/debate/1")
}

fn text(value: &serde_json::Value) -> Message {
    Message::Text(value.to_string())
}

fn opening_message() -> serde_json::Value {
    json!({
        "type": "new_message",
        "message": {
            "speaker_id": "model_a",
            "position": "pro",
            "phase": "opening",
            "round_number": 1,
            "content": "Regulation protects the public.",
            "timestamp": "2025-10-12T10:00:00Z"
        }
    })
}

/// Keep reading so pings and close frames get answered.
async fn drain(ws: &mut WebSocketStream<TcpStream>) {
    while let Some(Ok(_)) = ws.next().await {}
}

#[tokio::test]
async fn reads_events_and_skips_bad_frames() {
    let url = serve(|mut ws| async move {
        ws.send(Message::Text("{broken".into())).await.unwrap();
        ws.send(text(&json!({"type": "typing", "speaker_id": "model_a"})))
            .await
            .unwrap();
        ws.send(text(&opening_message())).await.unwrap();
        ws.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
        ws.send(text(&json!({"type": "judging_started"}))).await.unwrap();
        ws.send(text(&json!({"type": "debate_completed"}))).await.unwrap();
        drain(&mut ws).await;
    })
    .await;

    let mut stream = WsEventStream::connect(&url, timeouts()).await.unwrap();

    let Some(DebateEvent::NewMessage(message)) = stream.next_event().await.unwrap() else {
        panic!("expected the opening message first");
    };
    assert_eq!(message.round_number, 1);
    assert_eq!(
        stream.next_event().await.unwrap(),
        Some(DebateEvent::JudgingStarted)
    );
    assert_eq!(
        stream.next_event().await.unwrap(),
        Some(DebateEvent::DebateCompleted)
    );
    assert_eq!(stream.next_event().await.unwrap(), None);

    stream.close().await.unwrap();
    // Closing twice is a no-op
    stream.close().await.unwrap();
}

#[tokio::test]
async fn close_frame_before_completion_is_reported_with_reason() {
    let url = serve(|mut ws| async move {
        ws.send(text(&opening_message())).await.unwrap();
        ws.close(Some(CloseFrame {
            code: CloseCode::Away,
            reason: "server shutdown".into(),
        }))
        .await
        .unwrap();
        drain(&mut ws).await;
    })
    .await;

    let mut stream = WsEventStream::connect(&url, timeouts()).await.unwrap();
    assert!(stream.next_event().await.unwrap().is_some());

    match stream.next_event().await {
        Err(StreamError::ClosedBeforeCompletion { reason }) => {
            assert_eq!(reason.as_deref(), Some("server shutdown"));
        }
        other => panic!("expected ClosedBeforeCompletion, got {other:?}"),
    }
}

#[tokio::test]
async fn dropped_connection_is_a_disconnect() {
    let url = serve(|mut ws| async move {
        ws.send(text(&opening_message())).await.unwrap();
        drop(ws);
    })
    .await;

    let mut stream = WsEventStream::connect(&url, timeouts()).await.unwrap();
    assert!(stream.next_event().await.unwrap().is_some());

    let err = stream.next_event().await.unwrap_err();
    assert!(matches!(err, StreamError::Disconnected(_)), "{err:?}");
    assert!(!err.is_handshake_failure());
}

#[tokio::test]
async fn silent_server_hits_idle_timeout() {
    let url = serve(|ws| async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(ws);
    })
    .await;

    let mut stream = WsEventStream::connect(&url, timeouts()).await.unwrap();
    let err = stream.next_event().await.unwrap_err();
    assert!(
        matches!(err, StreamError::IdleTimeout(d) if d == Duration::from_millis(400)),
        "{err:?}"
    );
}

#[tokio::test]
async fn pong_replies_keep_a_slow_stream_alive() {
    let url = serve(|mut ws| async move {
        // Answer pings for longer than the idle timeout, then finish
        let _ = tokio::time::timeout(Duration::from_millis(900), drain(&mut ws)).await;
        ws.send(text(&json!({"type": "debate_completed"}))).await.unwrap();
        drain(&mut ws).await;
    })
    .await;

    let mut stream = WsEventStream::connect(
        &url,
        StreamTimeouts {
            ping_interval: Duration::from_millis(100),
            ..timeouts()
        },
    )
    .await
    .unwrap();

    assert_eq!(
        stream.next_event().await.unwrap(),
        Some(DebateEvent::DebateCompleted)
    );
}

#[tokio::test]
async fn unanswered_close_times_out() {
    let url = serve(|mut ws| async move {
        ws.send(text(&json!({"type": "debate_completed"}))).await.unwrap();
        // Hold the socket without reading, so the close frame is never answered
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(ws);
    })
    .await;

    let mut stream = WsEventStream::connect(&url, timeouts()).await.unwrap();
    assert_eq!(
        stream.next_event().await.unwrap(),
        Some(DebateEvent::DebateCompleted)
    );

    let started = std::time::Instant::now();
    let err = stream.close().await.unwrap_err();
    assert!(
        matches!(err, StreamError::CloseTimeout(d) if d == Duration::from_millis(500)),
        "{err:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());
}

#[tokio::test]
async fn unanswered_handshake_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // Accept TCP but never answer the HTTP upgrade
        let (_tcp, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let result = WsEventStream::connect(&format!("ws://{addr}/ws/debate/1"), timeouts()).await;
    let Err(err) = result else {
        panic!("handshake should not succeed");
    };
    assert!(matches!(err, StreamError::HandshakeTimeout { .. }), "{err:?}");
    assert!(err.is_handshake_failure());
}

#[tokio::test]
async fn refused_connection_is_a_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = WsEventStream::connect(&format!("ws://{addr}/ws/debate/1"), timeouts()).await;
    let Err(err) = result else {
        panic!("connection should be refused");
    };
    assert!(matches!(err, StreamError::Connect { .. }), "{err:?}");
}
