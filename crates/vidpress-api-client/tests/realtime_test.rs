//! Realtime channel tests against an in-process Socket.IO-speaking WebSocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use vidpress_api_client::{RealtimeClient, RealtimeEvent};
use vidpress_core::Percentage;

const OPEN_FRAME: &str =
    r#"0{"sid":"test-sid","upgrades":[],"pingInterval":300,"pingTimeout":200,"maxPayload":1000000}"#;

/// Start a server that runs `script` against the first accepted client.
/// Returns the http origin to hand to `RealtimeClient::new`.
async fn start_server<F, Fut>(script: F) -> String
where
    F: FnOnce(tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        script(ws).await;
    });
    format!("http://{}:{}", addr.ip(), addr.port())
}

async fn next_text(ws: &mut tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>) -> String {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
            Some(Ok(_)) => continue,
            other => panic!("unexpected ws frame: {:?}", other),
        }
    }
}

async fn next_event(conn: &mut vidpress_api_client::RealtimeConnection) -> RealtimeEvent {
    tokio::time::timeout(Duration::from_secs(5), conn.next_event())
        .await
        .expect("timed out waiting for realtime event")
        .expect("channel ended")
}

#[tokio::test]
async fn receives_connect_progress_and_disconnect() {
    let origin = start_server(|mut ws| async move {
        ws.send(Message::text(OPEN_FRAME.to_string())).await.unwrap();
        assert_eq!(next_text(&mut ws).await, "40");
        ws.send(Message::text(r#"40{"sid":"ns-sid"}"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::text(r#"42["progress",{"percentage":25}]"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::text(r#"42["progress",{"percentage":150}]"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::text(r#"42["progress",{"percentage":-5}]"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::text("41".to_string())).await.unwrap();
        let _ = ws.next().await;
    })
    .await;

    let mut conn = RealtimeClient::new(&origin).connect().await.unwrap();
    assert_eq!(conn.sid(), "test-sid");

    assert_eq!(next_event(&mut conn).await, RealtimeEvent::Connected);
    assert_eq!(
        next_event(&mut conn).await,
        RealtimeEvent::Progress(Percentage::from(25))
    );
    assert_eq!(
        next_event(&mut conn).await,
        RealtimeEvent::Progress(Percentage::COMPLETE)
    );
    assert_eq!(
        next_event(&mut conn).await,
        RealtimeEvent::Progress(Percentage::ZERO)
    );
    assert!(matches!(
        next_event(&mut conn).await,
        RealtimeEvent::Disconnected { .. }
    ));
}

#[tokio::test]
async fn answers_ping_and_skips_unrelated_frames() {
    let origin = start_server(|mut ws| async move {
        ws.send(Message::text(OPEN_FRAME.to_string())).await.unwrap();
        assert_eq!(next_text(&mut ws).await, "40");
        ws.send(Message::text("40".to_string())).await.unwrap();
        ws.send(Message::text("2".to_string())).await.unwrap();
        assert_eq!(next_text(&mut ws).await, "3");
        ws.send(Message::text(r#"42["chat",{"text":"hi"}]"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::text("42{not json".to_string())).await.unwrap();
        ws.send(Message::text(r#"42["progress",{"pct":1}]"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::text(r#"42["progress",{"percentage":61.6}]"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::text("1".to_string())).await.unwrap();
        let _ = ws.next().await;
    })
    .await;

    let mut conn = RealtimeClient::new(&origin).connect().await.unwrap();
    assert_eq!(next_event(&mut conn).await, RealtimeEvent::Connected);
    assert_eq!(
        next_event(&mut conn).await,
        RealtimeEvent::Progress(Percentage::from(62))
    );
    assert_eq!(
        next_event(&mut conn).await,
        RealtimeEvent::Disconnected {
            reason: "server close".to_string()
        }
    );
}

#[tokio::test]
async fn silent_server_times_out() {
    let origin = start_server(|mut ws| async move {
        ws.send(Message::text(OPEN_FRAME.to_string())).await.unwrap();
        assert_eq!(next_text(&mut ws).await, "40");
        // Never ping; hold the socket open until the client gives up.
        let _ = ws.next().await;
    })
    .await;

    let mut conn = RealtimeClient::new(&origin).connect().await.unwrap();
    assert_eq!(
        next_event(&mut conn).await,
        RealtimeEvent::Disconnected {
            reason: "ping timeout".to_string()
        }
    );
}

#[tokio::test]
async fn close_stops_the_channel() {
    let (closed_tx, closed_rx) = tokio::sync::oneshot::channel();
    let origin = start_server(|mut ws| async move {
        ws.send(Message::text(OPEN_FRAME.to_string())).await.unwrap();
        assert_eq!(next_text(&mut ws).await, "40");
        ws.send(Message::text("40".to_string())).await.unwrap();
        // Drain until the client closes.
        while let Some(Ok(frame)) = ws.next().await {
            if frame.is_close() {
                break;
            }
        }
        let _ = closed_tx.send(());
    })
    .await;

    let mut conn = RealtimeClient::new(&origin).connect().await.unwrap();
    assert_eq!(next_event(&mut conn).await, RealtimeEvent::Connected);
    conn.close().await;

    tokio::time::timeout(Duration::from_secs(5), closed_rx)
        .await
        .expect("server never saw the close")
        .unwrap();
}

#[tokio::test]
async fn connect_to_closed_port_fails() {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = RealtimeClient::new(&format!("http://{}", addr)).connect().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn connect_times_out_when_upgrade_never_completes() {
    // Accepts TCP but never answers the WebSocket upgrade.
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hold = tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let client = RealtimeClient::new(&format!("http://{}", addr))
        .with_connect_timeout(Duration::from_millis(200));
    let result = tokio::time::timeout(Duration::from_secs(5), client.connect())
        .await
        .expect("connect was not bounded by its timeout");
    match result {
        Err(vidpress_core::AppError::Realtime(message)) => {
            assert!(message.contains("Timed out"), "{}", message)
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("connect should have timed out"),
    }
    hold.abort();
}
