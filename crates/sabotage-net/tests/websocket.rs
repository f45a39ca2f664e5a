//! Server and client talking over a real socket

use sabotage_api::{Command, Event, EventPayload};
use sabotage_net::{GameClient, NetError, NetServer, ServerMessage};
use sabotage_util::{ClientId, PlayerId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::http::StatusCode;

async fn within<T>(fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("timed out")
}

async fn spawn_server(
    allowed_origin: Option<&str>,
) -> (Arc<NetServer>, String, UnboundedReceiver<ServerMessage>) {
    let mut server = NetServer::new(
        "127.0.0.1:0".parse().unwrap(),
        allowed_origin.map(String::from),
    );
    server.start().await.unwrap();
    let url = format!("ws://{}", server.local_addr().unwrap());
    let messages = server.take_message_receiver().await.unwrap();

    let server = Arc::new(server);
    let accept = server.clone();
    tokio::spawn(async move { accept.run().await });

    (server, url, messages)
}

async fn expect_connected(messages: &mut UnboundedReceiver<ServerMessage>) -> ClientId {
    match within(messages.recv()).await {
        Some(ServerMessage::ClientConnected { client_id, .. }) => client_id,
        other => panic!("Expected ClientConnected, got {:?}", other),
    }
}

#[tokio::test]
async fn request_in_direct_event_out() {
    let (server, url, mut messages) = spawn_server(None).await;
    let mut client = GameClient::connect(&url).await.unwrap();
    let client_id = expect_connected(&mut messages).await;

    client
        .send(Command::CallMeeting {
            player_id: PlayerId::new(2),
        })
        .await
        .unwrap();

    match within(messages.recv()).await {
        Some(ServerMessage::Request {
            client_id: from,
            request,
        }) => {
            assert_eq!(from, client_id);
            assert_eq!(
                request.command,
                Command::CallMeeting {
                    player_id: PlayerId::new(2)
                }
            );
        }
        other => panic!("Expected Request, got {:?}", other),
    }

    server
        .send_to(&client_id, Event::new(EventPayload::MeetingEnded))
        .await
        .unwrap();

    let event = within(client.next_event()).await.unwrap();
    assert_eq!(event.payload, EventPayload::MeetingEnded);
    assert!(server.peer_addr(&client_id).await.is_some());
}

#[tokio::test]
async fn broadcast_reaches_every_client() {
    let (server, url, mut messages) = spawn_server(None).await;
    let mut first = GameClient::connect(&url).await.unwrap();
    expect_connected(&mut messages).await;
    let mut second = GameClient::connect(&url).await.unwrap();
    expect_connected(&mut messages).await;

    server.broadcast_event(Event::new(EventPayload::MeetingCalled {
        player_id: PlayerId::new(1),
    }));

    for client in [&mut first, &mut second] {
        let event = within(client.next_event()).await.unwrap();
        assert_eq!(
            event.payload,
            EventPayload::MeetingCalled {
                player_id: PlayerId::new(1)
            }
        );
    }
}

#[tokio::test]
async fn malformed_frame_keeps_connection_open() {
    let (_server, url, mut messages) = spawn_server(None).await;
    let mut client = GameClient::connect(&url).await.unwrap();
    expect_connected(&mut messages).await;

    client.send_raw("not json").await.unwrap();
    client
        .send_raw(r#"{"command":{"type":"launch_rockets"}}"#)
        .await
        .unwrap();
    client.send(Command::StartGame).await.unwrap();

    match within(messages.recv()).await {
        Some(ServerMessage::Request { request, .. }) => {
            assert_eq!(request.command, Command::StartGame);
        }
        other => panic!("Expected Request, got {:?}", other),
    }
}

#[tokio::test]
async fn close_reports_disconnect() {
    let (server, url, mut messages) = spawn_server(None).await;
    let client = GameClient::connect(&url).await.unwrap();
    let client_id = expect_connected(&mut messages).await;
    assert_eq!(server.client_count().await, 1);

    client.close().await.unwrap();

    match within(messages.recv()).await {
        Some(ServerMessage::ClientDisconnected { client_id: gone }) => {
            assert_eq!(gone, client_id);
        }
        other => panic!("Expected ClientDisconnected, got {:?}", other),
    }
    assert_eq!(server.client_count().await, 0);

    // Sending to a departed client is not an error
    server
        .send_to(&client_id, Event::new(EventPayload::MeetingEnded))
        .await
        .unwrap();
}

#[tokio::test]
async fn disallowed_origin_is_forbidden() {
    let (server, url, mut messages) = spawn_server(Some("http://localhost:5173")).await;

    match GameClient::connect_with_origin(&url, "http://evil.example").await {
        Err(NetError::WebSocket(tungstenite::Error::Http(response))) => {
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
        Err(e) => panic!("Expected HTTP rejection, got {}", e),
        Ok(_) => panic!("Handshake should have been rejected"),
    }

    assert!(GameClient::connect(&url).await.is_err());
    assert_eq!(server.client_count().await, 0);

    let _client = GameClient::connect_with_origin(&url, "http://localhost:5173")
        .await
        .unwrap();
    expect_connected(&mut messages).await;
    assert_eq!(server.client_count().await, 1);
}
