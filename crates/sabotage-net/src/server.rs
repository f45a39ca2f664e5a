//! WebSocket server implementation

use futures_util::{SinkExt, StreamExt};
use sabotage_api::{Event, Request};
use sabotage_util::ClientId;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request as HandshakeRequest, Response as HandshakeResponse,
};
use tokio_tungstenite::tungstenite::http::{header::ORIGIN, StatusCode};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::{NetError, NetResult};

/// Broadcast events buffered per connection before a slow reader misses some
const BROADCAST_CAPACITY: usize = 256;

/// Message from a connection to the service
#[derive(Debug)]
pub enum ServerMessage {
    Request {
        client_id: ClientId,
        request: Request,
    },
    ClientConnected {
        client_id: ClientId,
        peer: SocketAddr,
    },
    ClientDisconnected {
        client_id: ClientId,
    },
}

/// WebSocket server
pub struct NetServer {
    bind_addr: SocketAddr,
    listener: Option<TcpListener>,
    shared: Shared,
    message_rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<ServerMessage>>>>,
}

/// State every connection task holds on to
#[derive(Clone)]
struct Shared {
    allowed_origin: Option<Arc<str>>,
    clients: Arc<RwLock<HashMap<ClientId, ClientHandle>>>,
    event_tx: broadcast::Sender<Event>,
    message_tx: mpsc::UnboundedSender<ServerMessage>,
}

struct ClientHandle {
    peer: SocketAddr,
    direct_tx: mpsc::UnboundedSender<String>,
}

impl NetServer {
    /// Create a new server. With an `allowed_origin`, handshakes carrying any
    /// other `Origin` header are refused.
    pub fn new(bind_addr: SocketAddr, allowed_origin: Option<String>) -> Self {
        let (event_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        Self {
            bind_addr,
            listener: None,
            shared: Shared {
                allowed_origin: allowed_origin.map(Arc::from),
                clients: Arc::new(RwLock::new(HashMap::new())),
                event_tx,
                message_tx,
            },
            message_rx: Arc::new(Mutex::new(Some(message_rx))),
        }
    }

    /// Start listening
    pub async fn start(&mut self) -> NetResult<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;

        info!(
            addr = %listener.local_addr()?,
            allowed_origin = self.shared.allowed_origin.as_deref().unwrap_or("(any)"),
            "WebSocket server listening"
        );

        self.listener = Some(listener);
        Ok(())
    }

    /// Address actually bound, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Get receiver for server messages
    pub async fn take_message_receiver(&self) -> Option<mpsc::UnboundedReceiver<ServerMessage>> {
        self.message_rx.lock().await.take()
    }

    /// Accept connections in a loop
    pub async fn run(&self) -> NetResult<()> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| NetError::ServerError("Server not started".into()))?;

        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(peer = %peer, "TCP connection accepted");
                    let shared = self.shared.clone();
                    tokio::spawn(shared.handle_connection(stream, peer));
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Send an event to one connection
    ///
    /// A connection that already went away is not an error.
    pub async fn send_to(&self, client_id: &ClientId, event: Event) -> NetResult<()> {
        let json = serde_json::to_string(&event)?;

        let clients = self.shared.clients.read().await;
        if let Some(handle) = clients.get(client_id) {
            handle
                .direct_tx
                .send(json)
                .map_err(|_| NetError::ConnectionClosed)?;
        }

        Ok(())
    }

    /// Broadcast an event to every connection
    pub fn broadcast_event(&self, event: Event) {
        if self.shared.event_tx.send(event).is_err() {
            debug!("Broadcast with no connections");
        }
    }

    /// Remote address of a connection
    pub async fn peer_addr(&self, client_id: &ClientId) -> Option<SocketAddr> {
        let clients = self.shared.clients.read().await;
        clients.get(client_id).map(|h| h.peer)
    }

    /// Get connected client count
    pub async fn client_count(&self) -> usize {
        self.shared.clients.read().await.len()
    }
}

impl Shared {
    async fn handle_connection(self, stream: TcpStream, peer: SocketAddr) {
        let allowed = self.allowed_origin.clone();
        let check_origin = move |request: &HandshakeRequest, response: HandshakeResponse| {
            let origin = request.headers().get(ORIGIN).and_then(|v| v.to_str().ok());
            if origin_allowed(allowed.as_deref(), origin) {
                Ok(response)
            } else {
                warn!(peer = %peer, origin = ?origin, "Rejected handshake from disallowed origin");
                Err(forbidden())
            }
        };

        let ws = match tokio_tungstenite::accept_hdr_async(stream, check_origin).await {
            Ok(ws) => ws,
            Err(e) => {
                debug!(peer = %peer, error = %e, "WebSocket handshake failed");
                return;
            }
        };

        let client_id = ClientId::new();
        let (mut sink, mut frames) = ws.split();
        let (direct_tx, mut direct_rx) = mpsc::unbounded_channel::<String>();

        // Subscribe before announcing the client so no broadcast sent in
        // response to the announcement is missed
        let mut event_rx = self.event_tx.subscribe();

        self.clients
            .write()
            .await
            .insert(client_id.clone(), ClientHandle { peer, direct_tx });

        info!(client_id = %client_id, peer = %peer, "Client connected");
        let _ = self.message_tx.send(ServerMessage::ClientConnected {
            client_id: client_id.clone(),
            peer,
        });

        // Writer task: direct messages take priority over broadcasts, and the
        // task ends once the client handle (and its sender) is dropped
        let writer_id = client_id.clone();
        tokio::spawn(async move {
            loop {
                let text = tokio::select! {
                    biased;

                    direct = direct_rx.recv() => match direct {
                        Some(text) => text,
                        None => break,
                    },

                    event = event_rx.recv() => match event {
                        Ok(event) => match serde_json::to_string(&event) {
                            Ok(text) => text,
                            Err(e) => {
                                warn!(client_id = %writer_id, error = %e, "Failed to encode event");
                                continue;
                            }
                        },
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(client_id = %writer_id, skipped, "Client lagging, events dropped");
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                };

                if let Err(e) = sink.send(Message::text(text)).await {
                    debug!(client_id = %writer_id, error = %e, "Write error");
                    break;
                }
            }

            let _ = sink.close().await;
        });

        // Reader loop
        while let Some(frame) = frames.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<Request>(&text) {
                    Ok(request) => {
                        let _ = self.message_tx.send(ServerMessage::Request {
                            client_id: client_id.clone(),
                            request,
                        });
                    }
                    Err(e) => {
                        warn!(client_id = %client_id, error = %e, "Invalid request");
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!(client_id = %client_id, "Client disconnected (close frame)");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(client_id = %client_id, error = %e, "Read error");
                    break;
                }
            }
        }

        self.clients.write().await.remove(&client_id);

        info!(client_id = %client_id, "Client disconnected");
        let _ = self
            .message_tx
            .send(ServerMessage::ClientDisconnected { client_id });
    }
}

fn forbidden() -> ErrorResponse {
    let mut response = ErrorResponse::new(Some("Origin not allowed".to_string()));
    *response.status_mut() = StatusCode::FORBIDDEN;
    response
}

/// Whether a handshake `origin` passes the configured `allowed` origin.
///
/// With nothing configured every origin, including none, is accepted.
/// Otherwise the origin must be present and equal, ignoring a trailing slash.
pub fn origin_allowed(allowed: Option<&str>, origin: Option<&str>) -> bool {
    match (allowed, origin) {
        (None, _) => true,
        (Some(allowed), Some(origin)) => {
            allowed.trim_end_matches('/') == origin.trim_end_matches('/')
        }
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_start() {
        let mut server = NetServer::new("127.0.0.1:0".parse().unwrap(), None);
        assert!(server.local_addr().is_none());

        server.start().await.unwrap();

        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(server.client_count().await, 0);
    }

    #[tokio::test]
    async fn test_run_requires_start() {
        let server = NetServer::new("127.0.0.1:0".parse().unwrap(), None);
        assert!(matches!(server.run().await, Err(NetError::ServerError(_))));
    }

    #[tokio::test]
    async fn test_message_receiver_taken_once() {
        let server = NetServer::new("127.0.0.1:0".parse().unwrap(), None);
        assert!(server.take_message_receiver().await.is_some());
        assert!(server.take_message_receiver().await.is_none());
    }

    #[test]
    fn test_any_origin_without_restriction() {
        assert!(origin_allowed(None, None));
        assert!(origin_allowed(None, Some("http://evil.example")));
    }

    #[test]
    fn test_origin_must_match() {
        let allowed = Some("http://localhost:5173");

        assert!(origin_allowed(allowed, Some("http://localhost:5173")));
        assert!(origin_allowed(allowed, Some("http://localhost:5173/")));
        assert!(!origin_allowed(allowed, Some("http://localhost:8080")));
        assert!(!origin_allowed(allowed, None));
    }

    #[test]
    fn test_forbidden_status() {
        assert_eq!(forbidden().status(), StatusCode::FORBIDDEN);
    }
}
