//! WebSocket client implementation

use futures_util::{SinkExt, StreamExt};
use sabotage_api::{Command, Event, Request};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::ORIGIN, HeaderValue};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{NetError, NetResult};

/// Client for talking to sabotaged, as a player would
pub struct GameClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl GameClient {
    /// Connect to `url`, e.g. `ws://127.0.0.1:3001`
    pub async fn connect(url: &str) -> NetResult<Self> {
        let (stream, _) = tokio_tungstenite::connect_async(url).await?;
        Ok(Self { stream })
    }

    /// Connect announcing `origin` in the handshake, like a browser would
    pub async fn connect_with_origin(url: &str, origin: &str) -> NetResult<Self> {
        let mut request = url.into_client_request()?;
        let origin = HeaderValue::from_str(origin).map_err(tungstenite::Error::from)?;
        request.headers_mut().insert(ORIGIN, origin);

        let (stream, _) = tokio_tungstenite::connect_async(request).await?;
        Ok(Self { stream })
    }

    /// Send a command. Nothing is returned; effects arrive as events.
    pub async fn send(&mut self, command: Command) -> NetResult<()> {
        let json = serde_json::to_string(&Request::new(command))?;
        self.send_raw(json).await
    }

    /// Send one text frame as is
    pub async fn send_raw(&mut self, text: impl Into<String>) -> NetResult<()> {
        self.stream.send(Message::text(text.into())).await?;
        Ok(())
    }

    /// Wait for the next event
    pub async fn next_event(&mut self) -> NetResult<Event> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
                Some(Ok(Message::Close(_))) | None => return Err(NetError::ConnectionClosed),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    /// Close the connection cleanly
    pub async fn close(mut self) -> NetResult<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}
