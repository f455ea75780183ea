//! Test helpers for integration tests
//!
//! Provides a gateway bound to an ephemeral port and a thin WebSocket
//! client that speaks the op-code envelope.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use relay_common::AppConfig;
use relay_gateway::server::{create_app, serve, GatewayState};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// How long to wait for an expected frame
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to listen before concluding nothing is coming
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: GatewayState,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server with default relay settings
    pub async fn start() -> Result<Self> {
        Self::start_with(|_| {}).await
    }

    /// Start a test server after adjusting the default config
    pub async fn start_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let mut config = test_config();
        configure(&mut config);

        let state = GatewayState::new(config);
        let app = create_app(state.clone());

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            state,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the WebSocket URL of the gateway
    pub fn gateway_url(&self) -> String {
        format!("ws://{}/gateway", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Open a WebSocket and consume the Hello frame
    pub async fn connect(&self) -> Result<TestClient> {
        let (socket, _) = connect_async(self.gateway_url()).await?;
        let mut client = TestClient { socket };

        let hello = client.next_message().await?;
        if hello["op"] != 10 {
            bail!("Expected Hello, got {hello}");
        }

        Ok(client)
    }

    /// Poll `condition` until it holds or the receive timeout elapses
    pub async fn wait_until(&self, condition: impl Fn(&GatewayState) -> bool) -> Result<()> {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        while !condition(&self.state) {
            if tokio::time::Instant::now() > deadline {
                bail!("Condition not reached within {RECV_TIMEOUT:?}");
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(())
    }
}

/// Configuration for tests: loopback bind, short send timeout
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.gateway.host = "127.0.0.1".to_string();
    config.gateway.port = 0;
    config.relay.send_timeout_ms = 500;
    config
}

/// A WebSocket client speaking the gateway envelope
pub struct TestClient {
    socket: Socket,
}

impl TestClient {
    /// Send a raw text frame
    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.socket.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Send an envelope with `op` and `d`
    pub async fn send_op(&mut self, op: u8, d: Value) -> Result<()> {
        self.send_text(json!({ "op": op, "d": d }).to_string()).await
    }

    /// Send a Join and wait for our own join announcement
    pub async fn join(&mut self, room: &str, username: &str) -> Result<()> {
        self.send_op(2, json!({ "roomCode": room, "username": username }))
            .await?;

        let expected = format!("{} joined the room", username.trim());
        loop {
            let d = self.expect_dispatch("SYSTEM_MESSAGE").await?;
            if d["text"] == expected.as_str() {
                return Ok(());
            }
        }
    }

    /// Send a chat message
    pub async fn chat(&mut self, payload: Value) -> Result<()> {
        self.send_op(3, payload).await
    }

    /// Send a media message
    pub async fn media(&mut self, payload: Value) -> Result<()> {
        self.send_op(4, payload).await
    }

    /// Send a heartbeat
    pub async fn heartbeat(&mut self, last_sequence: Option<u64>) -> Result<()> {
        self.send_op(1, json!(last_sequence)).await
    }

    /// Next text frame parsed as JSON
    pub async fn next_message(&mut self) -> Result<Value> {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.socket.next())
                .await
                .context("Timed out waiting for a frame")?
                .context("Socket closed")??;

            match frame {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Ping(_) | Message::Pong(_) => {}
                other => bail!("Unexpected frame: {other:?}"),
            }
        }
    }

    /// Next frame must be a Dispatch of type `t`; returns its `d`
    pub async fn expect_dispatch(&mut self, t: &str) -> Result<Value> {
        let msg = self.next_message().await?;
        if msg["op"] != 0 || msg["t"] != t {
            bail!("Expected {t} dispatch, got {msg}");
        }
        Ok(msg["d"].clone())
    }

    /// Assert nothing arrives for a short while
    pub async fn expect_silence(&mut self) -> Result<()> {
        match tokio::time::timeout(QUIET_PERIOD, self.socket.next()).await {
            Err(_) => Ok(()),
            Ok(frame) => bail!("Expected silence, got {frame:?}"),
        }
    }

    /// Wait for the server's close frame; returns its code
    pub async fn expect_close(&mut self) -> Result<Option<u16>> {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.socket.next())
                .await
                .context("Timed out waiting for close")?;

            match frame {
                Some(Ok(Message::Close(frame))) => {
                    return Ok(frame.map(|f| u16::from(f.code)));
                }
                Some(Ok(_)) => {}
                Some(Err(_)) | None => return Ok(None),
            }
        }
    }

    /// Send a binary frame
    pub async fn send_binary(&mut self, data: Vec<u8>) -> Result<()> {
        self.socket.send(Message::Binary(data)).await?;
        Ok(())
    }

    /// Close the socket from the client side
    pub async fn close(mut self) -> Result<()> {
        self.socket.close(None).await?;
        Ok(())
    }
}
