// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket client for the remote record store.
//!
//! One connection is opened lazily and reused. Requests are sent one at a
//! time and matched to their reply by request id; a request that gets no
//! reply within the timeout is reported as unreachable and the connection is
//! dropped so the next request reconnects.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use ft_core::{ClientMessage, EntityType, ServerMessage, WriteMode};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::remote::{RemoteError, RemoteFuture, RemoteResult, RemoteStore};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Internal WebSocket connection wrapper.
struct WebSocketConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

/// Remote store reached over a WebSocket.
pub struct WebSocketRemote {
    url: String,
    request_timeout: Duration,
    conn: tokio::sync::Mutex<Option<WebSocketConnection>>,
    next_request: AtomicU64,
}

impl WebSocketRemote {
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Self {
        WebSocketRemote {
            url: url.into(),
            request_timeout,
            conn: tokio::sync::Mutex::new(None),
            next_request: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, msg: ClientMessage, request_id: u64) -> RemoteResult<()> {
        let mut conn = self.conn.lock().await;

        let result = match tokio::time::timeout(
            self.request_timeout,
            exchange(&mut conn, &self.url, &msg, request_id),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Unreachable(format!(
                "no reply within {}ms",
                self.request_timeout.as_millis()
            ))),
        };

        if matches!(
            result,
            Err(RemoteError::Unreachable(_)) | Err(RemoteError::Protocol(_))
        ) && conn.take().is_some()
        {
            tracing::debug!("dropped connection to {}", self.url);
        }
        result
    }

    fn next_request_id(&self) -> u64 {
        self.next_request.fetch_add(1, Ordering::Relaxed)
    }
}

impl RemoteStore for WebSocketRemote {
    fn upsert<'a>(
        &'a self,
        user_id: &'a str,
        entity_type: &'a EntityType,
        entity: &'a Value,
        mode: WriteMode,
    ) -> RemoteFuture<'a> {
        Box::pin(async move {
            let request_id = self.next_request_id();
            let msg =
                ClientMessage::upsert(request_id, user_id, entity_type.clone(), entity.clone(), mode);
            self.request(msg, request_id).await
        })
    }

    fn delete<'a>(
        &'a self,
        user_id: &'a str,
        entity_type: &'a EntityType,
        entity_id: &'a str,
    ) -> RemoteFuture<'a> {
        Box::pin(async move {
            let request_id = self.next_request_id();
            let msg = ClientMessage::delete(request_id, user_id, entity_type.clone(), entity_id);
            self.request(msg, request_id).await
        })
    }
}

impl std::fmt::Debug for WebSocketRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketRemote")
            .field("url", &self.url)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// Sends one request on `slot`, connecting first if needed, and waits for
/// the reply carrying `request_id`.
async fn exchange(
    slot: &mut Option<WebSocketConnection>,
    url: &str,
    msg: &ClientMessage,
    request_id: u64,
) -> RemoteResult<()> {
    if slot.is_none() {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| RemoteError::Unreachable(e.to_string()))?;
        tracing::debug!("connected to {}", url);
        let (sink, stream) = ws.split();
        *slot = Some(WebSocketConnection { sink, stream });
    }
    let Some(ws) = slot.as_mut() else {
        return Err(RemoteError::Unreachable("not connected".to_string()));
    };

    let json = msg
        .to_json()
        .map_err(|e| RemoteError::Protocol(e.to_string()))?;
    ws.sink
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| RemoteError::Unreachable(e.to_string()))?;
    // Flush to detect a broken connection now rather than on the next read
    ws.sink
        .flush()
        .await
        .map_err(|e| RemoteError::Unreachable(e.to_string()))?;

    loop {
        match ws.stream.next().await {
            Some(Ok(Message::Text(text))) => {
                let reply = ServerMessage::from_json(&text)
                    .map_err(|e| RemoteError::Protocol(e.to_string()))?;
                match reply {
                    ServerMessage::Ack { request_id: id } if id == request_id => return Ok(()),
                    ServerMessage::Rejected {
                        request_id: id,
                        reason,
                    } if id == request_id => return Err(RemoteError::Rejected(reason)),
                    ServerMessage::Conflict {
                        request_id: id,
                        remote,
                    } if id == request_id => return Err(RemoteError::Conflict { remote }),
                    ServerMessage::Error { message } => {
                        return Err(RemoteError::Protocol(message));
                    }
                    // Replies meant for other requests
                    other => {
                        tracing::debug!("ignoring unrelated reply: {:?}", other);
                    }
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                return Err(RemoteError::Unreachable("connection closed".to_string()));
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(RemoteError::Unreachable(e.to_string())),
        }
    }
}
