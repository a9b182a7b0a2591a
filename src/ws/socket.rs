//! Split WebSocket halves used by the relay.
//!
//! [`Outbound`] serializes events and bounds every send by a timeout so a
//! slow client only ever stalls its own task. [`Inbound`] reduces the
//! frame stream to what the relay cares about.

use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};

use super::messages::ServerEvent;
use crate::error::RelayError;

/// Splits a socket into its sending and receiving halves.
#[must_use]
pub fn split(socket: WebSocket, send_timeout: Duration) -> (Outbound, Inbound) {
    let (sink, stream) = socket.split();
    (Outbound { sink, send_timeout }, Inbound { stream })
}

/// Sending half of a relayed connection.
#[derive(Debug)]
pub struct Outbound {
    sink: SplitSink<WebSocket, Message>,
    send_timeout: Duration,
}

impl Outbound {
    /// Sends one event as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::SendTimeout`] if the frame is not accepted
    /// within the send timeout, or [`RelayError::Transport`] if the socket
    /// is gone.
    pub async fn send(&mut self, event: &ServerEvent) -> Result<(), RelayError> {
        let json = serde_json::to_string(event)?;
        self.send_message(Message::text(json)).await
    }

    /// Sends a close frame and drops the sending half. Failures are
    /// logged and otherwise ignored.
    pub async fn close(mut self, code: u16, reason: &'static str) {
        let frame = CloseFrame {
            code,
            reason: Utf8Bytes::from_static(reason),
        };
        if let Err(err) = self.send_message(Message::Close(Some(frame))).await {
            tracing::debug!(error = %err, "close frame not delivered");
        }
    }

    async fn send_message(&mut self, message: Message) -> Result<(), RelayError> {
        match tokio::time::timeout(self.send_timeout, self.sink.send(message)).await {
            Ok(result) => result.map_err(RelayError::from),
            Err(_) => Err(RelayError::SendTimeout),
        }
    }
}

/// What the relay sees of an incoming frame.
#[derive(Debug)]
pub enum Frame {
    /// A text payload.
    Text(Utf8Bytes),
    /// A binary payload, which the protocol never uses.
    Binary,
    /// The peer closed the connection or the transport failed.
    Closed,
}

/// Receiving half of a relayed connection.
#[derive(Debug)]
pub struct Inbound {
    stream: SplitStream<WebSocket>,
}

impl Inbound {
    /// Waits for the next text or binary frame, skipping pings and pongs.
    ///
    /// Cancel-safe.
    pub async fn next_frame(&mut self) -> Frame {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Frame::Text(text),
                Some(Ok(Message::Binary(_))) => return Frame::Binary,
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => return Frame::Closed,
                Some(Err(err)) => {
                    tracing::debug!(error = %err, "ws read failed");
                    return Frame::Closed;
                }
            }
        }
    }
}
