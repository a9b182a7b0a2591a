//! WebSocket connection state machine.
//!
//! Each connection starts in `AwaitingRole`, reads exactly one
//! role-selection message and then runs as the game creator, the second
//! player, or a watcher until it closes:
//!
//! ```text
//! AwaitingRole ─┬─ {}             → Creator ─┐
//!               ├─ {join: token}  → Joiner  ─┼─ move loop ─┐
//!               └─ {watch: token} → Watcher ── replay, idle ┴─ Closed
//! ```
//!
//! The creator owns the session: when its connection ends, both tokens
//! are unregistered, even if the other participants are still connected.

use std::sync::Arc;

use axum::extract::ws::{WebSocket, close_code};
use chrono::Utc;

use super::messages::{ClientMessage, Role, ServerEvent};
use super::socket::{self, Frame, Inbound, Outbound};
use crate::config::ConnectionSettings;
use crate::domain::{
    CreatedSession, GameEvent, MoveOutcome, Player, Session, SessionRegistry, Subscription, Token,
};
use crate::error::RelayError;

/// Runs a single relayed connection from role selection to close.
pub async fn run_connection(
    socket: WebSocket,
    registry: Arc<SessionRegistry>,
    settings: ConnectionSettings,
) {
    let (outbound, mut inbound) = socket::split(socket, settings.send_timeout);

    let frame = match settings.role_timeout {
        Some(limit) => match tokio::time::timeout(limit, inbound.next_frame()).await {
            Ok(frame) => frame,
            Err(_) => {
                tracing::debug!("role selection timed out");
                outbound
                    .close(close_code::NORMAL, "role selection timed out")
                    .await;
                return;
            }
        },
        None => inbound.next_frame().await,
    };

    let role = match frame {
        Frame::Text(text) => Role::parse(text.as_str()),
        Frame::Binary => Err(RelayError::Protocol("binary frame".to_string())),
        Frame::Closed => {
            tracing::debug!("connection closed before selecting a role");
            return;
        }
    };

    match role {
        Ok(Role::Create) => start(outbound, inbound, &registry).await,
        Ok(Role::Join(token)) => join(outbound, inbound, &registry, &token).await,
        Ok(Role::Watch(token)) => watch(outbound, inbound, &registry, &token).await,
        Err(err) => {
            tracing::warn!(error = %err, "rejecting connection");
            outbound
                .close(close_code::POLICY, "protocol violation")
                .await;
        }
    }
}

/// Creator: registers a new session, hands out its tokens and plays red.
async fn start(mut outbound: Outbound, inbound: Inbound, registry: &SessionRegistry) {
    let CreatedSession {
        session,
        join_token,
        watch_token,
    } = registry.create_session().await;
    let session_id = session.id();
    let subscription = session.subscribe();

    let init = ServerEvent::Init {
        join: join_token.clone(),
        watch: watch_token.clone(),
    };
    match outbound.send(&init).await {
        Ok(()) => {
            tracing::info!(%session_id, "first player started game");
            play_loop(&session, Player::Red, outbound, inbound, subscription).await;
        }
        Err(err) => tracing::debug!(%session_id, error = %err, "init not delivered"),
    }

    registry.destroy_session(&join_token, &watch_token).await;
    let lifetime_secs = (Utc::now() - session.created_at()).num_seconds();
    tracing::info!(
        %session_id,
        lifetime_secs,
        moves = session.history().len(),
        winner = ?session.winner(),
        "game session ended"
    );
}

/// Joiner: takes the second seat of an existing session and plays yellow.
async fn join(outbound: Outbound, inbound: Inbound, registry: &SessionRegistry, token: &Token) {
    let session = match registry.resolve_join(token).await {
        Ok(session) => session,
        Err(err) => return reject(outbound, &err).await,
    };
    let Some(_seat) = session.claim_second_seat() else {
        return reject(outbound, &RelayError::GameFull).await;
    };

    let subscription = session.subscribe();
    tracing::info!(session_id = %session.id(), "second player joined game");
    play_loop(&session, Player::Yellow, outbound, inbound, subscription).await;
}

/// Watcher: replays the history, then only forwards broadcasts.
async fn watch(
    mut outbound: Outbound,
    mut inbound: Inbound,
    registry: &SessionRegistry,
    token: &Token,
) {
    let session = match registry.resolve_watch(token).await {
        Ok(session) => session,
        Err(err) => return reject(outbound, &err).await,
    };
    let session_id = session.id();
    let (mut subscription, history) = session.subscribe_with_history();
    tracing::info!(
        %session_id,
        moves = history.len(),
        subscribers = session.subscriber_count(),
        "watcher entered game"
    );

    for mv in history {
        if !forward(&mut outbound, Some(GameEvent::from(mv))).await {
            return;
        }
    }

    loop {
        tokio::select! {
            frame = inbound.next_frame() => match frame {
                Frame::Closed => break,
                Frame::Text(_) | Frame::Binary => {
                    tracing::trace!(%session_id, "ignoring message from watcher");
                }
            },
            event = subscription.recv() => {
                if !forward(&mut outbound, event).await {
                    break;
                }
            }
        }
    }
    tracing::debug!(%session_id, "watcher left");
}

/// Reads move requests from one player and forwards session events to it
/// until the connection closes or misbehaves.
async fn play_loop(
    session: &Session,
    player: Player,
    mut outbound: Outbound,
    mut inbound: Inbound,
    mut subscription: Subscription,
) {
    let session_id = session.id();
    loop {
        tokio::select! {
            frame = inbound.next_frame() => {
                let result = match frame {
                    Frame::Text(text) => {
                        tracing::debug!(%session_id, %player, message = text.as_str(), "move received");
                        apply_request(session, player, text.as_str())
                    }
                    Frame::Binary => Err(RelayError::Protocol("binary frame".to_string())),
                    Frame::Closed => break,
                };
                match result {
                    Ok(outcome) => {
                        if let Some(winner) = outcome.new_winner {
                            tracing::info!(%session_id, %winner, "game won");
                        }
                    }
                    Err(err) if err.is_recoverable() => {
                        let message = err.client_message().unwrap_or_else(|| err.to_string());
                        if let Err(err) = outbound.send(&ServerEvent::error(message)).await {
                            tracing::debug!(%session_id, %player, error = %err, "error event not delivered");
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%session_id, %player, error = %err, "closing connection");
                        outbound.close(close_code::POLICY, "protocol violation").await;
                        return;
                    }
                }
            }
            event = subscription.recv() => {
                if !forward(&mut outbound, event).await {
                    break;
                }
            }
        }
    }
    tracing::debug!(%session_id, %player, "player disconnected");
}

/// Parses a move request and applies it to the session's board.
fn apply_request(session: &Session, player: Player, text: &str) -> Result<MoveOutcome, RelayError> {
    let ClientMessage::Play { column } = ClientMessage::parse(text)?;
    Ok(session.play(player, column)?)
}

/// Sends a session event to this connection. Returns `false` when the
/// connection should stop.
async fn forward(outbound: &mut Outbound, event: Option<GameEvent>) -> bool {
    let Some(event) = event else {
        return false;
    };
    match outbound.send(&ServerEvent::from(event)).await {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(error = %err, "event not delivered");
            false
        }
    }
}

/// Reports a failed lookup to the client and closes cleanly.
async fn reject(mut outbound: Outbound, err: &RelayError) {
    let message = err.client_message().unwrap_or_else(|| err.to_string());
    match outbound.send(&ServerEvent::error(message)).await {
        Ok(()) => outbound.close(close_code::NORMAL, "").await,
        Err(send_err) => tracing::debug!(error = %send_err, "error event not delivered"),
    }
}
