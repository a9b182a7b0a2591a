//! Token-keyed registry of live sessions.
//!
//! [`SessionRegistry`] maps join tokens and watch tokens to their
//! [`Session`]. Both maps live behind a single [`tokio::sync::RwLock`] so
//! that registering or removing a session updates them atomically with
//! respect to lookups.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Session, Token};
use crate::error::RelayError;

/// A freshly created session and the tokens that grant access to it.
#[derive(Debug, Clone)]
pub struct CreatedSession {
    /// The new session.
    pub session: Arc<Session>,
    /// Token that lets a second player join.
    pub join_token: Token,
    /// Token that lets anyone watch.
    pub watch_token: Token,
}

#[derive(Debug, Default)]
struct Tokens {
    join: HashMap<Token, Arc<Session>>,
    watch: HashMap<Token, Arc<Session>>,
}

impl Tokens {
    fn is_live(&self, token: &Token) -> bool {
        self.join.contains_key(token) || self.watch.contains_key(token)
    }

    /// Generates a token that is not currently registered in either map.
    fn fresh_token(&self) -> Token {
        loop {
            let token = Token::generate();
            if !self.is_live(&token) {
                return token;
            }
        }
    }
}

/// Registry of all live sessions, keyed by their access tokens.
///
/// Owned by the application state and passed to each connection; there is
/// no process-wide instance, so independent registries can coexist.
#[derive(Debug)]
pub struct SessionRegistry {
    tokens: RwLock<Tokens>,
    fanout_capacity: usize,
}

impl SessionRegistry {
    /// Creates an empty registry whose sessions use the given fan-out
    /// capacity.
    #[must_use]
    pub fn new(fanout_capacity: usize) -> Self {
        Self {
            tokens: RwLock::new(Tokens::default()),
            fanout_capacity,
        }
    }

    /// Creates a new session and registers a join token and a watch token
    /// for it.
    pub async fn create_session(&self) -> CreatedSession {
        let session = Arc::new(Session::new(self.fanout_capacity));

        let mut tokens = self.tokens.write().await;
        let join_token = tokens.fresh_token();
        tokens.join.insert(join_token.clone(), Arc::clone(&session));
        let watch_token = tokens.fresh_token();
        tokens.watch.insert(watch_token.clone(), Arc::clone(&session));
        drop(tokens);

        tracing::debug!(session_id = %session.id(), "session registered");
        CreatedSession {
            session,
            join_token,
            watch_token,
        }
    }

    /// Looks up a session by its join token.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::SessionNotFound`] if the token is unknown or
    /// its session has ended.
    pub async fn resolve_join(&self, token: &Token) -> Result<Arc<Session>, RelayError> {
        let tokens = self.tokens.read().await;
        tokens
            .join
            .get(token)
            .cloned()
            .ok_or(RelayError::SessionNotFound)
    }

    /// Looks up a session by its watch token.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::SessionNotFound`] if the token is unknown or
    /// its session has ended.
    pub async fn resolve_watch(&self, token: &Token) -> Result<Arc<Session>, RelayError> {
        let tokens = self.tokens.read().await;
        tokens
            .watch
            .get(token)
            .cloned()
            .ok_or(RelayError::SessionNotFound)
    }

    /// Unregisters both tokens of a session. Other sessions are untouched.
    pub async fn destroy_session(&self, join_token: &Token, watch_token: &Token) {
        let mut tokens = self.tokens.write().await;
        let removed = tokens.join.remove(join_token);
        tokens.watch.remove(watch_token);
        drop(tokens);

        if let Some(session) = removed {
            tracing::debug!(session_id = %session.id(), "session unregistered");
        }
    }

    /// Returns the number of live sessions.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.join.len()
    }

    /// Returns `true` if no session is live.
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.join.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EVENT_BUS_CAPACITY)
    }
}
