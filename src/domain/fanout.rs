//! Per-session broadcast of game events.
//!
//! [`Fanout`] wraps a [`tokio::sync::broadcast`] channel. Every connection
//! taking part in a session holds a [`Subscription`]; dropping it is the
//! unsubscribe, so membership is released however the connection's task
//! ends.

use tokio::sync::broadcast;

use super::GameEvent;

/// Broadcast set for one session's [`GameEvent`]s.
///
/// Publishing never blocks and never fails: receivers that fall more than
/// `capacity` events behind skip the oldest ones, and an event published
/// while a subscriber is leaving simply does not reach it.
#[derive(Debug, Clone)]
pub struct Fanout {
    sender: broadcast::Sender<GameEvent>,
    capacity: usize,
}

impl Fanout {
    /// Creates a new `Fanout` with the given channel capacity (at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Number of events a subscriber may fall behind before it lags.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sends an event to every current subscriber.
    ///
    /// Returns the number of subscribers the event was queued for. With
    /// no subscribers the event is silently dropped.
    pub fn broadcast(&self, event: GameEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Adds a subscriber that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns the current number of subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Membership of one connection in a [`Fanout`].
///
/// Dropping the subscription removes the connection from the set.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<GameEvent>,
}

impl Subscription {
    /// Waits for the next event.
    ///
    /// Returns `None` once the owning [`Fanout`] is gone. Cancel-safe, so
    /// it can be raced against socket reads in `tokio::select!`.
    pub async fn recv(&mut self) -> Option<GameEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "subscriber lagged behind session events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Leaves the fan-out set. Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Player;

    fn make_event(column: usize) -> GameEvent {
        GameEvent::Play {
            player: Player::Red,
            column,
            row: 0,
        }
    }

    #[test]
    fn broadcast_without_subscribers_returns_zero() {
        let fanout = Fanout::new(16);
        assert_eq!(fanout.broadcast(make_event(0)), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_event() {
        let fanout = Fanout::new(16);
        let mut sub = fanout.subscribe();

        fanout.broadcast(make_event(4));

        let Some(event) = sub.recv().await else {
            panic!("expected to receive event");
        };
        assert_eq!(event, make_event(4));
    }

    #[tokio::test]
    async fn all_subscribers_receive_same_event() {
        let fanout = Fanout::new(16);
        let mut sub1 = fanout.subscribe();
        let mut sub2 = fanout.subscribe();

        assert_eq!(fanout.broadcast(make_event(1)), 2);

        let Some(e1) = sub1.recv().await else {
            panic!("sub1 failed");
        };
        let Some(e2) = sub2.recv().await else {
            panic!("sub2 failed");
        };
        assert_eq!(e1, e2);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let fanout = Fanout::new(16);
        assert_eq!(fanout.subscriber_count(), 0);

        let sub1 = fanout.subscribe();
        let sub2 = fanout.subscribe();
        assert_eq!(fanout.subscriber_count(), 2);

        drop(sub1);
        assert_eq!(fanout.subscriber_count(), 1);

        sub2.unsubscribe();
        assert_eq!(fanout.subscriber_count(), 0);
        assert_eq!(fanout.broadcast(make_event(0)), 0);
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_oldest_events() {
        let fanout = Fanout::new(2);
        let mut sub = fanout.subscribe();
        for column in 0..4 {
            fanout.broadcast(make_event(column));
        }

        let Some(first) = sub.recv().await else {
            panic!("expected an event after lagging");
        };
        assert_eq!(first, make_event(2));
    }

    #[tokio::test]
    async fn recv_ends_when_fanout_dropped() {
        let fanout = Fanout::new(4);
        let mut sub = fanout.subscribe();
        drop(fanout);
        assert!(sub.recv().await.is_none());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let fanout = Fanout::new(0);
        let _sub = fanout.subscribe();
        assert_eq!(fanout.broadcast(make_event(0)), 1);
    }
}
