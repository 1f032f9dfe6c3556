//! Real-time broadcast boundary and caller identity.
//!
//! Every successful lifecycle mutation enqueues a [`BroadcastEvent`] to the
//! external real-time notifier. Delivery is best-effort and out of band:
//! [`Notifier::broadcast`] is infallible and must never block, fail or roll
//! back the ledger mutation that triggered it.
//!
//! The caller's identity arrives from the external auth provider as an
//! [`Actor`]; the core records it into `cancelled_by` / `modified_by` fields
//! but performs no authorization logic itself.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

/// Identity of the caller performing a mutation, as supplied by the external
/// auth provider.
#[derive(Debug, Clone)]
pub struct Actor {
    /// Stable identifier of the caller's account
    pub user_id: String,
    /// Display name recorded into audit fields
    pub user_name: String,
    /// Role string (e.g. `"admin"`, `"teacher"`); not interpreted here
    pub role: String,
}

/// One mutation notification handed to the real-time notifier.
#[derive(Debug, Clone)]
pub struct BroadcastEvent {
    /// Kind of mutation, e.g. `"lesson_cancelled"` or `"series_created"`
    pub event_type: String,
    /// Event-specific details as a JSON document
    pub payload: Value,
    /// `user_id` of the actor who performed the mutation
    pub actor_id: String,
    /// `user_name` of the actor who performed the mutation
    pub actor_name: String,
}

/// Fire-and-forget sink for mutation events.
pub trait Notifier: Send + Sync {
    /// Enqueues an event for out-of-band delivery. Must not block or fail.
    fn broadcast(&self, event: BroadcastEvent);
}

/// Notifier that discards every event. Used in tests and in deployments
/// without a real-time transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn broadcast(&self, _event: BroadcastEvent) {}
}

/// Notifier that forwards events over an unbounded channel to whatever
/// transport drains the receiver (e.g. a websocket fan-out task).
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<BroadcastEvent>,
}

impl ChannelNotifier {
    /// Creates the notifier together with the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BroadcastEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn broadcast(&self, event: BroadcastEvent) {
        // A closed receiver means no transport is listening; the mutation
        // already succeeded, so the event is simply dropped.
        if let Err(e) = self.tx.send(event) {
            debug!("dropping broadcast event, no receiver attached: {e}");
        }
    }
}

/// Builds and enqueues a [`BroadcastEvent`] on behalf of `actor`.
pub fn broadcast_event(notifier: &dyn Notifier, event_type: &str, payload: Value, actor: &Actor) {
    notifier.broadcast(BroadcastEvent {
        event_type: event_type.to_string(),
        payload,
        actor_id: actor.user_id.clone(),
        actor_name: actor.user_name.clone(),
    });
}
