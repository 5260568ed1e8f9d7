//! Persistent peer sink: a long-lived duplex channel.
//!
//! The peer both receives pushed events and sends inbound calls over the
//! same channel. Only the capability is modeled here — the wire transport
//! (WebSocket, unix socket, whatever the host wires up) drains the
//! outbound receiver and feeds inbound calls to [`PersistentPeerSink::on_inbound_call`],
//! which routes through the same [`Gateway`] as the stateless surface so
//! auth and readiness semantics stay transport-agnostic.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use crate::event::Event;
use crate::gateway::{Gateway, GatewayResponse, InboundCall};
use crate::sink::EventSink;

/// Event sink backed by an open duplex channel to one peer.
pub struct PersistentPeerSink {
    destination: String,
    outbound: mpsc::UnboundedSender<Arc<Event>>,
    gateway: Arc<Gateway>,
}

impl PersistentPeerSink {
    /// Create the sink and the outbound half of its channel. The transport
    /// plumbing owns the receiver and writes whatever it yields onto the
    /// wire.
    pub fn new(
        destination: impl Into<String>,
        gateway: Arc<Gateway>,
    ) -> (Self, mpsc::UnboundedReceiver<Arc<Event>>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        (
            Self {
                destination: destination.into(),
                outbound,
                gateway,
            },
            rx,
        )
    }

    /// Handle a call that arrived over the peer's channel.
    pub async fn on_inbound_call(&self, call: &InboundCall) -> GatewayResponse {
        self.gateway.handle(call).await
    }
}

#[async_trait]
impl EventSink for PersistentPeerSink {
    fn name(&self) -> &str {
        &self.destination
    }

    async fn deliver(&self, event: Arc<Event>) {
        // Fire-and-forget onto the open channel.
        if self.outbound.send(event).is_err() {
            warn!(destination = %self.destination, "peer channel closed, dropping event");
        }
    }
}
