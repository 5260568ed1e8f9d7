//! Wiring: configuration + session in, bus + gateway out.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::bus::EventBus;
use crate::config::{Config, TransportKind};
use crate::event::Event;
use crate::gateway::{Gateway, Readiness};
use crate::quick::QuickOpResolver;
use crate::session::Session;
use crate::sink::{EventSink, HttpReportSink, PersistentPeerSink};
use crate::transport::SignedTransport;

/// Outbound half of a persistent peer's duplex channel. The host's
/// transport plumbing drains `events` onto the wire.
pub struct PeerChannel {
    pub destination: String,
    pub events: mpsc::UnboundedReceiver<Arc<Event>>,
}

/// The assembled core: fan-out bus plus gateway, built once at startup
/// from the immutable configuration snapshot.
///
/// The host wires the session's event stream into [`Bridge::publish`] and
/// calls [`Readiness::mark_ready`] once login completes. A sink entry that
/// cannot be constructed disables just that sink, never the process.
pub struct Bridge {
    bus: EventBus,
    gateway: Arc<Gateway>,
    readiness: Readiness,
    peers: Vec<PeerChannel>,
}

impl Bridge {
    /// Build sinks, bus, and gateway. Must run inside a tokio runtime
    /// (sink workers are spawned here).
    pub fn new(config: Config, session: Arc<dyn Session>) -> Self {
        let readiness = Readiness::new();
        let gateway = Arc::new(Gateway::new(
            session.clone(),
            readiness.clone(),
            config.access_token.clone(),
            config.debug,
        ));

        let transport = SignedTransport::new();
        let resolver = QuickOpResolver::new(session);
        let mut sinks: Vec<Arc<dyn EventSink>> = Vec::new();
        let mut peers = Vec::new();

        for sink_config in config.sinks {
            if sink_config.destination.is_empty() {
                warn!("skipping sink with empty destination");
                continue;
            }
            match sink_config.kind {
                TransportKind::HttpPush => {
                    sinks.push(Arc::new(HttpReportSink::new(
                        sink_config,
                        transport.clone(),
                        resolver.clone(),
                    )));
                }
                TransportKind::PersistentPeer => {
                    let (sink, events) =
                        PersistentPeerSink::new(sink_config.destination.clone(), gateway.clone());
                    peers.push(PeerChannel {
                        destination: sink_config.destination,
                        events,
                    });
                    sinks.push(Arc::new(sink));
                }
            }
        }

        Self {
            bus: EventBus::new(sinks),
            gateway,
            readiness,
            peers,
        }
    }

    /// Fan an event out to every registered sink.
    pub fn publish(&self, event: Event) {
        self.bus.publish(event);
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn gateway(&self) -> Arc<Gateway> {
        self.gateway.clone()
    }

    /// The readiness flag the host flips once the session logs in.
    pub fn readiness(&self) -> Readiness {
        self.readiness.clone()
    }

    /// Take the outbound channels of all persistent peers, for the host's
    /// transport plumbing to drain. Empty after the first call.
    pub fn take_peer_channels(&mut self) -> Vec<PeerChannel> {
        std::mem::take(&mut self.peers)
    }
}
