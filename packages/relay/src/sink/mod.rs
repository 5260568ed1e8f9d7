//! Delivery targets for outbound events.

mod http;
mod peer;

use std::sync::Arc;

use async_trait::async_trait;

use crate::event::Event;

pub use http::HttpReportSink;
pub use peer::PersistentPeerSink;

/// Capability every delivery target implements: accept one event and
/// attempt delivery.
///
/// A sink absorbs its own failures — `deliver` has no error channel by
/// design, so no sink's outcome can leak into the bus, the session, or
/// another sink. Follow-up instructions found in a delivery response go
/// straight to the session through the quick-operation resolver.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Stable name for logging, usually the destination address.
    fn name(&self) -> &str;

    /// Attempt delivery of one event. Never fails visibly.
    async fn deliver(&self, event: Arc<Event>);
}
