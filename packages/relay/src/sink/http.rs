//! One-shot HTTP push sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use tracing::{debug, warn};

use crate::config::SinkConfig;
use crate::event::Event;
use crate::quick::QuickOpResolver;
use crate::sink::EventSink;
use crate::transport::SignedTransport;

/// Pushes each event to a configured URL via the signed transport and feeds
/// the response body to the quick-operation resolver.
///
/// Keeps no state beyond delivery counters for logging.
pub struct HttpReportSink {
    config: SinkConfig,
    transport: SignedTransport,
    resolver: QuickOpResolver,
    delivered: AtomicU64,
    missed: AtomicU64,
}

impl HttpReportSink {
    pub fn new(config: SinkConfig, transport: SignedTransport, resolver: QuickOpResolver) -> Self {
        Self {
            config,
            transport,
            resolver,
            delivered: AtomicU64::new(0),
            missed: AtomicU64::new(0),
        }
    }

    /// Events this sink delivered successfully.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Events this sink gave up on after exhausting retries.
    pub fn missed(&self) -> u64 {
        self.missed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EventSink for HttpReportSink {
    fn name(&self) -> &str {
        &self.config.destination
    }

    async fn deliver(&self, event: Arc<Event>) {
        match self
            .transport
            .deliver(&self.config, event.self_id(), event.body())
            .await
        {
            Ok(response) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                debug!(destination = %self.config.destination, "event delivered");
                self.resolver.handle_response(&event, &response).await;
            }
            Err(err) => {
                self.missed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    destination = %self.config.destination,
                    attempts = err.attempts(),
                    error = %err,
                    "sink missed event"
                );
            }
        }
    }
}
