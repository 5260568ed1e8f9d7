//! Fan-out bus from the session's event stream to the registered sinks.
//!
//! # Guarantees
//!
//! - **Fire-and-forget publish**: `publish` only enqueues; it never waits
//!   on network I/O, backoff sleeps, or any sink's completion, so the
//!   session's producer cannot stall on an unreachable consumer.
//! - **Sink isolation**: each sink has its own worker task; one sink's
//!   retry loop cannot delay or fail delivery to another.
//! - **Per-sink ordering**: a single worker per sink drains its queue
//!   sequentially, so events reach one sink in publish order. No ordering
//!   is promised *between* sinks.
//!
//! The bus has no failure mode visible to the session; all delivery
//! failure is absorbed inside the sinks.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::event::Event;
use crate::sink::EventSink;

struct SinkWorker {
    name: String,
    queue: mpsc::UnboundedSender<Arc<Event>>,
}

/// Holds the registered sink set and fans each published event out to all
/// of them. The set is fixed at construction; there is no dynamic
/// add/remove.
pub struct EventBus {
    workers: Vec<SinkWorker>,
}

impl EventBus {
    /// Spawn one delivery worker per sink. Must run inside a tokio runtime.
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        let workers = sinks
            .into_iter()
            .map(|sink| {
                let name = sink.name().to_string();
                let (queue, mut rx) = mpsc::unbounded_channel::<Arc<Event>>();
                tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        sink.deliver(event).await;
                    }
                });
                info!(sink = %name, "event sink registered");
                SinkWorker { name, queue }
            })
            .collect();
        Self { workers }
    }

    /// Hand an event to every sink's queue. Never blocks, never fails.
    pub fn publish(&self, event: Event) {
        let event = Arc::new(event);
        for worker in &self.workers {
            if worker.queue.send(event.clone()).is_err() {
                warn!(sink = %worker.name, "sink worker gone, dropping event");
            }
        }
    }

    pub fn sink_count(&self) -> usize {
        self.workers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("sink_count", &self.sink_count())
            .finish()
    }
}
