//! # Relay
//!
//! Bridges a live, stateful messaging [`Session`] to any number of external
//! consumers, and exposes the session's action registry through a stateless,
//! authenticated request/response gateway suitable for FaaS-style hosts.
//!
//! ## Architecture
//!
//! ```text
//! Session ──► EventBus.publish(event)
//!                 │ (one worker task per sink, per-sink FIFO)
//!                 ├─► HttpReportSink ──► SignedTransport ──► remote
//!                 │        │                                   │
//!                 │        └◄── response body ◄────────────────┘
//!                 │             │
//!                 │             ▼
//!                 │        QuickOpResolver ──► Session.apply(op)
//!                 │
//!                 └─► PersistentPeerSink ──► open duplex channel
//!
//! caller ──► Gateway.handle(call)
//!                 │ readiness gate → auth → action lookup
//!                 ▼
//!            Session.invoke(action, call) ──► response envelope
//! ```
//!
//! ## Guarantees
//!
//! - **Best-effort delivery**: a push sink retries a bounded number of times,
//!   then drops the event. Nothing is persisted.
//! - **Sink isolation**: one sink's failure or retry loop never delays the
//!   session's producer or any other sink.
//! - **Per-sink ordering**: events reach a single sink in publish order.
//! - **Always one envelope**: the gateway never raises at the boundary —
//!   auth failures, unknown actions, and pre-login calls are all encoded as
//!   well-formed responses.

pub mod bridge;
pub mod bus;
pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod params;
pub mod quick;
pub mod session;
pub mod signing;
pub mod sink;
pub mod transport;

pub use bridge::{Bridge, PeerChannel};
pub use bus::EventBus;
pub use config::{Config, RetryPolicy, SinkConfig, TransportKind};
pub use error::DeliveryError;
pub use event::Event;
pub use gateway::{Gateway, GatewayResponse, InboundCall, Readiness};
pub use params::Param;
pub use quick::{QuickAction, QuickOpResolver, QuickOperation};
pub use session::Session;
pub use sink::{EventSink, HttpReportSink, PersistentPeerSink};
pub use transport::SignedTransport;
