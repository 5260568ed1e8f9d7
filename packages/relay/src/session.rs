//! Interface to the external session engine.
//!
//! The session owns the connection to the messaging network: it produces
//! the event stream, executes actions from its registry, and accepts
//! quick-operation feedback. This crate only consumes it through this
//! trait; the engine itself lives elsewhere.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::gateway::InboundCall;
use crate::quick::QuickOperation;

/// Retcode encoded into the result mapping for an unknown action name.
pub const RETCODE_UNKNOWN_ACTION: i64 = 1404;

/// The stateful session this crate bridges.
///
/// Implementations must be cheap to share (`Arc`) and safe to call from
/// concurrent gateway handlers and sink workers.
#[async_trait]
pub trait Session: Send + Sync {
    /// Resolve `action` against the session's action registry and invoke it
    /// with the call's parameter bag.
    ///
    /// Returns `None` when the registry has no such action; the gateway
    /// encodes that as a failed result mapping, never a transport error.
    async fn invoke(&self, action: &str, call: &InboundCall) -> Option<Value>;

    /// Apply a quick-operation instruction derived from a sink's delivery
    /// response. Failures are logged by the caller and never retried.
    async fn apply(&self, op: QuickOperation) -> anyhow::Result<()>;
}

/// Successful result mapping wrapping `data`.
pub fn ok(data: Value) -> Value {
    json!({
        "status": "ok",
        "retcode": 0,
        "data": data,
    })
}

/// Failed result mapping with the given retcode.
pub fn failed(retcode: i64) -> Value {
    json!({
        "status": "failed",
        "retcode": retcode,
        "data": null,
    })
}
