//! Quick operations: follow-up actions decoded from delivery responses.
//!
//! When a push sink delivers an event, the remote's response body may carry
//! an instruction to apply back to the originating event — reply to the
//! message, delete it, ban the sender. This is best-effort, fire-and-forget:
//! an absent, empty, or malformed body simply yields no instruction, and a
//! failure to apply the instruction is logged and never retried.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::event::Event;
use crate::session::Session;

/// The recognized follow-up fields. All optional; a response may set any
/// subset of them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuickAction {
    /// Reply to the originating message. Either a plain string or
    /// structured message segments.
    pub reply: Option<Value>,
    /// Send `reply` as literal text, without parsing markup.
    pub auto_escape: Option<bool>,
    /// Mention the sender in the reply.
    pub at_sender: Option<bool>,
    /// Recall the originating message.
    pub delete: Option<bool>,
    /// Remove the sender from the group.
    pub kick: Option<bool>,
    /// Mute the sender.
    pub ban: Option<bool>,
    /// Mute duration in seconds.
    pub ban_duration: Option<i64>,
    /// Accept or reject a request-type event.
    pub approve: Option<bool>,
    /// Remark to set when approving a friend request.
    pub remark: Option<String>,
    /// Reason to attach when rejecting a request.
    pub reason: Option<String>,
}

impl QuickAction {
    /// True when no recognized field is set.
    pub fn is_empty(&self) -> bool {
        *self == QuickAction::default()
    }
}

/// One follow-up instruction, bound to the event that triggered it.
#[derive(Debug, Clone)]
pub struct QuickOperation {
    /// The originating event, so the session can match the instruction back
    /// to its source message.
    pub event: Arc<Event>,
    pub action: QuickAction,
}

/// Interprets sink response bodies and submits the resulting instruction to
/// the session.
#[derive(Clone)]
pub struct QuickOpResolver {
    session: Arc<dyn Session>,
}

impl QuickOpResolver {
    pub fn new(session: Arc<dyn Session>) -> Self {
        Self { session }
    }

    /// Decode a response body into at most one instruction for `event`.
    ///
    /// Empty, malformed, or unrecognized bodies yield `None` — never an
    /// error.
    pub fn resolve(event: &Arc<Event>, body: &str) -> Option<QuickOperation> {
        if body.trim().is_empty() {
            return None;
        }
        let action: QuickAction = match serde_json::from_str(body) {
            Ok(action) => action,
            Err(_) => return None,
        };
        if action.is_empty() {
            return None;
        }
        Some(QuickOperation {
            event: event.clone(),
            action,
        })
    }

    /// Resolve `body` and, if it carries an instruction, submit it to the
    /// session. Submission failure is logged, never surfaced to the sink.
    pub async fn handle_response(&self, event: &Arc<Event>, body: &str) {
        let Some(op) = Self::resolve(event, body) else {
            return;
        };
        debug!(self_id = op.event.self_id(), "applying quick operation");
        if let Err(err) = self.session.apply(op).await {
            warn!(error = %err, "failed to apply quick operation");
        }
    }
}
