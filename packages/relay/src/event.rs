//! Immutable event records produced by the session.
//!
//! The body is kept as the exact bytes the session serialized. Sinks must
//! send it unmodified: the receiving side verifies the HMAC signature over
//! the bytes it gets, so any re-serialization would break verification.

use bytes::Bytes;

/// One thing the session observed (message, notice, meta-event).
///
/// Read-only to the bus and to sinks; dropped once every sink has finished
/// with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    body: Bytes,
    self_id: i64,
    echo: Option<String>,
}

impl Event {
    /// Wrap a serialized event body owned by the account `self_id`.
    pub fn new(self_id: i64, body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            self_id,
            echo: None,
        }
    }

    /// Tag this event as the response to an earlier request with the given
    /// echo/request id.
    pub fn with_echo(mut self, echo: impl Into<String>) -> Self {
        self.echo = Some(echo.into());
        self
    }

    /// The exact serialized body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The account this event belongs to.
    pub fn self_id(&self) -> i64 {
        self.self_id
    }

    /// Echo/request id, present when the event answers a prior operation.
    pub fn echo(&self) -> Option<&str> {
        self.echo.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_bytes_are_untouched() {
        let raw = br#"{"post_type":"message","message":"hi"}"#.to_vec();
        let event = Event::new(10001, raw.clone());
        assert_eq!(event.body().as_ref(), raw.as_slice());
        assert_eq!(event.self_id(), 10001);
        assert!(event.echo().is_none());
    }

    #[test]
    fn test_echo_tag() {
        let event = Event::new(1, "{}").with_echo("req-42");
        assert_eq!(event.echo(), Some("req-42"));
    }
}
