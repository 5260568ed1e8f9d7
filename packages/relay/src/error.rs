//! Structured delivery errors.
//!
//! A `DeliveryError` never crosses to the session or to other sinks — the
//! sink that hit it logs it and moves on. The variants exist so callers and
//! tests can pattern-match on what actually happened.

use thiserror::Error;

/// Why one delivery attempt (or a whole delivery) failed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The HTTP exchange itself failed: connect error, timeout, bad DNS.
    #[error("request to {destination} failed: {source}")]
    Request {
        destination: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status.
    #[error("{destination} answered with status {status}")]
    Status {
        destination: String,
        status: reqwest::StatusCode,
    },

    /// Every attempt allowed by the sink's retry policy failed.
    #[error("gave up on {destination} after {attempts} attempts: {last}")]
    Exhausted {
        destination: String,
        attempts: u32,
        #[source]
        last: Box<DeliveryError>,
    },
}

impl DeliveryError {
    /// Total attempts made, when this error ends a delivery.
    pub fn attempts(&self) -> u32 {
        match self {
            DeliveryError::Exhausted { attempts, .. } => *attempts,
            _ => 1,
        }
    }
}
