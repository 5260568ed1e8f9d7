//! Signed HTTP delivery with bounded retry.
//!
//! One shared `reqwest` client performs every push. The body goes out
//! byte-exact, with the `X-Self-ID` identity header and, when the sink has
//! a shared secret, an `X-Signature` HMAC over those same bytes. Network
//! errors, timeouts, and non-success statuses are retried per the sink's
//! policy; exhausting retries means "this sink missed this event", nothing
//! more.

use bytes::Bytes;
use reqwest::header;
use tracing::warn;

use crate::config::SinkConfig;
use crate::error::DeliveryError;
use crate::signing;

/// Stateless signed-POST helper shared by all push sinks.
#[derive(Debug, Clone, Default)]
pub struct SignedTransport {
    client: reqwest::Client,
}

impl SignedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `body` to the sink's destination, retrying per its policy.
    ///
    /// Returns the response body text on success, or the terminal error
    /// after the final attempt. The caller decides how loudly to log it.
    pub async fn deliver(
        &self,
        sink: &SinkConfig,
        self_id: i64,
        body: &Bytes,
    ) -> Result<String, DeliveryError> {
        let mut attempt = 1u32;
        loop {
            match self.attempt(sink, self_id, body).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < sink.retry.max_attempts => {
                    let wait = sink.retry.wait_after(attempt);
                    warn!(
                        destination = %sink.destination,
                        attempt,
                        error = %err,
                        "event delivery failed, will retry"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(DeliveryError::Exhausted {
                        destination: sink.destination.clone(),
                        attempts: attempt,
                        last: Box::new(err),
                    })
                }
            }
        }
    }

    async fn attempt(
        &self,
        sink: &SinkConfig,
        self_id: i64,
        body: &Bytes,
    ) -> Result<String, DeliveryError> {
        let mut request = self
            .client
            .post(&sink.destination)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, signing::USER_AGENT)
            .header(signing::SELF_ID_HEADER, self_id.to_string())
            .timeout(sink.timeout)
            // The exact bytes: the signature is over them.
            .body(body.clone());
        if let Some(secret) = &sink.secret {
            request = request.header(signing::SIGNATURE_HEADER, signing::signature(secret, body));
        }

        let response = request.send().await.map_err(|source| DeliveryError::Request {
            destination: sink.destination.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status {
                destination: sink.destination.clone(),
                status,
            });
        }

        response.text().await.map_err(|source| DeliveryError::Request {
            destination: sink.destination.clone(),
            source,
        })
    }
}
