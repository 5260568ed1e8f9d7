//! HMAC-SHA1 signing for pushed event bodies.
//!
//! The signature is computed over the exact outbound bytes — never a
//! re-serialized representation — so the receiver can verify it against
//! the body it read off the wire.

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the body signature when a sink has a shared secret.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Header carrying the account identity of the sending session.
pub const SELF_ID_HEADER: &str = "X-Self-ID";

/// User agent announced on push deliveries.
pub const USER_AGENT: &str = "CQHttp/4.15.0";

/// Compute the `X-Signature` value for a body: `sha1=<hex hmac-sha1>`.
///
/// Pure function of `secret` and `body`.
pub fn signature(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).expect("hmac accepts keys of any length");
    mac.update(body);
    format!("sha1={}", hex::encode(mac.finalize().into_bytes()))
}
