//! GitHub webhook signature verification using HMAC-SHA256.
//!
//! GitHub signs deliveries with the hook's shared secret and sends the
//! signature in the `X-Hub-Signature-256` header as `sha256=<hex>`. When a
//! webhook secret is configured, every GitHub notification must carry a
//! valid signature; without one, deliveries are accepted unsigned.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Why a delivery failed signature verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("missing X-Hub-Signature-256 header")]
    Missing,

    #[error("invalid webhook signature")]
    Invalid,
}

/// Parses a GitHub signature header (e.g., "sha256=abc123...") into raw bytes.
///
/// Returns `None` for malformed headers (missing prefix, invalid hex, etc.).
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.trim().strip_prefix("sha256=")?;
    hex::decode(hex_sig).ok()
}

/// Computes the `sha256=<hex>` header value GitHub would send for `payload`.
pub fn sign_payload(payload: &[u8], secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a signature header against the payload and secret.
///
/// Uses constant-time comparison.
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let Some(expected) = parse_signature_header(signature_header) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

/// Applies the configured verification policy to a delivery.
///
/// With no secret configured every delivery passes.
pub fn check_delivery(
    payload: &[u8],
    signature_header: Option<&str>,
    secret: Option<&str>,
) -> Result<(), SignatureError> {
    let Some(secret) = secret else {
        return Ok(());
    };
    let header = signature_header.ok_or(SignatureError::Missing)?;
    if verify_signature(payload, header, secret.as_bytes()) {
        Ok(())
    } else {
        Err(SignatureError::Invalid)
    }
}
