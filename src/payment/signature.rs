//! HMAC-SHA256 proof-of-payment verification.
//!
//! The payment provider signs `orderId + "|" + paymentId` with the key
//! secret it shares with this service. Verification recomputes the MAC
//! server-side and compares in constant time; any mismatch is a hard
//! rejection with no ledger effect.

use crate::error::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex MAC of an arbitrary message under `secret`.
///
/// # Errors
///
/// Returns [`Error::Config`] if the key cannot be initialized.
pub fn mac_hex(secret: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Config(format!("invalid HMAC key: {e}")))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a hex MAC over `message` in constant time.
///
/// # Errors
///
/// Returns [`Error::InvalidSignature`] if the signature is not valid hex of
/// the right length or does not match; [`Error::Config`] if the key cannot
/// be initialized.
pub fn verify_mac(secret: &str, message: &str, signature_hex: &str) -> Result<()> {
    let signature = hex::decode(signature_hex).map_err(|_| Error::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Config(format!("invalid HMAC key: {e}")))?;
    mac.update(message.as_bytes());
    mac.verify_slice(&signature).map_err(|_| Error::InvalidSignature)
}

/// Sign an (order, payment) pair the way the provider does.
///
/// Exposed for tests and tooling; the service itself only verifies.
///
/// # Errors
///
/// Returns [`Error::Config`] if the key cannot be initialized.
pub fn sign_order(secret: &str, order_id: &str, payment_id: &str) -> Result<String> {
    mac_hex(secret, &format!("{order_id}|{payment_id}"))
}

/// Verify a client-supplied proof-of-payment signature.
///
/// # Errors
///
/// Returns [`Error::InvalidSignature`] on any mismatch.
pub fn verify_order(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature_hex: &str,
) -> Result<()> {
    verify_mac(secret, &format!("{order_id}|{payment_id}"), signature_hex)
}
