//! Message authentication for gateway payloads.
//!
//! Every request body sent to the gateway carries a `Signature` header: the
//! base64-encoded HMAC-SHA384 of the exact body bytes, keyed with the merchant
//! secret. The same primitive authenticates the gateway's callbacks.
//!
//! # Examples
//!
//! ```
//! use simplepay::signature::{generate_salt, sign, verify};
//!
//! let body = br#"{"salt":"00","merchant":"PUBLICTESTHUF"}"#;
//! let signature = sign("FxDa5w314kLlNseq2sKuVwaqZshZT5d6", body);
//! assert!(verify("FxDa5w314kLlNseq2sKuVwaqZshZT5d6", body, &signature));
//!
//! assert_eq!(generate_salt().len(), 32);
//! ```

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha384;

type HmacSha384 = Hmac<Sha384>;

/// Number of random bytes in a salt.
pub const SALT_BYTES: usize = 16;

#[allow(clippy::expect_used, reason = "HMAC accepts keys of any length")]
fn keyed_mac(secret: &str) -> HmacSha384 {
    HmacSha384::new_from_slice(secret.trim().as_bytes()).expect("HMAC accepts keys of any length")
}

/// Computes the base64-encoded HMAC-SHA384 of `message` keyed with `secret`.
///
/// Leading and trailing whitespace in `secret` is ignored. The function is pure:
/// the same inputs always produce the same signature.
#[must_use]
pub fn sign(secret: &str, message: &[u8]) -> String {
    let mut mac = keyed_mac(secret);
    mac.update(message);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Checks a base64 signature against `message` in constant time.
///
/// Returns `false` for signatures that are not valid base64.
#[must_use]
pub fn verify(secret: &str, message: &[u8], signature: &str) -> bool {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };

    let mut mac = keyed_mac(secret);
    mac.update(message);
    mac.verify_slice(&expected).is_ok()
}

/// Generates a fresh request salt: 16 bytes from the OS CSPRNG, hex-encoded.
#[must_use]
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
