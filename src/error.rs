//! Error types for the SimplePay client.
//!
//! This module defines all error types that can occur while building, signing and
//! sending gateway requests. All errors implement the standard [`std::error::Error`]
//! trait via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Input Errors** ([`SimplePayError::FormatError`]): a mutator rejected a value
//! - **Validation Errors** ([`SimplePayError::ValidationError`]): the finished request
//!   fails its operation's predicate, nothing was sent
//! - **Network Errors** ([`SimplePayError::HttpError`], [`SimplePayError::TransportError`]):
//!   the exchange with the gateway did not complete
//! - **Gateway Errors** ([`SimplePayError::GatewayError`]): the gateway answered with
//!   `errorCodes`; only produced on request via
//!   [`GatewayResponse::into_result`](crate::models::GatewayResponse::into_result)
//!
//! # Examples
//!
//! ```
//! use simplepay::error::{Result, SimplePayError};
//!
//! fn require_order_ref(order_ref: &str) -> Result<&str> {
//!     if order_ref.is_empty() {
//!         return Err(SimplePayError::ValidationError("orderRef is required".to_owned()));
//!     }
//!     Ok(order_ref)
//! }
//!
//! assert!(require_order_ref("").is_err());
//! ```

use thiserror::Error;

/// Result type alias for SimplePay operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, SimplePayError>;

/// Errors that can occur while talking to the SimplePay gateway.
///
/// # Error Recovery
///
/// - **Input errors** ([`FormatError`](Self::FormatError)): fix the value and call the
///   mutator again, the request payload was left untouched
/// - **Validation errors** ([`ValidationError`](Self::ValidationError)): set the missing
///   fields and re-invoke the terminal action
/// - **Transient errors** ([`HttpError`](Self::HttpError)): rebuild and resend; the
///   client never retries on its own
/// - **Gateway errors** ([`GatewayError`](Self::GatewayError)): look the codes up in the
///   gateway documentation
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum SimplePayError {
    /// A field mutator received a syntactically invalid value.
    ///
    /// Raised synchronously by the mutator (for example a malformed customer email).
    /// The request payload is not modified.
    ///
    /// # Examples
    ///
    /// ```
    /// use simplepay::error::SimplePayError;
    ///
    /// let err = SimplePayError::FormatError("invalid email syntax: not-an-email".to_owned());
    /// assert!(err.to_string().contains("Invalid field format"));
    /// ```
    #[error("Invalid field format: {0}")]
    FormatError(String),

    /// The finished request failed its operation's validation predicate.
    ///
    /// No network call was made.
    ///
    /// # Recovery
    ///
    /// - Cancel: set either a transaction id or an order reference
    /// - Query: add at least one order reference or transaction id
    #[error("Request validation failed: {0}")]
    ValidationError(String),

    /// HTTP request failed.
    ///
    /// Wraps [`reqwest::Error`]. Common causes include timeouts, refused connections,
    /// DNS resolution failures and TLS errors.
    ///
    /// # Recovery
    ///
    /// Reconstruct the operation and resend. Each transaction carries its own salt, so a
    /// fresh builder produces a fresh signature.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The transport failed without an underlying HTTP client error.
    ///
    /// Common causes include a rejected target URL (non-HTTPS) or a response body that
    /// is not the JSON shape of the operation.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The gateway rejected the request with the given error codes.
    ///
    /// The transaction flow itself resolves gateway rejections as a normal
    /// [`GatewayResponse::Error`](crate::models::GatewayResponse::Error); this variant only
    /// appears when the caller converts with
    /// [`into_result`](crate::models::GatewayResponse::into_result).
    #[error("Gateway rejected the request with error codes {0:?}")]
    GatewayError(Vec<u32>),

    /// The request payload could not be serialized.
    #[error("Request serialization failed: {0}")]
    SerializationError(String),

    /// Invalid client configuration.
    ///
    /// # Recovery
    ///
    /// Check the TOML file and make sure the merchant secret environment variable is set.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A gateway callback (back redirect or IPN) failed verification.
    ///
    /// Either the signature does not match the merchant secret or the payload is
    /// malformed. Treat the callback as forged and do not fulfil the order.
    #[error("Callback verification failed: {0}")]
    CallbackError(String),
}

impl SimplePayError {
    /// Returns `true` if the error was raised before anything was sent to the gateway.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::FormatError(_)
                | Self::ValidationError(_)
                | Self::SerializationError(_)
                | Self::ConfigError(_)
        )
    }
}
