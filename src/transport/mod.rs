//! Transport abstraction.
//!
//! The transaction flow treats the network as a single capability: POST a body with
//! headers to a URL and hand back whatever came back. [`HttpTransport`] implements it
//! with reqwest; tests substitute an in-memory implementation.
//!
//! Transports do not sign, retry or interpret the body. Signing happens in
//! [`Transaction`](crate::transaction::Transaction) before the transport sees the
//! request, and each call is exactly one outbound exchange.
//!
//! # Examples
//!
//! ```rust,no_run
//! use simplepay::transport::{HttpTransport, Transport};
//!
//! # async fn example() -> simplepay::error::Result<()> {
//! let transport = HttpTransport::new()?;
//! let response = transport
//!     .post(
//!         "https://sandbox.simplepay.hu/payment/v2/query",
//!         b"{}",
//!         &[("Content-Type", "application/json")],
//!     )
//!     .await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;
use std::sync::Arc;

use crate::error::Result;

pub mod config;
pub mod http;

pub use config::HttpConfig;
pub use http::HttpTransport;

/// Response from a transport exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
    /// Response headers.
    pub headers: Vec<(String, String)>,
}

impl TransportResponse {
    /// Returns the first header named `name`, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    /// Returns `true` for 2xx status codes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Outbound request capability.
///
/// Implementations must send `body` unmodified: the `Signature` header was computed
/// over these exact bytes.
pub trait Transport: Send + Sync {
    /// Sends a POST request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns error if the exchange cannot be completed.
    fn post<'a>(
        &'a self,
        url: &'a str,
        body: &'a [u8],
        headers: &'a [(&'a str, &'a str)],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Returns the protocol name for logging.
    fn protocol_name(&self) -> &'static str;
}

impl<T: Transport> Transport for Arc<T> {
    fn post<'a>(
        &'a self,
        url: &'a str,
        body: &'a [u8],
        headers: &'a [(&'a str, &'a str)],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a {
        T::post(self, url, body, headers)
    }

    fn protocol_name(&self) -> &'static str {
        T::protocol_name(self)
    }
}
