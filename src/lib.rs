//! SimplePay v2 Client Library
//!
//! Builds signed requests for the SimplePay card-payment gateway, sends them through
//! a pluggable transport and parses the gateway's replies into typed results.
//!
//! # Overview
//!
//! Every request body is JSON signed with HMAC-SHA384 under the merchant secret; the
//! base64 signature travels in the `Signature` header. Four operations are
//! supported, each with its own builder:
//!
//! - [`StartTransaction`]: start a payment and obtain the payment page URL
//! - [`RefundTransaction`]: refund a finished payment
//! - [`CancelTransaction`]: void a transaction by id or order reference
//! - [`QueryTransaction`]: look up transaction status
//!
//! The gateway's follow-up callbacks (back redirect and IPN) are verified by the
//! [`callback`] module.
//!
//! # Examples
//!
//! ```no_run
//! use simplepay::{
//!     EnvironmentConfig, MerchantCredential, StartTransaction,
//!     merchant::Currency,
//! };
//!
//! # async fn example() -> simplepay::Result<()> {
//! let merchant = MerchantCredential::sandbox(Currency::Huf);
//! let mut start = StartTransaction::new(merchant, &EnvironmentConfig::sandbox())?;
//!
//! start.set_order_ref("order-1").set_total(1000);
//! start.set_customer_email("customer@example.com")?;
//!
//! match start.card().await? {
//!     simplepay::GatewayResponse::Success(reply) => println!("pay at {}", reply.payment_url),
//!     simplepay::GatewayResponse::Error(error) => println!("rejected: {:?}", error.error_codes),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and tracing-subscriber"
)]

pub mod callback;
pub mod config;
pub mod error;
pub mod merchant;
pub mod models;
pub mod observability;
pub mod operations;
pub mod signature;
pub mod timestamp;
pub mod transaction;
pub mod transport;

pub use error::{Result, SimplePayError};
pub use merchant::{EnvironmentConfig, MerchantCredential};
pub use models::GatewayResponse;
pub use operations::{CancelTransaction, QueryTransaction, RefundTransaction, StartTransaction};

/// Client identification sent as `sdkVersion` with every request.
pub const SDK_VERSION: &str = concat!("simplepay-rs ", env!("CARGO_PKG_VERSION"));
