//! Operation builders.
//!
//! One builder per gateway operation. Each is created with its defaults filled in,
//! configured through setters that check their own input, and finished with a
//! terminal call ([`StartTransaction::card`], [`RefundTransaction::refund`],
//! [`CancelTransaction::cancel`], [`QueryTransaction::query`]) that hands the
//! request to the shared [`Transaction`](crate::transaction::Transaction) flow.
//!
//! Builders own their request. Concurrent operations never share mutable state, so
//! any number may be in flight over clones of the same transport.

use serde::{Deserialize, Serialize};

pub mod cancel;
pub mod query;
pub mod refund;
pub mod start;

pub use cancel::{Cancel, CancelRequest, CancelTarget, CancelTransaction};
pub use query::{Query, QueryRequest, QueryTransaction};
pub use refund::{Refund, RefundRequest, RefundTransaction};
pub use start::{DEFAULT_CALLBACK_URL, Start, StartRequest, StartTransaction};

/// Language of the hosted payment page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(missing_docs, reason = "ISO 639-1 codes are self-describing")]
pub enum Language {
    Ar,
    Bg,
    Cs,
    De,
    En,
    Es,
    Fr,
    It,
    Hr,
    #[default]
    Hu,
    Pl,
    Ro,
    Ru,
    Sk,
    Tr,
    Zh,
}

/// Payment method offered on the payment page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Card payment.
    Card,
    /// Bank transfer.
    Wire,
}

/// Billing details attached to a start request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Customer name.
    pub name: String,
    /// Company name.
    pub company: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    /// State or county.
    pub state: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub zip: String,
    /// Street address.
    pub address: String,
    /// Second address line.
    pub address2: String,
    /// Phone number.
    pub phone: String,
}
