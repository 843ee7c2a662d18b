//! Gateway response models.
//!
//! Each operation has a typed success shape. Any reply may instead be the error
//! shape `{ "errorCodes": [...] }`; [`GatewayResponse`] captures both without
//! deciding for the caller which one is a failure.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::{Result, SimplePayError},
    merchant::Currency,
};

/// Reply of the gateway: either the operation's success shape or the error shape.
///
/// The error shape is tried first: error replies echo `salt`, `merchant` and
/// `orderRef`, so they would otherwise partially match lenient success shapes.
///
/// # Examples
///
/// ```
/// use simplepay::models::{CancelResponse, GatewayResponse};
///
/// let reply: GatewayResponse<CancelResponse> =
///     serde_json::from_str(r#"{"errorCodes":[5321]}"#).unwrap();
/// assert!(reply.is_error());
/// assert_eq!(reply.error_codes(), Some(&[5321][..]));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GatewayResponse<T> {
    /// The gateway rejected the request.
    Error(ErrorResponse),
    /// The operation's success payload.
    Success(T),
}

impl<T> GatewayResponse<T> {
    /// Returns `true` when the gateway answered with `errorCodes`.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the gateway error codes, if any.
    #[must_use]
    pub fn error_codes(&self) -> Option<&[u32]> {
        match self {
            Self::Error(error) => Some(&error.error_codes),
            Self::Success(_) => None,
        }
    }

    /// Returns the success payload, if any.
    #[must_use]
    pub const fn success(&self) -> Option<&T> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::Error(_) => None,
        }
    }

    /// Converts the error shape into [`SimplePayError::GatewayError`].
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::GatewayError`] carrying the gateway's error codes.
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Error(error) => Err(SimplePayError::GatewayError(error.error_codes)),
        }
    }
}

/// Error shape returned when the gateway rejects a request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Gateway error codes.
    pub error_codes: Vec<u32>,
    /// Echoed salt.
    #[serde(default)]
    pub salt: Option<String>,
    /// Echoed merchant identifier.
    #[serde(default)]
    pub merchant: Option<String>,
    /// Echoed order reference.
    #[serde(default)]
    pub order_ref: Option<String>,
}

/// Reply to a start request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    /// Gateway salt.
    pub salt: String,
    /// Merchant identifier.
    pub merchant: String,
    /// Order reference of the started payment.
    pub order_ref: String,
    /// Transaction currency.
    pub currency: Currency,
    /// Gateway transaction identifier.
    pub transaction_id: u64,
    /// Payment page expiry.
    pub timeout: String,
    /// Payment total.
    #[serde(with = "amount")]
    pub total: Decimal,
    /// URL of the hosted payment page the customer is sent to.
    pub payment_url: String,
}

/// Reply to a refund request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    /// Gateway salt.
    pub salt: String,
    /// Merchant identifier.
    pub merchant: String,
    /// Order reference of the refunded payment.
    pub order_ref: String,
    /// Transaction currency.
    pub currency: Currency,
    /// Gateway identifier of the original transaction.
    pub transaction_id: u64,
    /// Gateway identifier of the refund itself.
    pub refund_transaction_id: u64,
    /// Refunded amount.
    #[serde(with = "amount")]
    pub refund_total: Decimal,
    /// Amount still refundable.
    #[serde(with = "amount")]
    pub remaining_total: Decimal,
}

/// Reply to a cancel request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    /// Gateway salt.
    pub salt: String,
    /// Merchant identifier.
    pub merchant: String,
    /// Gateway transaction identifier.
    pub transaction_id: u64,
    /// Order reference, echoed when the cancel targeted one.
    #[serde(default)]
    pub order_ref: Option<String>,
    /// Status after cancellation.
    pub status: TransactionStatus,
}

/// Reply to a query request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Gateway salt.
    pub salt: String,
    /// Merchant identifier.
    pub merchant: String,
    /// Matching transactions.
    #[serde(default)]
    pub transactions: Vec<QueriedTransaction>,
    /// Number of matching transactions.
    #[serde(default)]
    pub total_count: u32,
}

/// One transaction in a query reply.
///
/// Which fields are present depends on the transaction's state and on whether the
/// query was `detailed`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueriedTransaction {
    /// Gateway salt.
    pub salt: Option<String>,
    /// Merchant identifier.
    pub merchant: Option<String>,
    /// Order reference.
    pub order_ref: Option<String>,
    /// Transaction total.
    #[serde(with = "amount::option")]
    pub total: Option<Decimal>,
    /// Gateway transaction identifier.
    pub transaction_id: Option<u64>,
    /// Current status.
    pub status: Option<TransactionStatus>,
    /// Amount still refundable.
    #[serde(with = "amount::option")]
    pub remaining_total: Option<Decimal>,
    /// When the customer paid.
    pub payment_date: Option<String>,
    /// When the transaction reached its final state.
    pub finish_date: Option<String>,
    /// Payment method used.
    pub method: Option<String>,
}

/// Lifecycle state of a gateway transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// Created, customer not yet on the payment page.
    Init,
    /// Payment page expired.
    Timeout,
    /// Cancelled by customer or merchant.
    Cancelled,
    /// Authorization declined.
    NotAuthorized,
    /// Customer is on the payment page.
    InPayment,
    /// Held for fraud review.
    InFraud,
    /// Authorized, awaiting capture.
    Authorized,
    /// Captured.
    Finished,
    /// Authorization reversed.
    Reversed,
    /// Fully or partially refunded.
    Refund,
    /// A status this client does not know yet.
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    /// Returns `true` once the transaction can no longer change state on its own.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::Cancelled
                | Self::NotAuthorized
                | Self::Finished
                | Self::Reversed
                | Self::Refund
        )
    }
}

/// Amounts travel as JSON numbers; integral values are written without a fraction.
pub(crate) mod amount {
    use std::str::FromStr;

    use rust_decimal::{
        Decimal,
        prelude::{FromPrimitive, ToPrimitive},
    };
    use serde::{Deserialize, Deserializer, Serializer, ser::Error as _};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Integer(i64),
        Float(f64),
        Text(String),
    }

    impl RawAmount {
        fn into_decimal<E: serde::de::Error>(self) -> Result<Decimal, E> {
            match self {
                Self::Integer(value) => Ok(Decimal::from(value)),
                Self::Float(value) => Decimal::from_f64(value)
                    .ok_or_else(|| E::custom(format!("amount out of range: {value}"))),
                Self::Text(value) => Decimal::from_str(value.trim())
                    .map_err(|e| E::custom(format!("invalid amount '{value}': {e}"))),
            }
        }
    }

    pub(crate) fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        if value.fract().is_zero()
            && let Some(integer) = value.to_i64()
        {
            return serializer.serialize_i64(integer);
        }
        let float = value
            .to_f64()
            .ok_or_else(|| S::Error::custom(format!("amount not representable: {value}")))?;
        serializer.serialize_f64(float)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        RawAmount::deserialize(deserializer)?.into_decimal()
    }

    pub(crate) mod option {
        use rust_decimal::Decimal;
        use serde::{Deserialize, Deserializer};

        use super::RawAmount;

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Decimal>, D::Error> {
            Option::<RawAmount>::deserialize(deserializer)?.map(RawAmount::into_decimal).transpose()
        }
    }
}
