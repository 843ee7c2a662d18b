//! Refund a finished payment, fully or partially.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::{
    SDK_VERSION,
    error::Result,
    merchant::{Currency, EnvironmentConfig, MerchantCredential},
    models::{GatewayResponse, RefundResponse, amount},
    signature::generate_salt,
    transaction::{Operation, OperationKind, SignedRequest, Transaction},
    transport::{HttpTransport, Transport},
};

/// Refund operation descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Refund;

impl Operation for Refund {
    const KIND: OperationKind = OperationKind::Refund;
    type Request = RefundRequest;
    type Response = RefundResponse;
}

/// Body of a refund request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    /// Per-request random salt.
    pub salt: String,
    /// Order reference of the payment to refund.
    pub order_ref: String,
    /// Gateway identifier of the payment to refund.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<u64>,
    /// Merchant identifier.
    pub merchant: String,
    /// Transaction currency.
    pub currency: Currency,
    /// Amount to refund.
    #[serde(with = "amount")]
    pub refund_total: Decimal,
    /// Client identification.
    pub sdk_version: String,
}

impl RefundRequest {
    /// Creates a request with a fresh salt, an empty order reference and a zero total.
    #[must_use]
    pub fn new(merchant_id: &str) -> Self {
        Self {
            salt: generate_salt(),
            order_ref: String::new(),
            transaction_id: None,
            merchant: merchant_id.to_owned(),
            currency: Currency::Huf,
            refund_total: Decimal::ZERO,
            sdk_version: SDK_VERSION.to_owned(),
        }
    }
}

/// Builder for a refund.
///
/// No fields are required locally; the gateway rejects refunds it cannot match.
#[derive(Debug)]
pub struct RefundTransaction<T = HttpTransport> {
    base: Transaction<Refund, T>,
    request: RefundRequest,
    response: Option<GatewayResponse<RefundResponse>>,
}

impl RefundTransaction<HttpTransport> {
    /// Creates a refund builder over a default [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(merchant: MerchantCredential, environment: &EnvironmentConfig) -> Result<Self> {
        Ok(Self::with_transport(merchant, environment, HttpTransport::new()?))
    }
}

impl<T: Transport> RefundTransaction<T> {
    /// Creates a refund builder over an explicit transport.
    #[must_use]
    pub fn with_transport(
        merchant: MerchantCredential,
        environment: &EnvironmentConfig,
        transport: T,
    ) -> Self {
        let request = RefundRequest::new(merchant.merchant_id());
        Self {
            base: Transaction::with_transport(merchant, environment, transport),
            request,
            response: None,
        }
    }

    /// Sets the order reference of the payment to refund.
    pub fn set_order_ref(&mut self, order_ref: impl Into<String>) -> &mut Self {
        self.request.order_ref = order_ref.into();
        self
    }

    /// Sets the gateway identifier of the payment to refund.
    pub fn set_transaction_id(&mut self, transaction_id: u64) -> &mut Self {
        self.request.transaction_id = Some(transaction_id);
        self
    }

    /// Sets the amount to refund. Negative amounts are ignored.
    ///
    /// Float amounts convert with `Decimal::try_from(12.5_f64)`, which rejects
    /// NaN and infinities.
    pub fn set_refund_total(&mut self, total: impl Into<Decimal>) -> &mut Self {
        let total = total.into();
        if total < Decimal::ZERO {
            debug!(%total, "ignoring negative refund total");
            return self;
        }
        self.request.refund_total = total;
        self
    }

    /// Sets the transaction currency.
    pub fn set_currency(&mut self, currency: Currency) -> &mut Self {
        self.request.currency = currency;
        self
    }

    /// Request as it stands.
    #[must_use]
    pub const fn request(&self) -> &RefundRequest {
        &self.request
    }

    /// Reply to the last [`refund`](Self::refund) call.
    #[must_use]
    pub const fn response(&self) -> Option<&GatewayResponse<RefundResponse>> {
        self.response.as_ref()
    }

    /// Signs the request as it stands without sending it.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be encoded.
    pub fn prepare(&self) -> Result<SignedRequest> {
        self.base.prepare(&self.request)
    }

    /// Sends the refund.
    ///
    /// # Errors
    ///
    /// Returns error if the exchange fails or the reply is not JSON.
    pub async fn refund(&mut self) -> Result<GatewayResponse<RefundResponse>> {
        let response = self.base.run(&self.request).await?;
        self.response = Some(response.clone());
        Ok(response)
    }
}
