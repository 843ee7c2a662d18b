//! Void a transaction.
//!
//! A cancel names its transaction either by gateway identifier or by order
//! reference, never both. [`CancelTarget`] holds whichever was set last.

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    SDK_VERSION,
    error::{Result, SimplePayError},
    merchant::{Currency, EnvironmentConfig, MerchantCredential},
    models::{CancelResponse, GatewayResponse},
    signature::generate_salt,
    transaction::{Operation, OperationKind, SignedRequest, Transaction},
    transport::{HttpTransport, Transport},
};

/// Cancel operation descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Cancel;

impl Operation for Cancel {
    const KIND: OperationKind = OperationKind::Cancel;
    type Request = CancelRequest;
    type Response = CancelResponse;

    fn validate(request: &CancelRequest) -> Result<()> {
        if request.target.is_set() {
            Ok(())
        } else {
            Err(SimplePayError::ValidationError(
                "cancel needs a transaction id or an order reference".to_owned(),
            ))
        }
    }
}

/// Which transaction a cancel applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CancelTarget {
    /// Nothing chosen yet.
    #[default]
    Unset,
    /// Gateway transaction identifier.
    TransactionId(u64),
    /// Merchant order reference.
    OrderRef(String),
}

impl CancelTarget {
    /// Returns `true` when the target names a transaction.
    ///
    /// Identifier `0` and an empty reference name nothing.
    #[must_use]
    pub fn is_set(&self) -> bool {
        match self {
            Self::Unset => false,
            Self::TransactionId(id) => *id != 0,
            Self::OrderRef(order_ref) => !order_ref.is_empty(),
        }
    }
}

// Written as zero or one map entry so it can be flattened into the request.
impl Serialize for CancelTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Self::Unset => {}
            Self::TransactionId(id) => map.serialize_entry("transactionId", id)?,
            Self::OrderRef(order_ref) => map.serialize_entry("orderRef", order_ref)?,
        }
        map.end()
    }
}

/// Body of a cancel request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    /// Per-request random salt.
    pub salt: String,
    /// Merchant identifier.
    pub merchant: String,
    /// Transaction to cancel.
    #[serde(flatten)]
    pub target: CancelTarget,
    /// Transaction currency.
    pub currency: Currency,
    /// Client identification.
    pub sdk_version: String,
}

impl CancelRequest {
    /// Creates a request with a fresh salt and no target.
    #[must_use]
    pub fn new(merchant_id: &str) -> Self {
        Self {
            salt: generate_salt(),
            merchant: merchant_id.to_owned(),
            target: CancelTarget::Unset,
            currency: Currency::Huf,
            sdk_version: SDK_VERSION.to_owned(),
        }
    }
}

/// Builder for a cancel.
///
/// # Examples
///
/// ```rust,no_run
/// use simplepay::{
///     merchant::{Currency, EnvironmentConfig, MerchantCredential},
///     operations::CancelTransaction,
/// };
///
/// # async fn example() -> simplepay::error::Result<()> {
/// let merchant = MerchantCredential::sandbox(Currency::Huf);
/// let mut cancel = CancelTransaction::new(merchant, &EnvironmentConfig::sandbox())?;
///
/// cancel.set_order_ref("order-1");
/// let reply = cancel.cancel().await?.into_result()?;
/// println!("status: {:?}", reply.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CancelTransaction<T = HttpTransport> {
    base: Transaction<Cancel, T>,
    request: CancelRequest,
    response: Option<GatewayResponse<CancelResponse>>,
}

impl CancelTransaction<HttpTransport> {
    /// Creates a cancel builder over a default [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(merchant: MerchantCredential, environment: &EnvironmentConfig) -> Result<Self> {
        Ok(Self::with_transport(merchant, environment, HttpTransport::new()?))
    }
}

impl<T: Transport> CancelTransaction<T> {
    /// Creates a cancel builder over an explicit transport.
    #[must_use]
    pub fn with_transport(
        merchant: MerchantCredential,
        environment: &EnvironmentConfig,
        transport: T,
    ) -> Self {
        let request = CancelRequest::new(merchant.merchant_id());
        Self {
            base: Transaction::with_transport(merchant, environment, transport),
            request,
            response: None,
        }
    }

    /// Targets the transaction by gateway identifier, replacing any order reference.
    pub fn set_transaction_id(&mut self, transaction_id: u64) -> &mut Self {
        self.request.target = CancelTarget::TransactionId(transaction_id);
        self
    }

    /// Targets the transaction by order reference, replacing any identifier.
    pub fn set_order_ref(&mut self, order_ref: impl Into<String>) -> &mut Self {
        self.request.target = CancelTarget::OrderRef(order_ref.into());
        self
    }

    /// Sets the transaction currency.
    pub fn set_currency(&mut self, currency: Currency) -> &mut Self {
        self.request.currency = currency;
        self
    }

    /// Checks that a target is set.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::ValidationError`] when no target is set.
    pub fn validate(&self) -> Result<()> {
        Cancel::validate(&self.request)
    }

    /// Request as it stands.
    #[must_use]
    pub const fn request(&self) -> &CancelRequest {
        &self.request
    }

    /// Reply to the last [`cancel`](Self::cancel) call.
    #[must_use]
    pub const fn response(&self) -> Option<&GatewayResponse<CancelResponse>> {
        self.response.as_ref()
    }

    /// Validates and signs the request without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::ValidationError`] when no target is set.
    pub fn prepare(&self) -> Result<SignedRequest> {
        self.base.prepare(&self.request)
    }

    /// Sends the cancel.
    ///
    /// # Errors
    ///
    /// - [`SimplePayError::ValidationError`] when no target is set; nothing is sent
    /// - transport errors if the exchange fails or the reply is not JSON
    pub async fn cancel(&mut self) -> Result<GatewayResponse<CancelResponse>> {
        let response = self.base.run(&self.request).await?;
        self.response = Some(response.clone());
        Ok(response)
    }
}
