//! Look up transaction status.
//!
//! Order references and transaction identifiers are collected on the builder and
//! copied into the request only when [`QueryTransaction::query`] runs; the request
//! is validated after that copy.

use serde::Serialize;

use crate::{
    SDK_VERSION,
    error::{Result, SimplePayError},
    merchant::{EnvironmentConfig, MerchantCredential},
    models::{GatewayResponse, QueryResponse},
    signature::generate_salt,
    transaction::{Operation, OperationKind, SignedRequest, Transaction},
    transport::{HttpTransport, Transport},
};

/// Query operation descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Query;

impl Operation for Query {
    const KIND: OperationKind = OperationKind::Query;
    type Request = QueryRequest;
    type Response = QueryResponse;

    fn validate(request: &QueryRequest) -> Result<()> {
        let has_any = |ids: &Option<Vec<String>>| ids.as_ref().is_some_and(|ids| !ids.is_empty());

        if has_any(&request.order_refs) || has_any(&request.transaction_ids) {
            Ok(())
        } else {
            Err(SimplePayError::ValidationError(
                "query needs at least one order reference or transaction id".to_owned(),
            ))
        }
    }
}

/// Body of a query request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Merchant identifier.
    pub merchant: String,
    /// Per-request random salt.
    pub salt: String,
    /// Client identification.
    pub sdk_version: String,
    /// Ask for the detailed transaction view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed: Option<bool>,
    /// Order references to look up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_refs: Option<Vec<String>>,
    /// Transaction identifiers to look up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_ids: Option<Vec<String>>,
}

impl QueryRequest {
    /// Creates a request with a fresh salt and nothing to look up.
    #[must_use]
    pub fn new(merchant_id: &str) -> Self {
        Self {
            merchant: merchant_id.to_owned(),
            salt: generate_salt(),
            sdk_version: SDK_VERSION.to_owned(),
            detailed: None,
            order_refs: None,
            transaction_ids: None,
        }
    }
}

/// Builder for a status query.
///
/// # Examples
///
/// ```rust,no_run
/// use simplepay::{
///     merchant::{Currency, EnvironmentConfig, MerchantCredential},
///     operations::QueryTransaction,
/// };
///
/// # async fn example() -> simplepay::error::Result<()> {
/// let merchant = MerchantCredential::sandbox(Currency::Huf);
/// let mut query = QueryTransaction::new(merchant, &EnvironmentConfig::sandbox())?;
///
/// query.add_order_ref("order-1").add_transaction_id(501_234_567);
/// let reply = query.query(true).await?.into_result()?;
/// println!("{} transactions", reply.total_count);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct QueryTransaction<T = HttpTransport> {
    base: Transaction<Query, T>,
    request: QueryRequest,
    order_refs: Vec<String>,
    transaction_ids: Vec<String>,
    response: Option<GatewayResponse<QueryResponse>>,
}

impl QueryTransaction<HttpTransport> {
    /// Creates a query builder over a default [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(merchant: MerchantCredential, environment: &EnvironmentConfig) -> Result<Self> {
        Ok(Self::with_transport(merchant, environment, HttpTransport::new()?))
    }
}

impl<T: Transport> QueryTransaction<T> {
    /// Creates a query builder over an explicit transport.
    #[must_use]
    pub fn with_transport(
        merchant: MerchantCredential,
        environment: &EnvironmentConfig,
        transport: T,
    ) -> Self {
        let request = QueryRequest::new(merchant.merchant_id());
        Self {
            base: Transaction::with_transport(merchant, environment, transport),
            request,
            order_refs: Vec::new(),
            transaction_ids: Vec::new(),
            response: None,
        }
    }

    /// Adds an order reference to look up. Duplicates are ignored.
    pub fn add_order_ref(&mut self, order_ref: impl Into<String>) -> &mut Self {
        let order_ref = order_ref.into();
        if !self.order_refs.contains(&order_ref) {
            self.order_refs.push(order_ref);
        }
        self
    }

    /// Adds a transaction identifier to look up. Duplicates are ignored.
    pub fn add_transaction_id(&mut self, transaction_id: impl ToString) -> &mut Self {
        let transaction_id = transaction_id.to_string();
        if !self.transaction_ids.contains(&transaction_id) {
            self.transaction_ids.push(transaction_id);
        }
        self
    }

    /// Order references collected so far, in insertion order.
    #[must_use]
    pub fn order_refs(&self) -> &[String] {
        &self.order_refs
    }

    /// Transaction identifiers collected so far, in insertion order.
    #[must_use]
    pub fn transaction_ids(&self) -> &[String] {
        &self.transaction_ids
    }

    /// Request as last sent, or as created if [`query`](Self::query) never ran.
    #[must_use]
    pub const fn request(&self) -> &QueryRequest {
        &self.request
    }

    /// Reply to the last [`query`](Self::query) call.
    #[must_use]
    pub const fn response(&self) -> Option<&GatewayResponse<QueryResponse>> {
        self.response.as_ref()
    }

    /// Checks the request as last copied by [`query`](Self::query).
    ///
    /// Identifiers added since that copy are not seen; on a fresh builder this
    /// always fails.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::ValidationError`] when the request has no order
    /// reference and no transaction id.
    pub fn validate(&self) -> Result<()> {
        Query::validate(&self.request)
    }

    /// Validates, serializes and signs the request as last copied by
    /// [`query`](Self::query), without sending it.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate), plus serialization failures.
    pub fn prepare(&self) -> Result<SignedRequest> {
        self.base.prepare(&self.request)
    }

    /// Copies the collected identifiers into the request and sends it.
    ///
    /// `detailed` asks for the detailed transaction view. Both lists are always
    /// written, even when empty, before the request is validated.
    ///
    /// # Errors
    ///
    /// - [`SimplePayError::ValidationError`] when both lists are empty; nothing is sent
    /// - transport errors if the exchange fails or the reply is not JSON
    pub async fn query(&mut self, detailed: bool) -> Result<GatewayResponse<QueryResponse>> {
        if detailed {
            self.request.detailed = Some(true);
        }
        self.request.order_refs = Some(self.order_refs.clone());
        self.request.transaction_ids = Some(self.transaction_ids.clone());

        let response = self.base.run(&self.request).await?;
        self.response = Some(response.clone());
        Ok(response)
    }
}
