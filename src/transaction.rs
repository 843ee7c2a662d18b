//! Shared transaction flow.
//!
//! Every gateway call follows the same path: validate the finished request,
//! serialize it once, sign those exact bytes with the merchant secret, POST them to
//! the operation's endpoint and parse whatever JSON comes back. The per-operation
//! differences (endpoint, payload shape, validation rule, reply shape) live in an
//! [`Operation`] descriptor; [`Transaction`] runs the flow for any descriptor.
//!
//! # Examples
//!
//! ```rust,no_run
//! use simplepay::{
//!     merchant::{Currency, EnvironmentConfig, MerchantCredential},
//!     operations::query::{Query, QueryRequest},
//!     transaction::Transaction,
//! };
//!
//! # async fn example() -> simplepay::error::Result<()> {
//! let merchant = MerchantCredential::sandbox(Currency::Huf);
//! let transaction = Transaction::<Query>::new(merchant.clone(), &EnvironmentConfig::sandbox())?;
//!
//! let mut request = QueryRequest::new(merchant.merchant_id());
//! request.order_refs = Some(vec!["order-1".to_owned()]);
//!
//! let reply = transaction.run(&request).await?;
//! println!("error reply: {}", reply.is_error());
//! # Ok(())
//! # }
//! ```

use std::{fmt, marker::PhantomData};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{Result, SimplePayError},
    merchant::{EnvironmentConfig, MerchantCredential},
    models::GatewayResponse,
    signature,
    transport::{HttpTransport, Transport},
};

/// Name of the request header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "Signature";

const JSON_CONTENT_TYPE: &str = "application/json";

/// The four gateway operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Start a payment.
    Start,
    /// Refund a finished payment.
    Refund,
    /// Void a transaction.
    Cancel,
    /// Look up transaction status.
    Query,
}

impl OperationKind {
    /// Endpoint suffix appended to the environment's URL prefix.
    #[must_use]
    pub const fn endpoint_suffix(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Refund => "refund",
            Self::Cancel => "transactioncancel",
            Self::Query => "query",
        }
    }

    /// Short lowercase name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Refund => "refund",
            Self::Cancel => "cancel",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Describes one gateway operation.
///
/// Implementors are zero-sized markers. The default [`validate`](Operation::validate)
/// accepts every request; operations with required fields override it.
pub trait Operation {
    /// Which operation this is; selects the endpoint.
    const KIND: OperationKind;

    /// Request payload sent as the JSON body.
    type Request: Serialize;

    /// Success shape of the gateway's reply.
    type Response: DeserializeOwned;

    /// Checks the finished request before anything is signed or sent.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::ValidationError`] when a required field is missing.
    fn validate(request: &Self::Request) -> Result<()> {
        let _ = request;
        Ok(())
    }
}

/// A request ready to go on the wire.
///
/// `signature` was computed over exactly `body`; sending any other bytes under it
/// is rejected by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Full endpoint URL.
    pub url: String,
    /// Serialized JSON body.
    pub body: String,
    /// Base64 HMAC-SHA384 of `body`.
    pub signature: String,
}

impl SignedRequest {
    /// Headers the gateway requires alongside the body.
    #[must_use]
    pub fn headers(&self) -> [(&str, &str); 2] {
        [(SIGNATURE_HEADER, self.signature.as_str()), ("Content-Type", JSON_CONTENT_TYPE)]
    }
}

/// Runs the validate, sign, send, parse flow for operation `O` over transport `T`.
///
/// The merchant and endpoint are fixed at construction. Each [`run`](Self::run) is
/// one independent exchange; nothing is retried or remembered.
pub struct Transaction<O, T = HttpTransport> {
    merchant: MerchantCredential,
    remote_url: String,
    transport: T,
    operation: PhantomData<fn() -> O>,
}

impl<O: Operation> Transaction<O, HttpTransport> {
    /// Creates a transaction over a default [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(merchant: MerchantCredential, environment: &EnvironmentConfig) -> Result<Self> {
        Ok(Self::with_transport(merchant, environment, HttpTransport::new()?))
    }
}

impl<O: Operation, T: Transport> Transaction<O, T> {
    /// Creates a transaction over an explicit transport.
    #[must_use]
    pub fn with_transport(
        merchant: MerchantCredential,
        environment: &EnvironmentConfig,
        transport: T,
    ) -> Self {
        let remote_url = format!("{}{}", environment.url_prefix(), O::KIND.endpoint_suffix());
        Self { merchant, remote_url, transport, operation: PhantomData }
    }

    /// Merchant whose secret signs the requests.
    #[must_use]
    pub const fn merchant(&self) -> &MerchantCredential {
        &self.merchant
    }

    /// Endpoint the requests are posted to.
    #[must_use]
    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    /// Transport the requests go through.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Validates, serializes and signs `request` without sending it.
    ///
    /// # Errors
    ///
    /// - [`SimplePayError::ValidationError`] if the operation rejects the request
    /// - [`SimplePayError::SerializationError`] if the payload cannot be encoded
    pub fn prepare(&self, request: &O::Request) -> Result<SignedRequest> {
        O::validate(request)?;

        let body = serde_json::to_string(request).map_err(|e| {
            SimplePayError::SerializationError(format!("cannot encode {} request: {e}", O::KIND))
        })?;
        let signature = signature::sign(self.merchant.secret(), body.as_bytes());

        Ok(SignedRequest { url: self.remote_url.clone(), body, signature })
    }

    /// Sends `request` and parses the reply.
    ///
    /// The reply is parsed whatever the HTTP status: the gateway reports business
    /// failures as an `errorCodes` body, which comes back as
    /// [`GatewayResponse::Error`] rather than as an `Err`.
    ///
    /// # Errors
    ///
    /// - [`SimplePayError::ValidationError`] if the operation rejects the request;
    ///   nothing is sent
    /// - [`SimplePayError::HttpError`] / [`SimplePayError::TransportError`] if the
    ///   exchange fails
    /// - [`SimplePayError::TransportError`] if the reply is not JSON of either shape
    #[instrument(
        skip(self, request),
        fields(operation = %O::KIND, merchant = self.merchant.merchant_id(), url = %self.remote_url)
    )]
    pub async fn run(&self, request: &O::Request) -> Result<GatewayResponse<O::Response>> {
        let signed = self.prepare(request)?;
        debug!(
            body_len = signed.body.len(),
            protocol = self.transport.protocol_name(),
            "sending signed request"
        );

        let headers = signed.headers();
        let response = self.transport.post(&signed.url, signed.body.as_bytes(), &headers).await?;
        info!(status = response.status, "gateway replied");

        let parsed: GatewayResponse<O::Response> =
            serde_json::from_slice(&response.body).map_err(|e| {
                SimplePayError::TransportError(format!(
                    "unexpected {} reply (HTTP {}): {e}",
                    O::KIND,
                    response.status
                ))
            })?;

        if let Some(codes) = parsed.error_codes() {
            warn!(?codes, status = response.status, "gateway returned error codes");
        } else if !response.is_success() {
            warn!(status = response.status, "non-2xx status with a success-shaped body");
        }

        Ok(parsed)
    }
}

impl<O: Operation, T> fmt::Debug for Transaction<O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("operation", &O::KIND)
            .field("merchant", &self.merchant)
            .field("remote_url", &self.remote_url)
            .finish_non_exhaustive()
    }
}
