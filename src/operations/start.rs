//! Start a payment.

use std::sync::LazyLock;

use chrono::{DateTime, Local, TimeZone};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Invoice, Language, PaymentMethod};
use crate::{
    SDK_VERSION,
    error::{Result, SimplePayError},
    merchant::{Currency, EnvironmentConfig, MerchantCredential},
    models::{GatewayResponse, StartResponse},
    signature::generate_salt,
    timestamp::to_iso_string_with_timezone,
    transaction::{Operation, OperationKind, SignedRequest, Transaction},
    transport::{HttpTransport, Transport},
};

/// Callback URL used until [`StartTransaction::set_url`] overrides it.
pub const DEFAULT_CALLBACK_URL: &str = "http://localhost:8000/back";

#[allow(clippy::expect_used, reason = "pattern is a compile-time literal")]
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Start operation descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Start;

impl Operation for Start {
    const KIND: OperationKind = OperationKind::Start;
    type Request = StartRequest;
    type Response = StartResponse;
}

/// Body of a start request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    /// Per-request random salt.
    pub salt: String,
    /// Merchant identifier.
    pub merchant: String,
    /// Transaction currency.
    pub currency: Currency,
    /// Payment page language.
    pub language: Language,
    /// Client identification.
    pub sdk_version: String,
    /// Amount as text, e.g. `"1000"` or `"12.5"`.
    pub total: String,
    /// Where the customer is redirected after paying.
    pub url: String,
    /// Payment page expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    /// Customer email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    /// Merchant-side order identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_ref: Option<String>,
    /// Offered payment methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<PaymentMethod>>,
    /// Billing details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
}

impl StartRequest {
    /// Creates a request with a fresh salt and the gateway defaults.
    #[must_use]
    pub fn new(merchant_id: &str) -> Self {
        Self {
            salt: generate_salt(),
            merchant: merchant_id.to_owned(),
            currency: Currency::Huf,
            language: Language::Hu,
            sdk_version: SDK_VERSION.to_owned(),
            total: "0".to_owned(),
            url: DEFAULT_CALLBACK_URL.to_owned(),
            timeout: None,
            customer_email: None,
            order_ref: None,
            methods: None,
            invoice: None,
        }
    }
}

/// Builder for a payment start.
///
/// # Examples
///
/// ```rust,no_run
/// use chrono::{Duration, Local};
/// use simplepay::{
///     merchant::{Currency, EnvironmentConfig, MerchantCredential},
///     operations::StartTransaction,
/// };
///
/// # async fn example() -> simplepay::error::Result<()> {
/// let merchant = MerchantCredential::sandbox(Currency::Huf);
/// let mut start = StartTransaction::new(merchant, &EnvironmentConfig::sandbox())?;
///
/// start
///     .set_customer_email("customer@example.com")?
///     .set_order_ref("order-1")
///     .set_total(1000)
///     .set_timeout(&(Local::now() + Duration::minutes(30)));
///
/// let reply = start.card().await?.into_result()?;
/// println!("redirect to {}", reply.payment_url);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StartTransaction<T = HttpTransport> {
    base: Transaction<Start, T>,
    request: StartRequest,
    response: Option<GatewayResponse<StartResponse>>,
}

impl StartTransaction<HttpTransport> {
    /// Creates a start builder over a default [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(merchant: MerchantCredential, environment: &EnvironmentConfig) -> Result<Self> {
        Ok(Self::with_transport(merchant, environment, HttpTransport::new()?))
    }
}

impl<T: Transport> StartTransaction<T> {
    /// Creates a start builder over an explicit transport.
    #[must_use]
    pub fn with_transport(
        merchant: MerchantCredential,
        environment: &EnvironmentConfig,
        transport: T,
    ) -> Self {
        let request = StartRequest::new(merchant.merchant_id());
        Self {
            base: Transaction::with_transport(merchant, environment, transport),
            request,
            response: None,
        }
    }

    /// Sets when the payment page expires.
    ///
    /// The instant is written in the host's local offset
    /// (`2024-05-01T14:30:00+02:00` on a CEST host) whatever zone `date` carries.
    pub fn set_timeout<Tz: TimeZone>(&mut self, date: &DateTime<Tz>) -> &mut Self {
        self.request.timeout = Some(to_iso_string_with_timezone(&date.with_timezone(&Local)));
        self
    }

    /// Sets the customer email.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::FormatError`] unless `email` looks like
    /// `local@domain.tld`; the request is left unchanged.
    pub fn set_customer_email(&mut self, email: &str) -> Result<&mut Self> {
        if !EMAIL.is_match(email) {
            return Err(SimplePayError::FormatError(format!("invalid email syntax: '{email}'")));
        }
        self.request.customer_email = Some(email.to_owned());
        Ok(self)
    }

    /// Sets the payment total, stored as its shortest decimal text.
    ///
    /// Integers and [`Decimal`] convert directly. Floats go through
    /// `Decimal::try_from`, which fails on NaN and infinities:
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// # use simplepay::{EnvironmentConfig, MerchantCredential, StartTransaction, merchant::Currency};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let mut start = StartTransaction::new(MerchantCredential::sandbox(Currency::Huf), &EnvironmentConfig::sandbox())?;
    /// start.set_total(Decimal::try_from(12.5_f64)?);
    /// assert_eq!(start.request().total, "12.5");
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_total(&mut self, total: impl Into<Decimal>) -> &mut Self {
        self.request.total = total.into().normalize().to_string();
        self
    }

    /// Sets the merchant-side order identifier.
    pub fn set_order_ref(&mut self, order_ref: impl Into<String>) -> &mut Self {
        self.request.order_ref = Some(order_ref.into());
        self
    }

    /// Sets the transaction currency.
    pub fn set_currency(&mut self, currency: Currency) -> &mut Self {
        self.request.currency = currency;
        self
    }

    /// Sets the payment page language.
    pub fn set_language(&mut self, language: Language) -> &mut Self {
        self.request.language = language;
        self
    }

    /// Overrides the callback URL the customer returns to.
    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.request.url = url.into();
        self
    }

    /// Sets the offered payment methods.
    pub fn set_methods(&mut self, methods: Vec<PaymentMethod>) -> &mut Self {
        self.request.methods = Some(methods);
        self
    }

    /// Attaches billing details.
    pub fn set_invoice(&mut self, invoice: Invoice) -> &mut Self {
        self.request.invoice = Some(invoice);
        self
    }

    /// Request as it stands.
    #[must_use]
    pub const fn request(&self) -> &StartRequest {
        &self.request
    }

    /// Reply to the last [`card`](Self::card) call.
    #[must_use]
    pub const fn response(&self) -> Option<&GatewayResponse<StartResponse>> {
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

    /// Starts a card payment.
    ///
    /// Offers `CARD` unless methods were set explicitly. Missing order reference or
    /// total is not checked here; the gateway reports it as an error reply.
    ///
    /// # Errors
    ///
    /// Returns error if the exchange fails or the reply is not JSON.
    pub async fn card(&mut self) -> Result<GatewayResponse<StartResponse>> {
        if self.request.methods.is_none() {
            self.request.methods = Some(vec![PaymentMethod::Card]);
        }

        let response = self.base.run(&self.request).await?;
        self.response = Some(response.clone());
        Ok(response)
    }
}
