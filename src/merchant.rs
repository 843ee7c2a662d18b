//! Merchant identities and gateway environments.
//!
//! A [`MerchantCredential`] pairs the merchant identifier sent in every payload with
//! the secret that signs it. Credentials are plain read-only values handed to each
//! operation; nothing here is global or mutable.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Endpoint prefix of the sandbox gateway.
pub const SANDBOX_URL_PREFIX: &str = "https://sandbox.simplepay.hu/payment/v2/";

/// Endpoint prefix of the live gateway.
pub const LIVE_URL_PREFIX: &str = "https://secure.simplepay.hu/payment/v2/";

/// Settlement currency of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Hungarian forint.
    #[default]
    Huf,
    /// Euro.
    Eur,
    /// US dollar.
    Usd,
}

impl Currency {
    /// ISO 4217 code as sent on the wire.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Huf => "HUF",
            Self::Eur => "EUR",
            Self::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Public test account of the sandbox gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxMerchant {
    /// Merchant identifier.
    pub merchant_id: &'static str,
    /// Signing secret.
    pub secret: &'static str,
    /// Currency the account settles in.
    pub currency: Currency,
}

/// Sandbox test merchant settling in HUF.
pub const SANDBOX_HUF: SandboxMerchant = SandboxMerchant {
    merchant_id: "PUBLICTESTHUF",
    secret: "FxDa5w314kLlNseq2sKuVwaqZshZT5d6",
    currency: Currency::Huf,
};

/// Sandbox test merchant settling in EUR.
pub const SANDBOX_EUR: SandboxMerchant = SandboxMerchant {
    merchant_id: "PUBLICTESTEUR",
    secret: "9A2sDc7xh1JKW8r193RwW7X7X2ts837w",
    currency: Currency::Eur,
};

/// Sandbox test merchant settling in USD.
pub const SANDBOX_USD: SandboxMerchant = SandboxMerchant {
    merchant_id: "PUBLICTESTUSD",
    secret: "Aa9cDbHc1i2lLmN4z3C542zjXqZiDiCj",
    currency: Currency::Usd,
};

/// The sandbox gateway's public test merchants, one per currency.
pub const SANDBOX_MERCHANTS: [SandboxMerchant; 3] = [SANDBOX_HUF, SANDBOX_EUR, SANDBOX_USD];

/// A merchant identifier and the secret that signs its requests.
///
/// The secret is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct MerchantCredential {
    merchant_id: String,
    secret: Zeroizing<String>,
}

impl MerchantCredential {
    /// Creates a credential from an identifier and secret.
    ///
    /// # Examples
    ///
    /// ```
    /// use simplepay::merchant::MerchantCredential;
    ///
    /// let merchant = MerchantCredential::new("PUBLICTESTHUF", "FxDa5w314kLlNseq2sKuVwaqZshZT5d6");
    /// assert_eq!(merchant.merchant_id(), "PUBLICTESTHUF");
    /// ```
    #[must_use]
    pub fn new(merchant_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self { merchant_id: merchant_id.into(), secret: Zeroizing::new(secret.into()) }
    }

    /// Returns the sandbox test merchant settling in `currency`.
    #[must_use]
    pub fn sandbox(currency: Currency) -> Self {
        let merchant = match currency {
            Currency::Huf => &SANDBOX_HUF,
            Currency::Eur => &SANDBOX_EUR,
            Currency::Usd => &SANDBOX_USD,
        };
        Self::from(merchant)
    }

    /// Looks a sandbox merchant up by identifier.
    #[must_use]
    pub fn sandbox_by_id(merchant_id: &str) -> Option<Self> {
        SANDBOX_MERCHANTS.iter().find(|m| m.merchant_id == merchant_id).map(Self::from)
    }

    /// Merchant identifier sent as the `merchant` field.
    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Signing secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl From<&SandboxMerchant> for MerchantCredential {
    fn from(merchant: &SandboxMerchant) -> Self {
        Self::new(merchant.merchant_id, merchant.secret)
    }
}

impl fmt::Debug for MerchantCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantCredential")
            .field("merchant_id", &self.merchant_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Selects which gateway host receives requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    url_prefix: String,
}

impl EnvironmentConfig {
    /// Sandbox gateway.
    #[must_use]
    pub fn sandbox() -> Self {
        Self { url_prefix: SANDBOX_URL_PREFIX.to_owned() }
    }

    /// Live gateway.
    #[must_use]
    pub fn live() -> Self {
        Self { url_prefix: LIVE_URL_PREFIX.to_owned() }
    }

    /// Custom endpoint prefix, e.g. a recording proxy in front of the sandbox.
    ///
    /// A trailing `/` is appended when missing so operation suffixes join cleanly.
    #[must_use]
    pub fn with_prefix(url_prefix: impl Into<String>) -> Self {
        let mut url_prefix = url_prefix.into();
        if !url_prefix.ends_with('/') {
            url_prefix.push('/');
        }
        Self { url_prefix }
    }

    /// Endpoint prefix all operation suffixes are appended to.
    #[must_use]
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Returns `true` for the sandbox preset.
    #[must_use]
    pub fn is_sandbox(&self) -> bool {
        self.url_prefix == SANDBOX_URL_PREFIX
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self::live()
    }
}
