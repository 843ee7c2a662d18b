//! Client configuration.
//!
//! This module defines the TOML-deserializable configuration of a client: which
//! gateway to talk to, which merchant signs, and how the HTTP client behaves.
//!
//! Secrets never appear in the file. Live secrets are read from the environment
//! variable named by `merchant.secret_env`; sandbox merchants fall back to the
//! public sandbox table.
//!
//! # Examples
//!
//! ```
//! use simplepay::config::ClientConfig;
//!
//! let toml = r#"
//!     environment = "sandbox"
//!
//!     [merchant]
//!     id = "PUBLICTESTHUF"
//! "#;
//!
//! let config = ClientConfig::from_toml(toml).unwrap();
//! let merchant = config.merchant_credential().unwrap();
//! assert_eq!(merchant.merchant_id(), "PUBLICTESTHUF");
//! assert!(config.environment_config().is_sandbox());
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::{
    error::{Result, SimplePayError},
    merchant::{EnvironmentConfig, MerchantCredential},
    transport::{HttpConfig, HttpTransport},
};

/// Gateway environment preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Test gateway.
    #[default]
    Sandbox,
    /// Production gateway.
    Live,
}

/// Root client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Gateway preset.
    #[serde(default)]
    pub environment: Environment,

    /// Overrides the preset's endpoint prefix.
    #[serde(default)]
    pub url_prefix: Option<String>,

    /// Signing merchant.
    pub merchant: MerchantSection,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// The `[merchant]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MerchantSection {
    /// Merchant identifier.
    pub id: String,

    /// Environment variable holding the secret.
    #[serde(default)]
    pub secret_env: Option<String>,
}

impl ClientConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::ConfigError`] if the document does not parse or
    /// fails [`validate`](Self::validate).
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml)
            .map_err(|e| SimplePayError::ConfigError(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::ConfigError`] if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SimplePayError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Validates the configuration.
    ///
    /// This method checks for:
    /// - a non-empty merchant id
    /// - `url_prefix`, when set, is an HTTPS URL ending with `/`
    /// - `secret_env`, when set, is a valid environment variable name
    /// - HTTP settings within bounds
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::ConfigError`] if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.merchant.id.trim().is_empty() {
            return Err(SimplePayError::ConfigError("merchant.id cannot be empty".to_owned()));
        }

        if let Some(prefix) = &self.url_prefix {
            validate_url_prefix(prefix)?;
        }

        if let Some(name) = &self.merchant.secret_env {
            validate_env_var_name(name)?;
        }

        self.http.validate()
    }

    /// Endpoint prefix selected by `environment` and `url_prefix`.
    #[must_use]
    pub fn environment_config(&self) -> EnvironmentConfig {
        match (&self.url_prefix, self.environment) {
            (Some(prefix), _) => EnvironmentConfig::with_prefix(prefix.as_str()),
            (None, Environment::Sandbox) => EnvironmentConfig::sandbox(),
            (None, Environment::Live) => EnvironmentConfig::live(),
        }
    }

    /// Resolves the merchant's secret.
    ///
    /// With `secret_env` set the secret comes from that variable. Without it, only
    /// a sandbox configuration naming a public sandbox merchant resolves.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::ConfigError`] if the variable is unset or empty, or
    /// if no secret source applies.
    pub fn merchant_credential(&self) -> Result<MerchantCredential> {
        self.resolve_credential(|name| std::env::var(name).ok())
    }

    fn resolve_credential(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<MerchantCredential> {
        if let Some(name) = &self.merchant.secret_env {
            let secret = lookup(name).ok_or_else(|| {
                SimplePayError::ConfigError(format!("cannot read secret from ${name}"))
            })?;
            if secret.trim().is_empty() {
                return Err(SimplePayError::ConfigError(format!("${name} is empty")));
            }
            return Ok(MerchantCredential::new(self.merchant.id.as_str(), secret));
        }

        if self.environment == Environment::Sandbox
            && let Some(credential) = MerchantCredential::sandbox_by_id(&self.merchant.id)
        {
            return Ok(credential);
        }

        Err(SimplePayError::ConfigError(format!(
            "no secret for merchant '{}': set merchant.secret_env",
            self.merchant.id
        )))
    }

    /// Builds the HTTP transport from the `[http]` table.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn http_transport(&self) -> Result<HttpTransport> {
        HttpTransport::with_config(&self.http)
    }
}

fn validate_url_prefix(prefix: &str) -> Result<()> {
    let url = Url::parse(prefix)
        .map_err(|e| SimplePayError::ConfigError(format!("invalid url_prefix '{prefix}': {e}")))?;

    if url.scheme() != "https" {
        return Err(SimplePayError::ConfigError(format!(
            "url_prefix must use HTTPS, got: {}",
            url.scheme()
        )));
    }

    if !prefix.ends_with('/') {
        return Err(SimplePayError::ConfigError(format!("url_prefix must end with '/': {prefix}")));
    }

    Ok(())
}

/// Validates an environment variable name.
fn validate_env_var_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(SimplePayError::ConfigError(
            "environment variable name cannot be empty".to_owned(),
        ));
    };

    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(SimplePayError::ConfigError(format!(
            "environment variable name must start with letter or underscore: {name}"
        )));
    }

    if let Some(ch) = chars.find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_') {
        return Err(SimplePayError::ConfigError(format!(
            "environment variable name contains invalid character '{ch}': {name}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merchant::{LIVE_URL_PREFIX, SANDBOX_URL_PREFIX};

    #[test]
    fn test_minimal_sandbox_config() {
        let config = ClientConfig::from_toml("[merchant]\nid = \"PUBLICTESTEUR\"").unwrap();

        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.http, HttpConfig::default());
        assert_eq!(config.environment_config().url_prefix(), SANDBOX_URL_PREFIX);

        let merchant = config.merchant_credential().unwrap();
        assert_eq!(merchant.secret(), "9A2sDc7xh1JKW8r193RwW7X7X2ts837w");
    }

    #[test]
    fn test_live_config_resolves_secret_by_name() {
        let toml = r#"
            environment = "live"

            [merchant]
            id = "SHOP42"
            secret_env = "SIMPLEPAY_CONFIG_TEST_SECRET"

            [http]
            timeout_secs = 20
        "#;
        let config = ClientConfig::from_toml(toml).unwrap();
        assert_eq!(config.environment_config().url_prefix(), LIVE_URL_PREFIX);
        assert_eq!(config.http.timeout_secs, 20);

        let merchant = config
            .resolve_credential(|name| {
                (name == "SIMPLEPAY_CONFIG_TEST_SECRET").then(|| "live-secret".to_owned())
            })
            .unwrap();
        assert_eq!(merchant.merchant_id(), "SHOP42");
        assert_eq!(merchant.secret(), "live-secret");

        let empty = config.resolve_credential(|_| Some("  ".to_owned()));
        assert!(matches!(empty.unwrap_err(), SimplePayError::ConfigError(msg) if msg.contains("empty")));
    }

    #[test]
    fn test_missing_secret_env_var() {
        let toml = r#"
            [merchant]
            id = "SHOP42"
            secret_env = "SIMPLEPAY_CONFIG_TEST_UNSET_SECRET"
        "#;
        let config = ClientConfig::from_toml(toml).unwrap();
        assert!(matches!(config.merchant_credential().unwrap_err(), SimplePayError::ConfigError(_)));
    }

    #[test]
    fn test_live_without_secret_env_fails() {
        let toml = r#"
            environment = "live"
            [merchant]
            id = "PUBLICTESTHUF"
        "#;
        let config = ClientConfig::from_toml(toml).unwrap();
        let err = config.merchant_credential().unwrap_err();
        assert!(matches!(err, SimplePayError::ConfigError(msg) if msg.contains("secret_env")));
    }

    #[test]
    fn test_unknown_sandbox_merchant_fails() {
        let config = ClientConfig::from_toml("[merchant]\nid = \"NOTATESTMERCHANT\"").unwrap();
        assert!(config.merchant_credential().is_err());
    }

    #[test]
    fn test_url_prefix_override() {
        let toml = r#"
            url_prefix = "https://proxy.example.com/simplepay/v2/"
            [merchant]
            id = "PUBLICTESTHUF"
        "#;
        let config = ClientConfig::from_toml(toml).unwrap();
        assert_eq!(config.environment_config().url_prefix(), "https://proxy.example.com/simplepay/v2/");
    }

    #[test]
    fn test_url_prefix_validation() {
        for bad in ["http://proxy.example.com/v2/", "https://proxy.example.com/v2", "not a url"] {
            let toml = format!("url_prefix = \"{bad}\"\n[merchant]\nid = \"M\"");
            assert!(
                matches!(ClientConfig::from_toml(&toml).unwrap_err(), SimplePayError::ConfigError(_)),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn test_validate_env_var_name() {
        assert!(validate_env_var_name("SIMPLEPAY_SECRET").is_ok());
        assert!(validate_env_var_name("_PRIVATE_1").is_ok());
        assert!(validate_env_var_name("").is_err());
        assert!(validate_env_var_name("1SECRET").is_err());
        assert!(validate_env_var_name("SECRET;rm").is_err());
        assert!(validate_env_var_name("SECRET-KEY").is_err());
    }

    #[test]
    fn test_rejects_empty_merchant_id() {
        assert!(ClientConfig::from_toml("[merchant]\nid = \"  \"").is_err());
    }

    #[test]
    fn test_rejects_unknown_environment() {
        let err = ClientConfig::from_toml("environment = \"staging\"\n[merchant]\nid = \"M\"");
        assert!(matches!(err.unwrap_err(), SimplePayError::ConfigError(msg) if msg.contains("TOML")));
    }

    #[test]
    fn test_invalid_http_section() {
        let toml = "[merchant]\nid = \"M\"\n[http]\ntimeout_secs = 0";
        assert!(ClientConfig::from_toml(toml).is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let err = ClientConfig::from_file("/nonexistent/simplepay.toml").unwrap_err();
        assert!(matches!(err, SimplePayError::ConfigError(msg) if msg.contains("cannot read")));
    }

    #[test]
    fn test_http_transport_from_config() {
        let config = ClientConfig::from_toml("[merchant]\nid = \"PUBLICTESTHUF\"").unwrap();
        assert!(config.http_transport().is_ok());
    }
}
