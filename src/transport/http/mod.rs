//! HTTP transport implementation.
//!
//! This module provides the reqwest-backed [`Transport`]. Bodies arrive already
//! signed; the transport only checks the target URL, sends and collects the reply.

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::config::HttpConfig;
use crate::{
    error::{Result, SimplePayError},
    transport::{Transport, TransportResponse},
};

/// Validates the target URL.
///
/// Only HTTPS targets are accepted: the body carries the merchant's payment data.
fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)
        .map_err(|e| SimplePayError::TransportError(format!("invalid gateway URL '{url}': {e}")))?;

    if parsed.scheme() != "https" {
        return Err(SimplePayError::TransportError(format!(
            "only HTTPS gateway URLs are allowed, got: {}",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none() {
        return Err(SimplePayError::TransportError(format!("gateway URL missing host: {url}")));
    }

    Ok(parsed)
}

/// reqwest transport with connection pooling.
///
/// Cloning is cheap; clones share the underlying connection pool.
///
/// # Examples
///
/// ```
/// use simplepay::transport::{HttpConfig, HttpTransport};
///
/// let config = HttpConfig { timeout_secs: 20, ..Default::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with [`HttpConfig::default`] settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built (for example when no TLS
    /// backend can be initialised).
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Creates a transport from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::ConfigError`] for out-of-range settings and
    /// [`SimplePayError::HttpError`] if client creation fails.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.as_str());
        }

        let client = builder.build().map_err(SimplePayError::HttpError)?;

        Ok(Self { client })
    }

    /// Wraps an existing reqwest client, e.g. one shared with the rest of the application.
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, body, headers), fields(body_len = body.len()))]
    async fn post<'a>(
        &'a self,
        url: &'a str,
        body: &'a [u8],
        headers: &'a [(&'a str, &'a str)],
    ) -> Result<TransportResponse> {
        let target = validate_url(url)?;

        let mut request = self.client.post(target);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.body(body.to_vec()).send().await?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_owned()))
            .collect();

        let body = response.bytes().await.map_err(SimplePayError::HttpError)?.to_vec();
        debug!(status, response_len = body.len(), "gateway replied");

        Ok(TransportResponse { status, body, headers })
    }

    fn protocol_name(&self) -> &'static str {
        "https"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_new() {
        let transport = HttpTransport::new();
        assert!(transport.is_ok());
        assert_eq!(transport.unwrap().protocol_name(), "https");
    }

    #[test]
    fn test_http_transport_rejects_invalid_config() {
        let config = HttpConfig { timeout_secs: 0, ..Default::default() };
        let result = HttpTransport::with_config(&config);
        assert!(matches!(result.unwrap_err(), SimplePayError::ConfigError(_)));
    }

    #[test]
    fn test_http_transport_from_client() {
        let transport = HttpTransport::from_client(Client::new());
        let debug_str = format!("{transport:?}");
        assert!(debug_str.contains("HttpTransport"));
    }

    #[test]
    fn test_validate_url_https_required() {
        assert!(validate_url("https://sandbox.simplepay.hu/payment/v2/start").is_ok());

        let result = validate_url("http://sandbox.simplepay.hu/payment/v2/start");
        assert!(matches!(result.unwrap_err(), SimplePayError::TransportError(_)));
    }

    #[test]
    fn test_validate_url_rejects_garbage() {
        assert!(validate_url("not-a-url").is_err());
        assert!(validate_url("file:///etc/passwd").is_err());
    }

    #[tokio::test]
    async fn test_post_rejects_plain_http_without_network() {
        let transport = HttpTransport::new().unwrap();
        let result = transport.post("http://example.com/start", b"{}", &[]).await;
        assert!(matches!(result.unwrap_err(), SimplePayError::TransportError(_)));
    }
}
