//! Verification of gateway callbacks.
//!
//! After a payment the gateway contacts the merchant twice:
//!
//! - the customer's browser is redirected to the start request's `url` with two
//!   query parameters, `r` (base64 JSON describing the outcome) and `s` (signature
//!   of the decoded JSON); see [`BackRedirect`]
//! - the gateway POSTs an instant payment notification (IPN) to the merchant's
//!   server, signed in the `Signature` header; see [`IpnMessage`]
//!
//! Both are signed with the merchant secret. Nothing is trusted before the
//! signature checks out.
//!
//! # Examples
//!
//! ```
//! use base64::{Engine, engine::general_purpose::STANDARD};
//! use simplepay::{
//!     callback::{BackEvent, BackRedirect},
//!     merchant::{Currency, MerchantCredential},
//!     signature::sign,
//! };
//!
//! let merchant = MerchantCredential::sandbox(Currency::Huf);
//! let json = r#"{"r":0,"t":501234567,"e":"SUCCESS","m":"PUBLICTESTHUF","o":"order-1"}"#;
//! let r = STANDARD.encode(json);
//! let s = sign(merchant.secret(), json.as_bytes());
//!
//! let back = BackRedirect::verify(&merchant, &r, &s).unwrap();
//! assert_eq!(back.event, BackEvent::Success);
//! assert_eq!(back.order_ref, "order-1");
//! ```

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::{
    error::{Result, SimplePayError},
    merchant::MerchantCredential,
    models::TransactionStatus,
    signature, timestamp,
};

/// Outcome reported on the back redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BackEvent {
    /// Payment authorized.
    Success,
    /// Payment declined.
    Fail,
    /// Customer did not finish in time.
    Timeout,
    /// Customer cancelled on the payment page.
    Cancel,
}

/// Verified content of the back redirect's `r` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackRedirect {
    /// Gateway response code.
    #[serde(rename = "r")]
    pub response_code: i64,
    /// Gateway transaction identifier.
    #[serde(rename = "t")]
    pub transaction_id: u64,
    /// What happened.
    #[serde(rename = "e")]
    pub event: BackEvent,
    /// Merchant identifier.
    #[serde(rename = "m")]
    pub merchant: String,
    /// Merchant order reference.
    #[serde(rename = "o")]
    pub order_ref: String,
}

impl BackRedirect {
    /// Decodes `r`, checks `s` against it and checks the merchant.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::CallbackError`] if `r` is not base64 JSON of the
    /// expected shape, the signature does not match, or the redirect names another
    /// merchant.
    #[instrument(skip_all, fields(merchant = merchant.merchant_id()))]
    pub fn verify(merchant: &MerchantCredential, r: &str, s: &str) -> Result<Self> {
        let json = STANDARD
            .decode(r.trim())
            .map_err(|e| SimplePayError::CallbackError(format!("'r' is not base64: {e}")))?;

        if !signature::verify(merchant.secret(), &json, s.trim()) {
            warn!("back redirect signature mismatch");
            return Err(SimplePayError::CallbackError("back redirect signature mismatch".to_owned()));
        }

        let back: Self = serde_json::from_slice(&json).map_err(|e| {
            SimplePayError::CallbackError(format!("unexpected back redirect payload: {e}"))
        })?;
        ensure_merchant(merchant, &back.merchant)?;

        debug!(event = ?back.event, transaction_id = back.transaction_id, "back redirect verified");
        Ok(back)
    }
}

/// Verified instant payment notification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpnMessage {
    /// Gateway salt.
    pub salt: String,
    /// Merchant order reference.
    pub order_ref: String,
    /// Payment method used.
    pub method: String,
    /// Merchant identifier.
    pub merchant: String,
    /// When the transaction reached its final state.
    #[serde(default)]
    pub finish_date: Option<String>,
    /// When the customer paid.
    #[serde(default)]
    pub payment_date: Option<String>,
    /// Gateway transaction identifier.
    pub transaction_id: u64,
    /// Final status.
    pub status: TransactionStatus,
    #[serde(skip)]
    fields: Map<String, Value>,
}

/// Signed acknowledgement of an IPN, returned as the HTTP response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpnConfirmation {
    /// JSON body to return.
    pub body: String,
    /// Value for the `Signature` response header.
    pub signature: String,
}

impl IpnConfirmation {
    /// Response headers the gateway expects.
    #[must_use]
    pub fn headers(&self) -> [(&str, &str); 2] {
        [
            (crate::transaction::SIGNATURE_HEADER, self.signature.as_str()),
            ("Content-Type", "application/json"),
        ]
    }
}

impl IpnMessage {
    /// Checks `signature` over the raw `body` and parses it.
    ///
    /// `body` must be the bytes exactly as received.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::CallbackError`] if the signature does not match,
    /// the body is not an IPN object, or it names another merchant.
    #[instrument(skip_all, fields(merchant = merchant.merchant_id(), body_len = body.len()))]
    pub fn verify(merchant: &MerchantCredential, body: &[u8], signature: &str) -> Result<Self> {
        if !signature::verify(merchant.secret(), body, signature.trim()) {
            warn!("IPN signature mismatch");
            return Err(SimplePayError::CallbackError("IPN signature mismatch".to_owned()));
        }

        let fields: Map<String, Value> = serde_json::from_slice(body)
            .map_err(|e| SimplePayError::CallbackError(format!("IPN body is not a JSON object: {e}")))?;
        let mut message: Self = serde_json::from_value(Value::Object(fields.clone()))
            .map_err(|e| SimplePayError::CallbackError(format!("unexpected IPN payload: {e}")))?;
        ensure_merchant(merchant, &message.merchant)?;
        message.fields = fields;

        debug!(
            transaction_id = message.transaction_id,
            status = ?message.status,
            "IPN verified"
        );
        Ok(message)
    }

    /// Builds the acknowledgement: the received fields plus `receiveDate`, signed.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::SerializationError`] if the body cannot be encoded.
    pub fn confirm(
        &self,
        merchant: &MerchantCredential,
        receive_date: &str,
    ) -> Result<IpnConfirmation> {
        let mut fields = self.fields.clone();
        fields.insert("receiveDate".to_owned(), Value::String(receive_date.to_owned()));

        let body = serde_json::to_string(&fields).map_err(|e| {
            SimplePayError::SerializationError(format!("cannot encode IPN confirmation: {e}"))
        })?;
        let signature = signature::sign(merchant.secret(), body.as_bytes());

        Ok(IpnConfirmation { body, signature })
    }

    /// [`confirm`](Self::confirm) stamped with the current local time.
    ///
    /// # Errors
    ///
    /// Returns [`SimplePayError::SerializationError`] if the body cannot be encoded.
    pub fn confirm_now(&self, merchant: &MerchantCredential) -> Result<IpnConfirmation> {
        self.confirm(merchant, &timestamp::now())
    }
}

fn ensure_merchant(merchant: &MerchantCredential, received: &str) -> Result<()> {
    if received == merchant.merchant_id() {
        Ok(())
    } else {
        Err(SimplePayError::CallbackError(format!(
            "callback is for merchant '{received}', expected '{}'",
            merchant.merchant_id()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merchant::Currency;

    const BACK_JSON: &str =
        r#"{"r":0,"t":501234567,"e":"SUCCESS","m":"PUBLICTESTHUF","o":"order-1"}"#;

    const IPN_BODY: &str = r#"{"salt":"223G0O2wZpqHmBPE7FOWNcoYpPlFDVcL","orderRef":"order-1","method":"CARD","merchant":"PUBLICTESTHUF","finishDate":"2024-05-01T14:35:00+02:00","paymentDate":"2024-05-01T14:34:00+02:00","transactionId":501234567,"status":"FINISHED"}"#;

    fn merchant() -> MerchantCredential {
        MerchantCredential::sandbox(Currency::Huf)
    }

    fn back_params(json: &str, secret: &str) -> (String, String) {
        (STANDARD.encode(json), signature::sign(secret, json.as_bytes()))
    }

    #[test]
    fn test_back_redirect_verifies() {
        let merchant = merchant();
        let (r, s) = back_params(BACK_JSON, merchant.secret());

        let back = BackRedirect::verify(&merchant, &r, &s).unwrap();
        assert_eq!(back.response_code, 0);
        assert_eq!(back.transaction_id, 501_234_567);
        assert_eq!(back.event, BackEvent::Success);
        assert_eq!(back.merchant, "PUBLICTESTHUF");
    }

    #[test]
    fn test_back_redirect_all_events() {
        let merchant = merchant();
        for (name, event) in [
            ("FAIL", BackEvent::Fail),
            ("TIMEOUT", BackEvent::Timeout),
            ("CANCEL", BackEvent::Cancel),
        ] {
            let json = BACK_JSON.replace("SUCCESS", name);
            let (r, s) = back_params(&json, merchant.secret());
            assert_eq!(BackRedirect::verify(&merchant, &r, &s).unwrap().event, event);
        }
    }

    #[test]
    fn test_back_redirect_wrong_secret() {
        let merchant = merchant();
        let (r, s) = back_params(BACK_JSON, "not-the-secret");

        let err = BackRedirect::verify(&merchant, &r, &s).unwrap_err();
        assert!(matches!(err, SimplePayError::CallbackError(msg) if msg.contains("mismatch")));
    }

    #[test]
    fn test_back_redirect_other_merchant() {
        let merchant = merchant();
        let json = BACK_JSON.replace("PUBLICTESTHUF", "SOMEONEELSE");
        let (r, s) = back_params(&json, merchant.secret());

        let err = BackRedirect::verify(&merchant, &r, &s).unwrap_err();
        assert!(matches!(err, SimplePayError::CallbackError(msg) if msg.contains("SOMEONEELSE")));
    }

    #[test]
    fn test_back_redirect_garbage() {
        let merchant = merchant();
        assert!(BackRedirect::verify(&merchant, "%%%", "x").is_err());

        let (r, s) = back_params(r#"{"hello":"world"}"#, merchant.secret());
        assert!(matches!(
            BackRedirect::verify(&merchant, &r, &s).unwrap_err(),
            SimplePayError::CallbackError(_)
        ));
    }

    #[test]
    fn test_ipn_verifies() {
        let merchant = merchant();
        let signature = signature::sign(merchant.secret(), IPN_BODY.as_bytes());

        let ipn = IpnMessage::verify(&merchant, IPN_BODY.as_bytes(), &signature).unwrap();
        assert_eq!(ipn.order_ref, "order-1");
        assert_eq!(ipn.transaction_id, 501_234_567);
        assert_eq!(ipn.status, TransactionStatus::Finished);
        assert_eq!(ipn.method, "CARD");
    }

    #[test]
    fn test_ipn_tampered_body() {
        let merchant = merchant();
        let signature = signature::sign(merchant.secret(), IPN_BODY.as_bytes());
        let tampered = IPN_BODY.replace("FINISHED", "REFUND");

        assert!(IpnMessage::verify(&merchant, tampered.as_bytes(), &signature).is_err());
    }

    #[test]
    fn test_ipn_confirmation() {
        let merchant = merchant();
        let signature = signature::sign(merchant.secret(), IPN_BODY.as_bytes());
        let ipn = IpnMessage::verify(&merchant, IPN_BODY.as_bytes(), &signature).unwrap();

        let confirmation = ipn.confirm(&merchant, "2024-05-01T14:36:00+02:00").unwrap();
        assert!(signature::verify(
            merchant.secret(),
            confirmation.body.as_bytes(),
            &confirmation.signature
        ));

        let body: Value = serde_json::from_str(&confirmation.body).unwrap();
        assert_eq!(body["receiveDate"], "2024-05-01T14:36:00+02:00");
        assert_eq!(body["orderRef"], "order-1");
        assert_eq!(body["transactionId"], 501_234_567);
        assert_eq!(body.as_object().unwrap().len(), 9);
        assert_eq!(confirmation.headers()[0].0, "Signature");
    }

    #[test]
    fn test_ipn_confirm_now() {
        let merchant = merchant();
        let signature = signature::sign(merchant.secret(), IPN_BODY.as_bytes());
        let ipn = IpnMessage::verify(&merchant, IPN_BODY.as_bytes(), &signature).unwrap();

        let confirmation = ipn.confirm_now(&merchant).unwrap();
        let body: Value = serde_json::from_str(&confirmation.body).unwrap();
        assert!(body["receiveDate"].as_str().is_some_and(|date| date.len() == 25));
    }
}
