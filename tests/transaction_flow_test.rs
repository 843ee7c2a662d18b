//! End-to-end operation flows over an in-memory transport.
//!
//! Each test drives a builder from construction to its terminal call and checks
//! what went on the wire.

mod common;

use std::sync::Arc;

use chrono::{Duration, Local};
use common::RecordingTransport;
use serde_json::json;
use simplepay::{
    CancelTransaction, EnvironmentConfig, GatewayResponse, MerchantCredential, QueryTransaction,
    RefundTransaction, SimplePayError, StartTransaction,
    merchant::Currency,
    models::TransactionStatus,
    operations::PaymentMethod,
    signature,
};

const START_REPLY: &str = r#"{
    "salt": "KAC6Dq4KyOZbzUgDmEvx1k2cC7qLJ0Ep",
    "merchant": "PUBLICTESTHUF",
    "orderRef": "order-1",
    "currency": "HUF",
    "transactionId": 501234567,
    "timeout": "2030-05-01T14:35:00+02:00",
    "total": 1000,
    "paymentUrl": "https://sandbox.simplepay.hu/pay/pay/pspHU/abc"
}"#;

fn sandbox_huf() -> MerchantCredential {
    MerchantCredential::sandbox(Currency::Huf)
}

#[tokio::test]
async fn test_start_card_end_to_end() {
    let transport = Arc::new(RecordingTransport::replying(200, START_REPLY));
    let merchant = sandbox_huf();
    let secret = merchant.secret().to_owned();
    let mut start =
        StartTransaction::with_transport(merchant, &EnvironmentConfig::sandbox(), Arc::clone(&transport));

    start
        .set_customer_email("customer@example.com")
        .expect("valid email")
        .set_order_ref("order-1")
        .set_timeout(&(Local::now() + Duration::minutes(30)))
        .set_total(1000);

    let reply = start.card().await.expect("card should resolve");

    let request = transport.only_request();
    assert_eq!(request.url, "https://sandbox.simplepay.hu/payment/v2/start");
    assert_eq!(request.header("Content-Type"), Some("application/json"));
    assert_eq!(
        request.header("Signature"),
        Some(signature::sign(&secret, request.body.as_bytes()).as_str()),
        "signature must cover the exact body bytes"
    );

    let body = request.json();
    assert_eq!(body["merchant"], "PUBLICTESTHUF");
    assert_eq!(body["methods"], json!(["CARD"]));
    assert_eq!(body["total"], "1000");
    assert_eq!(body["orderRef"], "order-1");
    assert_eq!(body["customerEmail"], "customer@example.com");
    assert!(body["timeout"].as_str().is_some_and(|t| t.len() == 25));

    let payment = reply.into_result().expect("success shape");
    assert_eq!(payment.transaction_id, 501_234_567);
    assert!(start.response().is_some_and(|r| !r.is_error()));
}

#[tokio::test]
async fn test_start_keeps_explicit_methods() {
    let transport = Arc::new(RecordingTransport::replying(200, START_REPLY));
    let mut start =
        StartTransaction::with_transport(sandbox_huf(), &EnvironmentConfig::sandbox(), Arc::clone(&transport));

    start.set_methods(vec![PaymentMethod::Wire]);
    start.card().await.expect("card should resolve");

    assert_eq!(transport.only_request().json()["methods"], json!(["WIRE"]));
}

#[tokio::test]
async fn test_start_without_order_ref_still_sends() {
    let transport = Arc::new(RecordingTransport::replying(200, r#"{"errorCodes":[5013]}"#));
    let mut start =
        StartTransaction::with_transport(sandbox_huf(), &EnvironmentConfig::sandbox(), Arc::clone(&transport));

    let reply = start.card().await.expect("error shape resolves normally");

    assert_eq!(transport.requests().len(), 1);
    assert_eq!(reply.error_codes(), Some(&[5013][..]));
    assert!(matches!(reply.into_result(), Err(SimplePayError::GatewayError(codes)) if codes == vec![5013]));
}

#[tokio::test]
async fn test_refund_negative_guard_on_the_wire() {
    let reply = r#"{
        "salt": "s", "merchant": "PUBLICTESTHUF", "orderRef": "order-1", "currency": "HUF",
        "transactionId": 501234567, "refundTransactionId": 501234999,
        "refundTotal": 0, "remainingTotal": 1000
    }"#;
    let transport = Arc::new(RecordingTransport::replying(200, reply));
    let mut refund =
        RefundTransaction::with_transport(sandbox_huf(), &EnvironmentConfig::sandbox(), Arc::clone(&transport));

    refund.set_order_ref("order-1").set_refund_total(-5);
    let response = refund.refund().await.expect("refund should resolve");

    let body = transport.only_request().json();
    assert_eq!(body["refundTotal"], 0);
    assert_eq!(body["orderRef"], "order-1");
    assert_eq!(body["currency"], "HUF");
    assert_eq!(
        response.into_result().expect("success shape").refund_transaction_id,
        501_234_999
    );
}

#[tokio::test]
async fn test_cancel_without_target_makes_no_call() {
    let transport = Arc::new(RecordingTransport::replying(200, "{}"));
    let mut cancel =
        CancelTransaction::with_transport(sandbox_huf(), &EnvironmentConfig::sandbox(), Arc::clone(&transport));

    let err = cancel.cancel().await.expect_err("cancel without target must fail");

    assert!(matches!(err, SimplePayError::ValidationError(_)));
    assert!(transport.requests().is_empty(), "no network call on validation failure");
    assert!(cancel.response().is_none());
}

#[tokio::test]
async fn test_cancel_by_transaction_id() {
    let reply = r#"{"salt":"s","merchant":"PUBLICTESTHUF","transactionId":42,"status":"CANCELLED"}"#;
    let transport = Arc::new(RecordingTransport::replying(200, reply));
    let mut cancel =
        CancelTransaction::with_transport(sandbox_huf(), &EnvironmentConfig::sandbox(), Arc::clone(&transport));

    cancel.set_order_ref("stale").set_transaction_id(42);
    let response = cancel.cancel().await.expect("cancel should resolve");

    let request = transport.only_request();
    assert_eq!(request.url, "https://sandbox.simplepay.hu/payment/v2/transactioncancel");
    let body = request.json();
    assert_eq!(body["transactionId"], 42);
    assert!(body.get("orderRef").is_none(), "last write wins");
    assert_eq!(response.into_result().expect("success shape").status, TransactionStatus::Cancelled);
}

#[tokio::test]
async fn test_query_deduplicates_and_stores_response() {
    let reply = r#"{
        "salt": "s", "merchant": "PUBLICTESTHUF", "totalCount": 2,
        "transactions": [
            {"orderRef": "A", "transactionId": 1, "status": "FINISHED"},
            {"orderRef": "B", "transactionId": 2, "status": "INIT"}
        ]
    }"#;
    let transport = Arc::new(RecordingTransport::replying(200, reply));
    let mut query =
        QueryTransaction::with_transport(sandbox_huf(), &EnvironmentConfig::sandbox(), Arc::clone(&transport));

    query.add_order_ref("A").add_order_ref("A").add_order_ref("B");
    query.query(true).await.expect("query should resolve");

    let body = transport.only_request().json();
    assert_eq!(body["orderRefs"], json!(["A", "B"]));
    assert_eq!(body["transactionIds"], json!([]));
    assert_eq!(body["detailed"], true);

    let Some(GatewayResponse::Success(stored)) = query.response() else {
        panic!("response should be stored");
    };
    assert_eq!(stored.total_count, 2);
    assert_eq!(stored.transactions[1].status, Some(TransactionStatus::Init));
}

#[tokio::test]
async fn test_query_without_ids_makes_no_call() {
    let transport = Arc::new(RecordingTransport::replying(200, "{}"));
    let mut query =
        QueryTransaction::with_transport(sandbox_huf(), &EnvironmentConfig::sandbox(), Arc::clone(&transport));

    let err = query.query(false).await.expect_err("empty query must fail");

    assert!(matches!(err, SimplePayError::ValidationError(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_non_json_reply_is_transport_error() {
    let transport = Arc::new(RecordingTransport::replying(503, "Service Unavailable"));
    let mut query =
        QueryTransaction::with_transport(sandbox_huf(), &EnvironmentConfig::sandbox(), Arc::clone(&transport));

    query.add_transaction_id(501_234_567_u64);
    let err = query.query(false).await.expect_err("non-JSON reply must fail");

    assert!(matches!(err, SimplePayError::TransportError(_)));
    assert_eq!(transport.only_request().json()["transactionIds"], json!(["501234567"]));
}

#[tokio::test]
async fn test_concurrent_operations_share_transport() {
    let reply = r#"{"salt":"s","merchant":"PUBLICTESTHUF","transactionId":1,"status":"CANCELLED"}"#;
    let transport = Arc::new(RecordingTransport::replying(200, reply));

    let mut first =
        CancelTransaction::with_transport(sandbox_huf(), &EnvironmentConfig::sandbox(), Arc::clone(&transport));
    let mut second =
        CancelTransaction::with_transport(sandbox_huf(), &EnvironmentConfig::sandbox(), Arc::clone(&transport));
    first.set_transaction_id(1);
    second.set_order_ref("order-2");

    let (a, b) = tokio::join!(first.cancel(), second.cancel());
    assert!(a.is_ok() && b.is_ok());

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_ne!(requests[0].json()["salt"], requests[1].json()["salt"], "salts are per instance");
}

#[test]
fn test_live_environment_endpoint() {
    let start = StartTransaction::with_transport(
        sandbox_huf(),
        &EnvironmentConfig::live(),
        RecordingTransport::replying(200, "{}"),
    );
    let signed = start.prepare().expect("prepare should succeed");
    assert_eq!(signed.url, "https://secure.simplepay.hu/payment/v2/start");
}
