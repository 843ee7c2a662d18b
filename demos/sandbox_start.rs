//! Starts a payment against the public sandbox merchant.
//!
//! Run with: `cargo run --example sandbox_start`
//!
//! Set `LOG_FORMAT=json` for JSON logs and `RUST_LOG=simplepay=debug` to see the
//! signed request go out.

#![allow(clippy::print_stdout, reason = "demo output")]

use chrono::{Duration, Local};
use simplepay::{
    EnvironmentConfig, GatewayResponse, MerchantCredential, StartTransaction,
    merchant::Currency,
    observability::{LogFormat, init_tracing},
};

#[tokio::main]
async fn main() -> simplepay::Result<()> {
    init_tracing(LogFormat::from_env())?;

    let merchant = MerchantCredential::sandbox(Currency::Huf);
    let mut start = StartTransaction::new(merchant, &EnvironmentConfig::sandbox())?;

    start
        .set_customer_email("sdk-test@example.com")?
        .set_order_ref(format!("demo-{}", Local::now().timestamp()))
        .set_timeout(&(Local::now() + Duration::minutes(30)))
        .set_total(1000);

    match start.card().await? {
        GatewayResponse::Success(reply) => {
            println!("transaction {} created", reply.transaction_id);
            println!("send the customer to {}", reply.payment_url);
        }
        GatewayResponse::Error(error) => {
            println!("gateway rejected the request: {:?}", error.error_codes);
        }
    }

    Ok(())
}
