//! Verifies a back redirect the way a merchant's return page would.
//!
//! Run with: `cargo run --example back_redirect -- <r> <s>`
//!
//! Without arguments a redirect is simulated with the sandbox secret.

#![allow(clippy::print_stdout, reason = "demo output")]

use base64::{Engine, engine::general_purpose::STANDARD};
use simplepay::{
    MerchantCredential,
    callback::{BackEvent, BackRedirect},
    merchant::Currency,
    signature::sign,
};

fn main() -> simplepay::Result<()> {
    let merchant = MerchantCredential::sandbox(Currency::Huf);

    let mut args = std::env::args().skip(1);
    let (r, s) = match (args.next(), args.next()) {
        (Some(r), Some(s)) => (r, s),
        _ => {
            let json = r#"{"r":0,"t":501234567,"e":"SUCCESS","m":"PUBLICTESTHUF","o":"demo-1"}"#;
            (STANDARD.encode(json), sign(merchant.secret(), json.as_bytes()))
        }
    };

    let back = BackRedirect::verify(&merchant, &r, &s)?;
    let outcome = match back.event {
        BackEvent::Success => "paid",
        BackEvent::Fail => "declined",
        BackEvent::Timeout => "timed out",
        BackEvent::Cancel => "cancelled by the customer",
    };
    println!("order {} (transaction {}) {outcome}", back.order_ref, back.transaction_id);

    Ok(())
}
