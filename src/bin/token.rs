//! Session-token issuer for planpay.
//!
//! Signs a session token for an account id with the service auth secret,
//! the way the identity provider does in production. Useful for local
//! testing and support tooling.
//!
//! Usage:
//!   PLANPAY_AUTH_SECRET=... cargo run --bin planpay-token -- <account-id>

use planpay::api::TokenVerifier;
use planpay::config::AUTH_SECRET_ENV;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let account_id = std::env::args()
        .nth(1)
        .ok_or_else(|| color_eyre::eyre::eyre!("usage: planpay-token <account-id>"))?;

    let secret = std::env::var(AUTH_SECRET_ENV)
        .map_err(|_| color_eyre::eyre::eyre!("{AUTH_SECRET_ENV} must be set"))?;

    let token = TokenVerifier::new(secret).issue(&account_id)?;
    println!("{token}");
    Ok(())
}
