use alloy_primitives::Address;
use serde_json::{json, Value};

use crate::error::AtmError;

/// An EIP-1193 wallet provider (e.g. the `window.ethereum` object).
///
/// Implementations forward `request` to the wallet; signing, key management
/// and broadcasting all happen on the other side of this seam.
#[allow(async_fn_in_trait)]
pub trait Eip1193 {
    async fn request(&self, method: &str, params: Value) -> Result<Value, AtmError>;

    /// Wait between polls. Providers without a timer may return immediately.
    async fn pause(&self, _millis: u32) {}
}

/// Parse the address list returned by `eth_accounts` / `eth_requestAccounts`.
pub fn parse_accounts(value: Value) -> Result<Vec<Address>, AtmError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(value)?)
}

/// Accounts the wallet has already exposed to this page, without prompting.
pub async fn accounts<P: Eip1193>(provider: &P) -> Result<Vec<Address>, AtmError> {
    parse_accounts(provider.request("eth_accounts", json!([])).await?)
}

/// Ask the wallet to authorize this page. Prompts the user.
pub async fn request_accounts<P: Eip1193>(provider: &P) -> Result<Vec<Address>, AtmError> {
    let value = provider
        .request("eth_requestAccounts", json!([]))
        .await
        .map_err(|e| match e {
            AtmError::Rpc { message, .. } => AtmError::AuthorizationFailed(message),
            other => other,
        })?;
    parse_accounts(value)
}
