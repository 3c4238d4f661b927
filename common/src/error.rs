use std::fmt;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::units::UnitsError;

/// EIP-1193 error code for a request the user declined in the wallet.
pub const USER_REJECTED_REQUEST: i64 = 4001;

/// Errors surfaced by wallet, contract, and session operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtmError {
    /// No wallet provider is injected into the page.
    ProviderAbsent,
    /// The wallet refused or failed the account authorization request.
    AuthorizationFailed(String),
    /// JSON-RPC / EIP-1193 error returned by the provider.
    Rpc { code: i64, message: String },
    /// Calldata or return data did not match the contract interface.
    Abi(String),
    Units(UnitsError),
    /// The transaction was mined but its receipt reports failure.
    TransactionReverted { hash: B256 },
    InvalidResponse(String),
}

impl AtmError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Whether the user declined the request in their wallet.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == USER_REJECTED_REQUEST)
    }
}

impl fmt::Display for AtmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderAbsent => write!(f, "no wallet provider detected"),
            Self::AuthorizationFailed(msg) => write!(f, "account authorization failed: {msg}"),
            Self::Rpc { code, message } => write!(f, "rpc error {code}: {message}"),
            Self::Abi(msg) => write!(f, "abi error: {msg}"),
            Self::Units(err) => write!(f, "{err}"),
            Self::TransactionReverted { hash } => write!(f, "transaction {hash} reverted"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for AtmError {}

impl From<UnitsError> for AtmError {
    fn from(err: UnitsError) -> Self {
        Self::Units(err)
    }
}

impl From<alloy_sol_types::Error> for AtmError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::Abi(err.to_string())
    }
}

impl From<serde_json::Error> for AtmError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
