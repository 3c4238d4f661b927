use std::fmt;

use alloy_primitives::utils::{self, ParseUnits};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Decimals of the chain's native currency (wei per ether = 10^18).
pub const ETHER_DECIMALS: u8 = 18;

/// Errors from converting a decimal display string into base units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitsError {
    Negative(String),
    Invalid { value: String, reason: String },
}

impl fmt::Display for UnitsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negative(value) => write!(f, "negative amount: {value:?}"),
            Self::Invalid { value, reason } => write!(f, "invalid amount {value:?}: {reason}"),
        }
    }
}

/// Parse a non-negative decimal string ("1", "0.5") into base units.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, UnitsError> {
    match utils::parse_units(value.trim(), decimals) {
        Ok(ParseUnits::U256(amount)) => Ok(amount),
        Ok(ParseUnits::I256(_)) => Err(UnitsError::Negative(value.to_string())),
        Err(err) => Err(UnitsError::Invalid {
            value: value.to_string(),
            reason: err.to_string(),
        }),
    }
}

/// Render base units as a decimal string.
///
/// Trailing fractional zeros are trimmed but one fractional digit is always
/// kept, so zero renders as `"0.0"` and one ether as `"1.0"`.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    let (whole, fraction) = if digits.len() > decimals {
        let (w, f) = digits.split_at(digits.len() - decimals);
        (w.to_string(), f.to_string())
    } else {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    };
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };
    format!("{whole}.{fraction}")
}

pub fn parse_ether(value: &str) -> Result<U256, UnitsError> {
    parse_units(value, ETHER_DECIMALS)
}

pub fn format_ether(value: U256) -> String {
    format_units(value, ETHER_DECIMALS)
}
