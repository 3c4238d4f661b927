use alloy_primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};

use crate::units::{format_units, parse_units, UnitsError, ETHER_DECIMALS};

/// Deployed ATM contract (first deployment on a local Hardhat node).
pub const CONTRACT_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

/// Amount moved by every deposit and withdrawal, in whole currency units.
pub const FIXED_AMOUNT: &str = "1";

pub const CURRENCY_SYMBOL: &str = "ETH";

/// Delay between `eth_getTransactionReceipt` polls while a write confirms.
pub const RECEIPT_POLL_MILLIS: u32 = 1_000;

/// Static configuration of the ATM page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmConfig {
    pub contract_address: Address,
    pub fixed_amount: String,
    pub currency_symbol: String,
    pub decimals: u8,
    pub receipt_poll_millis: u32,
}

impl Default for AtmConfig {
    fn default() -> Self {
        Self {
            contract_address: CONTRACT_ADDRESS,
            fixed_amount: FIXED_AMOUNT.to_string(),
            currency_symbol: CURRENCY_SYMBOL.to_string(),
            decimals: ETHER_DECIMALS,
            receipt_poll_millis: RECEIPT_POLL_MILLIS,
        }
    }
}

impl AtmConfig {
    /// The fixed write amount scaled to base units.
    pub fn fixed_amount_base_units(&self) -> Result<U256, UnitsError> {
        parse_units(&self.fixed_amount, self.decimals)
    }

    /// Render a base-unit amount in the configured currency's decimals.
    pub fn display_amount(&self, base_units: U256) -> String {
        format_units(base_units, self.decimals)
    }

    /// Button caption for the fixed amount, e.g. "1 ETH".
    pub fn amount_label(&self) -> String {
        format!("{} {}", self.fixed_amount, self.currency_symbol)
    }
}
