//! Typed binding to the deployed ATM contract.
//!
//! Calls are ABI-encoded with the `sol!`-generated types and routed through
//! the wallet provider: reads via `eth_call`, writes via `eth_sendTransaction`
//! (the wallet signs), confirmations via `eth_getTransactionReceipt` polling.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_sol_types::{sol, SolCall};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AtmError;
use crate::wallet::Eip1193;

sol! {
    #[sol(all_derives)]
    interface Assessment {
        #[derive(Debug, PartialEq, Eq)]
        struct Transaction {
            uint256 amount;
            uint256 timestamp;
        }

        function getBalance() external view returns (uint256 balance);
        function getDeposits() external view returns (Transaction[] memory records);
        function getWithdrawals() external view returns (Transaction[] memory records);
        function deposit(uint256 amount) external;
        function withdraw(uint256 withdrawAmount) external;
    }
}

/// Handle to the contract, bound to a signer account.
#[derive(Clone, Debug)]
pub struct ContractHandle<P> {
    provider: P,
    address: Address,
    signer: Address,
    poll_millis: u32,
}

impl<P: Eip1193 + Clone> ContractHandle<P> {
    pub fn new(provider: P, address: Address, signer: Address, poll_millis: u32) -> Self {
        Self {
            provider,
            address,
            signer,
            poll_millis,
        }
    }

    /// The same contract and provider, signing as `signer`.
    pub fn with_signer(&self, signer: Address) -> Self {
        Self {
            signer,
            ..self.clone()
        }
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    fn transaction_object<C: SolCall>(&self, call: &C) -> serde_json::Value {
        json!({
            "from": self.signer,
            "to": self.address,
            "data": Bytes::from(call.abi_encode()),
        })
    }

    async fn call<C: SolCall>(&self, call: &C) -> Result<C::Return, AtmError> {
        let params = json!([self.transaction_object(call), "latest"]);
        let value = self.provider.request("eth_call", params).await?;
        let data: Bytes = serde_json::from_value(value)?;
        Ok(C::abi_decode_returns(&data, true)?)
    }

    async fn send<C: SolCall>(&self, call: &C) -> Result<PendingTransaction<P>, AtmError> {
        let params = json!([self.transaction_object(call)]);
        let value = self.provider.request("eth_sendTransaction", params).await?;
        let hash: B256 = serde_json::from_value(value)?;
        tracing::info!(%hash, function = C::SIGNATURE, "transaction submitted");
        Ok(PendingTransaction {
            provider: self.provider.clone(),
            hash,
            poll_millis: self.poll_millis,
        })
    }

    pub async fn get_balance(&self) -> Result<U256, AtmError> {
        Ok(self.call(&Assessment::getBalanceCall {}).await?.balance)
    }

    pub async fn get_deposits(&self) -> Result<Vec<Assessment::Transaction>, AtmError> {
        Ok(self.call(&Assessment::getDepositsCall {}).await?.records)
    }

    pub async fn get_withdrawals(&self) -> Result<Vec<Assessment::Transaction>, AtmError> {
        Ok(self.call(&Assessment::getWithdrawalsCall {}).await?.records)
    }

    pub async fn deposit(&self, amount: U256) -> Result<PendingTransaction<P>, AtmError> {
        self.send(&Assessment::depositCall { amount }).await
    }

    pub async fn withdraw(&self, amount: U256) -> Result<PendingTransaction<P>, AtmError> {
        self.send(&Assessment::withdrawCall {
            withdrawAmount: amount,
        })
        .await
    }
}

/// The subset of a transaction receipt the page cares about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// `0x1` on success, `0x0` when the transaction reverted.
    #[serde(default)]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |s| s == U64::from(1u64))
    }
}

/// A submitted write awaiting on-chain confirmation.
#[derive(Debug)]
pub struct PendingTransaction<P> {
    provider: P,
    hash: B256,
    poll_millis: u32,
}

impl<P: Eip1193> PendingTransaction<P> {
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Poll for the receipt until the transaction is mined. There is no
    /// timeout: a transaction that never confirms keeps this pending.
    pub async fn wait(self) -> Result<TransactionReceipt, AtmError> {
        loop {
            let value = self
                .provider
                .request("eth_getTransactionReceipt", json!([self.hash]))
                .await?;
            if value.is_null() {
                self.provider.pause(self.poll_millis).await;
                continue;
            }
            let receipt: TransactionReceipt = serde_json::from_value(value)?;
            if !receipt.succeeded() {
                return Err(AtmError::TransactionReverted { hash: self.hash });
            }
            tracing::info!(hash = %self.hash, "transaction confirmed");
            return Ok(receipt);
        }
    }
}
