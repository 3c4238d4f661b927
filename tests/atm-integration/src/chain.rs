//! In-memory EIP-1193 provider hosting the ATM contract.
//!
//! Plays both the wallet (accounts, signatures) and the node (calls, receipts).
//! Calldata is decoded with the same `sol!` binding the page uses, so any
//! encoding mismatch shows up as a failed test.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolValue};
use serde_json::{json, Value};

use atm_common::contract::Assessment;
use atm_common::error::{AtmError, USER_REJECTED_REQUEST};
use atm_common::wallet::Eip1193;

pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;
pub const BLOCK_TIME_SECS: u64 = 12;

const INTERNAL_ERROR: i64 = -32603;
const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Default)]
struct Ledger {
    balance: U256,
    deposits: Vec<Assessment::Transaction>,
    withdrawals: Vec<Assessment::Transaction>,
}

#[derive(Debug)]
struct MinedReceipt {
    polls_left: u32,
    block: u64,
    success: bool,
}

#[derive(Debug)]
struct ChainState {
    contract: Address,
    wallet_accounts: Vec<Address>,
    authorized: bool,
    deny_authorization: bool,
    reject_signatures: bool,
    revert_on_chain: bool,
    fail_reads: bool,
    confirmation_polls: u32,
    ledgers: HashMap<Address, Ledger>,
    receipts: HashMap<B256, MinedReceipt>,
    block: u64,
    nonce: u64,
    requests: Vec<String>,
}

impl ChainState {
    fn rpc_error(code: i64, message: &str) -> AtmError {
        AtmError::rpc(code, message)
    }

    fn block_timestamp(block: u64) -> U256 {
        U256::from(GENESIS_TIMESTAMP + block * BLOCK_TIME_SECS)
    }

    fn call_target(params: &Value) -> Result<(Address, Address, Bytes), AtmError> {
        let tx = &params[0];
        let from = serde_json::from_value(tx["from"].clone())?;
        let to = serde_json::from_value(tx["to"].clone())?;
        let data = serde_json::from_value(tx["data"].clone())?;
        Ok((from, to, data))
    }

    fn call(&mut self, params: &Value) -> Result<Value, AtmError> {
        if self.fail_reads {
            return Err(Self::rpc_error(INTERNAL_ERROR, "header not found"));
        }
        let (from, to, data) = Self::call_target(params)?;
        if to != self.contract || data.len() < 4 {
            return Ok(json!("0x"));
        }
        let ledger = self.ledgers.entry(from).or_default();
        let selector: [u8; 4] = data[..4].try_into().map_err(|_| AtmError::Abi("selector".into()))?;
        let encoded = if selector == Assessment::getBalanceCall::SELECTOR {
            ledger.balance.abi_encode()
        } else if selector == Assessment::getDepositsCall::SELECTOR {
            Assessment::getDepositsCall::abi_encode_returns(&(ledger.deposits.clone(),))
        } else if selector == Assessment::getWithdrawalsCall::SELECTOR {
            Assessment::getWithdrawalsCall::abi_encode_returns(&(ledger.withdrawals.clone(),))
        } else {
            return Err(Self::rpc_error(INTERNAL_ERROR, "execution reverted"));
        };
        Ok(json!(Bytes::from(encoded)))
    }

    fn send(&mut self, params: &Value) -> Result<Value, AtmError> {
        if self.reject_signatures {
            return Err(Self::rpc_error(
                USER_REJECTED_REQUEST,
                "MetaMask Tx Signature: User denied transaction signature.",
            ));
        }
        let (from, to, data) = Self::call_target(params)?;
        if !self.authorized || !self.wallet_accounts.contains(&from) {
            return Err(Self::rpc_error(4100, "The requested account has not been authorized"));
        }
        if to != self.contract {
            return Err(Self::rpc_error(INTERNAL_ERROR, "unknown contract"));
        }

        let timestamp = Self::block_timestamp(self.block + 1);
        let success = self.execute(from, &data, timestamp)?;
        self.block += 1;

        self.nonce += 1;
        let hash = keccak256(self.nonce.to_be_bytes());
        self.receipts.insert(
            hash,
            MinedReceipt {
                polls_left: self.confirmation_polls,
                block: self.block,
                success,
            },
        );
        Ok(json!(hash))
    }

    /// Apply a write. `Ok(false)` means mined but reverted.
    fn execute(&mut self, from: Address, data: &[u8], timestamp: U256) -> Result<bool, AtmError> {
        let revert_on_chain = self.revert_on_chain;
        let ledger = self.ledgers.entry(from).or_default();
        if let Ok(call) = Assessment::depositCall::abi_decode(data, true) {
            ledger.balance += call.amount;
            ledger.deposits.push(Assessment::Transaction {
                amount: call.amount,
                timestamp,
            });
            return Ok(true);
        }
        let call = Assessment::withdrawCall::abi_decode(data, true)?;
        if ledger.balance < call.withdrawAmount {
            if revert_on_chain {
                return Ok(false);
            }
            return Err(Self::rpc_error(
                INTERNAL_ERROR,
                "execution reverted: InsufficientBalance",
            ));
        }
        ledger.balance -= call.withdrawAmount;
        ledger.withdrawals.push(Assessment::Transaction {
            amount: call.withdrawAmount,
            timestamp,
        });
        Ok(true)
    }

    fn receipt(&mut self, params: &Value) -> Result<Value, AtmError> {
        let hash: B256 = serde_json::from_value(params[0].clone())?;
        let Some(receipt) = self.receipts.get_mut(&hash) else {
            return Ok(Value::Null);
        };
        if receipt.polls_left > 0 {
            receipt.polls_left -= 1;
            return Ok(Value::Null);
        }
        let status = if receipt.success { "0x1" } else { "0x0" };
        Ok(json!({
            "transactionHash": hash,
            "blockNumber": format!("{:#x}", receipt.block),
            "status": status,
        }))
    }

    fn handle(&mut self, method: &str, params: &Value) -> Result<Value, AtmError> {
        self.requests.push(method.to_string());
        match method {
            "eth_accounts" if self.authorized => Ok(json!(self.wallet_accounts)),
            "eth_accounts" => Ok(json!([])),
            "eth_requestAccounts" if self.deny_authorization => Err(Self::rpc_error(
                USER_REJECTED_REQUEST,
                "User rejected the request.",
            )),
            "eth_requestAccounts" => {
                self.authorized = true;
                Ok(json!(self.wallet_accounts))
            }
            "eth_call" => self.call(params),
            "eth_sendTransaction" => self.send(params),
            "eth_getTransactionReceipt" => self.receipt(params),
            other => Err(Self::rpc_error(
                METHOD_NOT_FOUND,
                &format!("method {other} does not exist"),
            )),
        }
    }
}

/// Shared handle to the simulated wallet + chain.
#[derive(Clone, Debug)]
pub struct SimulatedChain {
    inner: Arc<Mutex<ChainState>>,
}

impl SimulatedChain {
    pub fn new(contract: Address, wallet_accounts: Vec<Address>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChainState {
                contract,
                wallet_accounts,
                authorized: false,
                deny_authorization: false,
                reject_signatures: false,
                revert_on_chain: false,
                fail_reads: false,
                confirmation_polls: 0,
                ledgers: HashMap::new(),
                receipts: HashMap::new(),
                block: 0,
                nonce: 0,
                requests: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Pretend the user approved this page in an earlier visit.
    pub fn preauthorize(&self) {
        self.lock().authorized = true;
    }

    pub fn deny_authorization(&self) {
        self.lock().deny_authorization = true;
    }

    pub fn reject_signatures(&self, reject: bool) {
        self.lock().reject_signatures = reject;
    }

    /// Mine failing withdrawals with status 0 instead of failing estimation.
    pub fn revert_on_chain(&self, revert: bool) {
        self.lock().revert_on_chain = revert;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Number of receipt polls that return null before a transaction shows as mined.
    pub fn confirmation_polls(&self, polls: u32) {
        self.lock().confirmation_polls = polls;
    }

    pub fn switch_accounts(&self, accounts: Vec<Address>) {
        self.lock().wallet_accounts = accounts;
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.lock()
            .ledgers
            .get(&account)
            .map(|l| l.balance)
            .unwrap_or_default()
    }

    pub fn request_count(&self, method: &str) -> usize {
        self.lock().requests.iter().filter(|m| *m == method).count()
    }
}

impl Eip1193 for SimulatedChain {
    async fn request(&self, method: &str, params: Value) -> Result<Value, AtmError> {
        let result = self.lock().handle(method, &params);
        tracing::debug!(method, ok = result.is_ok(), "simulated request");
        result
    }

    async fn pause(&self, _millis: u32) {
        tokio::task::yield_now().await;
    }
}
