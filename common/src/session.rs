//! Orchestration of the page: wallet discovery, authorization, contract
//! binding, reads, and the guarded deposit/withdraw flow.
//!
//! Every observable change is pushed through a [`StateSink`] as an
//! [`AtmEvent`]; the sink owns the current [`AtmState`](crate::state::AtmState) snapshot.

use alloy_primitives::{Address, B256};

use crate::config::AtmConfig;
use crate::contract::ContractHandle;
use crate::error::AtmError;
use crate::guard::OperationGuard;
use crate::record::record_views;
use crate::state::{AtmEvent, WriteKind};
use crate::view::{TRANSACTION_FAILED_ALERT, WALLET_REQUIRED_ALERT};
use crate::wallet::{self, Eip1193};

/// Receives state transitions and user-facing alerts.
pub trait StateSink {
    fn emit(&mut self, event: AtmEvent);

    /// Show a blocking message to the user.
    fn alert(&mut self, message: &str);
}

/// Result of a deposit or withdraw attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Another write or records refresh holds the slot; nothing was sent.
    Busy,
    /// Mined. `refreshed` is false if re-reading balance or histories failed.
    Confirmed { hash: B256, refreshed: bool },
    Failed(AtmError),
}

/// Adopt the first account of a wallet response, if any.
pub fn adopt_first_account(accounts: &[Address], sink: &mut impl StateSink) -> Option<Address> {
    match accounts.first() {
        Some(account) => {
            tracing::info!(%account, "Account connected");
            sink.emit(AtmEvent::AccountAuthorized(*account));
            Some(*account)
        }
        None => {
            tracing::info!("No account found");
            None
        }
    }
}

/// Record whether a wallet is injected and, if it already trusts this page,
/// adopt its account without prompting.
pub async fn discover<P: Eip1193>(provider: Option<&P>, sink: &mut impl StateSink) -> Option<Address> {
    let Some(provider) = provider else {
        tracing::info!("no wallet provider injected");
        return None;
    };
    sink.emit(AtmEvent::WalletDetected);
    match wallet::accounts(provider).await {
        Ok(accounts) => adopt_first_account(&accounts, sink),
        Err(err) => {
            tracing::warn!("eth_accounts failed: {err}");
            None
        }
    }
}

/// Ask the wallet for account access (user-initiated).
pub async fn connect<P: Eip1193>(
    provider: Option<&P>,
    sink: &mut impl StateSink,
) -> Result<Address, AtmError> {
    let Some(provider) = provider else {
        sink.alert(WALLET_REQUIRED_ALERT);
        return Err(AtmError::ProviderAbsent);
    };
    let accounts = match wallet::request_accounts(provider).await {
        Ok(accounts) => accounts,
        Err(err) => {
            tracing::error!("account authorization failed: {err}");
            sink.emit(AtmEvent::ErrorReported(err.to_string()));
            return Err(err);
        }
    };
    adopt_first_account(&accounts, sink)
        .ok_or_else(|| AtmError::AuthorizationFailed("wallet returned no accounts".into()))
}

/// The contract bound to one account, plus the write slot.
///
/// `binding` is the state's binding number at the time this session was
/// made; reads are tagged with it so a superseded session cannot overwrite
/// the views of the account that replaced it.
#[derive(Clone, Debug)]
pub struct Session<P> {
    contract: ContractHandle<P>,
    binding: u32,
    guard: OperationGuard,
    config: AtmConfig,
}

impl<P: Eip1193 + Clone> Session<P> {
    /// Bind the contract at the configured address, signing as `account`.
    pub fn bind(provider: P, account: Address, binding: u32, config: &AtmConfig) -> Self {
        tracing::debug!(%account, binding, contract = %config.contract_address, "binding contract");
        Self {
            contract: ContractHandle::new(
                provider,
                config.contract_address,
                account,
                config.receipt_poll_millis,
            ),
            binding,
            guard: OperationGuard::new(),
            config: config.clone(),
        }
    }

    /// Rebind to another account. The write slot is shared with `self`, so a
    /// write still in flight for the previous account keeps the page busy.
    pub fn rebind(&self, account: Address, binding: u32) -> Self {
        tracing::debug!(%account, binding, "rebinding contract");
        Self {
            contract: self.contract.with_signer(account),
            binding,
            guard: self.guard.clone(),
            config: self.config.clone(),
        }
    }

    pub fn account(&self) -> Address {
        self.contract.signer()
    }

    pub fn binding(&self) -> u32 {
        self.binding
    }

    pub fn guard(&self) -> &OperationGuard {
        &self.guard
    }

    fn report_read_failure(&self, what: &str, err: &AtmError, sink: &mut impl StateSink) {
        tracing::error!("failed to fetch {what}: {err}");
        let message = format!("Could not load {what}: {err}");
        sink.emit(AtmEvent::ErrorReported(message).bound(self.binding));
    }

    /// Initial load after binding: balance, then both histories. Not gated
    /// by the write slot, which may still be held for a previous account.
    pub async fn load(&self, sink: &mut impl StateSink) {
        // Failures are already reported to the sink.
        let _ = self.refresh_balance(sink).await;
        let _ = self.fetch_records(sink).await;
    }

    pub async fn refresh_balance(&self, sink: &mut impl StateSink) -> Result<(), AtmError> {
        match self.contract.get_balance().await {
            Ok(balance) => {
                let formatted = self.config.display_amount(balance);
                tracing::debug!(balance = %formatted, "balance refreshed");
                sink.emit(AtmEvent::BalanceLoaded(formatted).bound(self.binding));
                Ok(())
            }
            Err(err) => {
                self.report_read_failure("balance", &err, sink);
                Err(err)
            }
        }
    }

    /// Stand-alone histories refresh. Skipped while a write holds the slot,
    /// since that write refreshes them on completion.
    pub async fn refresh_records(&self, sink: &mut impl StateSink) -> Result<(), AtmError> {
        let Some(_permit) = self.guard.try_acquire() else {
            tracing::debug!("records refresh skipped, operation in flight");
            return Ok(());
        };
        self.fetch_records(sink).await
    }

    async fn fetch_records(&self, sink: &mut impl StateSink) -> Result<(), AtmError> {
        sink.emit(AtmEvent::RecordsRefreshStarted.bound(self.binding));
        let fetched = async {
            let deposits = self.contract.get_deposits().await?;
            let withdrawals = self.contract.get_withdrawals().await?;
            Ok::<_, AtmError>((deposits, withdrawals))
        }
        .await;
        match fetched {
            Ok((deposits, withdrawals)) => {
                let loaded = AtmEvent::RecordsLoaded {
                    deposits: record_views(&deposits, self.config.decimals),
                    withdrawals: record_views(&withdrawals, self.config.decimals),
                };
                sink.emit(loaded.bound(self.binding));
                Ok(())
            }
            Err(err) => {
                self.report_read_failure("transaction history", &err, sink);
                Err(err)
            }
        }
    }

    pub async fn deposit(&self, sink: &mut impl StateSink) -> WriteOutcome {
        self.submit(WriteKind::Deposit, sink).await
    }

    pub async fn withdraw(&self, sink: &mut impl StateSink) -> WriteOutcome {
        self.submit(WriteKind::Withdraw, sink).await
    }

    async fn transact(&self, kind: WriteKind, sink: &mut impl StateSink) -> Result<B256, AtmError> {
        let amount = self.config.fixed_amount_base_units()?;
        let pending = match kind {
            WriteKind::Deposit => self.contract.deposit(amount).await?,
            WriteKind::Withdraw => self.contract.withdraw(amount).await?,
        };
        sink.emit(AtmEvent::WriteSubmitted {
            kind,
            hash: pending.hash(),
        });
        Ok(pending.wait().await?.transaction_hash)
    }

    /// Submit one fixed-amount write, wait for confirmation, then re-read
    /// balance and histories. No balance pre-check: the contract decides.
    pub async fn submit(&self, kind: WriteKind, sink: &mut impl StateSink) -> WriteOutcome {
        let Some(_permit) = self.guard.try_acquire() else {
            tracing::debug!("{} ignored, operation in flight", kind.label());
            return WriteOutcome::Busy;
        };
        sink.emit(AtmEvent::WriteStarted(kind));

        match self.transact(kind, sink).await {
            Ok(hash) => {
                sink.emit(AtmEvent::WriteConfirmed(kind));
                let balance = self.refresh_balance(sink).await;
                let records = self.fetch_records(sink).await;
                sink.emit(AtmEvent::Celebrate);
                sink.emit(AtmEvent::WriteFinished);
                WriteOutcome::Confirmed {
                    hash,
                    refreshed: balance.is_ok() && records.is_ok(),
                }
            }
            Err(err) => {
                let action = kind.label().to_lowercase();
                if err.is_user_rejection() {
                    tracing::info!("{action} declined in the wallet: {err}");
                } else {
                    tracing::error!("Error during {action}: {err}");
                }
                sink.emit(AtmEvent::WriteFailed {
                    kind,
                    message: err.to_string(),
                });
                sink.alert(TRANSACTION_FAILED_ALERT);
                sink.emit(AtmEvent::WriteFinished);
                WriteOutcome::Failed(err)
            }
        }
    }
}
