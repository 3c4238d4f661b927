use std::fmt;

use chrono::TimeZone;

use crate::config::AtmConfig;
use crate::record::{RecordKind, RecordView};
use crate::state::{AtmState, WalletStatus};

pub const PAGE_TITLE: &str = "Welcome to the Beep's ATM!";
pub const INSTALL_PROMPT: &str = "Please install Metamask in order to use this ATM.";
pub const CONNECT_PROMPT: &str = "Please connect your Metamask wallet";
pub const WALLET_REQUIRED_ALERT: &str = "MetaMask wallet is required to connect";
pub const TRANSACTION_FAILED_ALERT: &str = "Transaction failed";

/// A rendered history list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryPanel {
    pub title: &'static str,
    pub entries: Vec<String>,
    pub empty_text: &'static str,
}

impl HistoryPanel {
    fn build<Tz>(kind: RecordKind, records: &[RecordView], symbol: &str, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            title: kind.title(),
            entries: records.iter().map(|r| r.describe(symbol, tz)).collect(),
            empty_text: kind.empty_text(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    pub account_line: String,
    pub balance_line: String,
    pub deposit_label: String,
    pub withdraw_label: String,
    pub buttons_disabled: bool,
    pub deposits: HistoryPanel,
    pub withdrawals: HistoryPanel,
    pub error: Option<String>,
}

/// What the page shows, derived purely from state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    InstallPrompt,
    /// `error` carries a failed authorization attempt, if any.
    ConnectPrompt { error: Option<String> },
    Dashboard(Dashboard),
}

impl Screen {
    pub fn from_state<Tz>(state: &AtmState, config: &AtmConfig, tz: &Tz) -> Screen
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        if state.wallet == WalletStatus::Absent {
            return Screen::InstallPrompt;
        }
        let Some(account) = state.account else {
            return Screen::ConnectPrompt {
                error: state.last_error.clone(),
            };
        };

        let symbol = &config.currency_symbol;
        let balance_line = match &state.balance {
            Some(balance) => format!("Your Balance: {balance} {symbol}"),
            None => "Your Balance: fetching...".to_string(),
        };
        let amount = config.amount_label();

        Screen::Dashboard(Dashboard {
            account_line: format!("Your Account: {account}"),
            balance_line,
            deposit_label: format!("Deposit {amount}"),
            withdraw_label: format!("Withdraw {amount}"),
            buttons_disabled: state.is_loading(),
            deposits: HistoryPanel::build(RecordKind::Deposit, &state.deposits, symbol, tz),
            withdrawals: HistoryPanel::build(
                RecordKind::Withdrawal,
                &state.withdrawals,
                symbol,
                tz,
            ),
            error: state.last_error.clone(),
        })
    }
}
