use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::Assessment;
use crate::units::format_units;

/// Which history a record belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Deposit,
    Withdrawal,
}

impl RecordKind {
    pub fn title(&self) -> &'static str {
        match self {
            RecordKind::Deposit => "Deposit History",
            RecordKind::Withdrawal => "Withdrawal History",
        }
    }

    pub fn empty_text(&self) -> &'static str {
        match self {
            RecordKind::Deposit => "No deposits yet.",
            RecordKind::Withdrawal => "No withdrawals yet.",
        }
    }
}

/// One deposit or withdrawal as displayed: decimal amount plus unix seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    pub amount: String,
    pub timestamp: u64,
}

impl RecordView {
    pub fn from_contract(record: &Assessment::Transaction, decimals: u8) -> Self {
        Self {
            amount: format_units(record.amount, decimals),
            timestamp: record.timestamp.saturating_to::<u64>(),
        }
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.timestamp).ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    /// Timestamp rendered in the given zone; the raw seconds if out of range.
    pub fn format_time<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self.occurred_at() {
            Some(at) => at
                .with_timezone(tz)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => self.timestamp.to_string(),
        }
    }

    /// "Amount: 1.0 ETH at 2023-11-14 22:13:20"
    pub fn describe<Tz>(&self, symbol: &str, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        format!("Amount: {} {symbol} at {}", self.amount, self.format_time(tz))
    }
}

/// Convert a fetched history, preserving the contract's order.
pub fn record_views(records: &[Assessment::Transaction], decimals: u8) -> Vec<RecordView> {
    records
        .iter()
        .map(|r| RecordView::from_contract(r, decimals))
        .collect()
}
