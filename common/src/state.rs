//! Immutable page state and the transitions between snapshots.
//!
//! The chain is the source of truth; everything here mirrors it for display.
//! A snapshot only changes by applying an [`AtmEvent`].

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::record::RecordView;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteKind {
    Deposit,
    Withdraw,
}

impl WriteKind {
    pub fn label(&self) -> &'static str {
        match self {
            WriteKind::Deposit => "Deposit",
            WriteKind::Withdraw => "Withdraw",
        }
    }
}

/// Progress of the single in-flight write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WritePhase {
    #[default]
    Idle,
    /// Waiting for the wallet to sign and broadcast.
    Submitting(WriteKind),
    /// Broadcast; waiting for the receipt.
    Confirming(WriteKind),
    /// Confirmed; re-reading balance and histories.
    Refreshing(WriteKind),
    /// Rejected or errored; the user is being told before returning to idle.
    Failed(WriteKind),
}

impl WritePhase {
    /// A write holds the page until it returns to `Idle`.
    pub fn is_busy(&self) -> bool {
        !matches!(self, WritePhase::Idle)
    }

    pub fn kind(&self) -> Option<WriteKind> {
        match *self {
            WritePhase::Idle => None,
            WritePhase::Submitting(k)
            | WritePhase::Confirming(k)
            | WritePhase::Refreshing(k)
            | WritePhase::Failed(k) => Some(k),
        }
    }

    pub fn can_transition_to(&self, next: &WritePhase) -> bool {
        use WritePhase::*;
        match (*self, *next) {
            (Idle, Submitting(_)) => true,
            (Submitting(a), Confirming(b)) | (Confirming(a), Refreshing(b)) => a == b,
            (Submitting(a) | Confirming(a) | Refreshing(a), Failed(b)) => a == b,
            (Refreshing(_) | Failed(_), Idle) => true,
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletStatus {
    #[default]
    Absent,
    Present,
}

/// Everything the page renders from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtmState {
    pub wallet: WalletStatus,
    pub account: Option<Address>,
    /// Bumped each time the contract is bound to a new account. Reads tagged
    /// with an older value are dropped.
    pub binding: u32,
    pub balance: Option<String>,
    pub deposits: Vec<RecordView>,
    pub withdrawals: Vec<RecordView>,
    pub write: WritePhase,
    pub refreshing_records: bool,
    pub last_error: Option<String>,
    /// Bumped per successful write; drives the confetti burst.
    pub celebrations: u32,
}

/// A discrete change to [`AtmState`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtmEvent {
    WalletDetected,
    AccountAuthorized(Address),
    BalanceLoaded(String),
    RecordsRefreshStarted,
    RecordsLoaded {
        deposits: Vec<RecordView>,
        withdrawals: Vec<RecordView>,
    },
    /// A read or authorization failure, shown as a dismissible banner.
    ErrorReported(String),
    ErrorDismissed,
    WriteStarted(WriteKind),
    WriteSubmitted { kind: WriteKind, hash: B256 },
    WriteConfirmed(WriteKind),
    WriteFailed { kind: WriteKind, message: String },
    Celebrate,
    WriteFinished,
    /// A read result or read error belonging to one contract binding.
    Bound { binding: u32, event: Box<AtmEvent> },
}

impl AtmEvent {
    /// Tag an event with the binding that produced it.
    pub fn bound(self, binding: u32) -> AtmEvent {
        AtmEvent::Bound {
            binding,
            event: Box::new(self),
        }
    }

    /// The event with any binding tag stripped.
    pub fn unbound(&self) -> &AtmEvent {
        match self {
            AtmEvent::Bound { event, .. } => event.unbound(),
            other => other,
        }
    }
}

impl AtmState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The loading flag: a write is in flight or the histories are being
    /// re-read. Action buttons are disabled while this holds.
    pub fn is_loading(&self) -> bool {
        self.write.is_busy() || self.refreshing_records
    }

    fn with_phase(&self, next: WritePhase) -> AtmState {
        if !self.write.can_transition_to(&next) {
            tracing::warn!(from = ?self.write, to = ?next, "ignoring illegal write transition");
            return self.clone();
        }
        AtmState {
            write: next,
            ..self.clone()
        }
    }

    /// Produce the snapshot that follows `event`.
    pub fn apply(&self, event: AtmEvent) -> AtmState {
        match event {
            AtmEvent::WalletDetected => AtmState {
                wallet: WalletStatus::Present,
                ..self.clone()
            },
            AtmEvent::AccountAuthorized(account) if self.account == Some(account) => self.clone(),
            AtmEvent::AccountAuthorized(account) => AtmState {
                account: Some(account),
                binding: self.binding + 1,
                balance: None,
                deposits: Vec::new(),
                withdrawals: Vec::new(),
                refreshing_records: false,
                last_error: None,
                ..self.clone()
            },
            AtmEvent::BalanceLoaded(balance) => AtmState {
                balance: Some(balance),
                ..self.clone()
            },
            AtmEvent::RecordsRefreshStarted => AtmState {
                refreshing_records: true,
                ..self.clone()
            },
            AtmEvent::RecordsLoaded {
                deposits,
                withdrawals,
            } => AtmState {
                deposits,
                withdrawals,
                refreshing_records: false,
                ..self.clone()
            },
            AtmEvent::ErrorReported(message) => AtmState {
                last_error: Some(message),
                refreshing_records: false,
                ..self.clone()
            },
            AtmEvent::ErrorDismissed => AtmState {
                last_error: None,
                ..self.clone()
            },
            AtmEvent::WriteStarted(kind) => self.with_phase(WritePhase::Submitting(kind)),
            AtmEvent::WriteSubmitted { kind, .. } => self.with_phase(WritePhase::Confirming(kind)),
            AtmEvent::WriteConfirmed(kind) => self.with_phase(WritePhase::Refreshing(kind)),
            AtmEvent::WriteFailed { kind, .. } => self.with_phase(WritePhase::Failed(kind)),
            AtmEvent::Celebrate => AtmState {
                celebrations: self.celebrations + 1,
                ..self.clone()
            },
            AtmEvent::WriteFinished => self.with_phase(WritePhase::Idle),
            AtmEvent::Bound { binding, event } if binding == self.binding => self.apply(*event),
            AtmEvent::Bound { binding, event } => {
                tracing::debug!(binding, current = self.binding, ?event, "dropping stale read");
                self.clone()
            }
        }
    }
}
