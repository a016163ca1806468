//! Value-Transfer Ledger Collaborator
//!
//! Custody of staked funds. Transfers are atomic: they either complete or
//! return an error with no effect.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::game::state::{Amount, PlayerId};

/// Ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Payout exceeds what the game holds.
    #[error("insufficient custody: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Requested amount
        requested: Amount,
        /// Custody balance
        available: Amount,
    },

    /// The transfer was refused.
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Moves value between players and the game's custody account.
pub trait Ledger {
    /// Take `amount` from `from` into custody.
    fn receive_deposit(&mut self, from: PlayerId, amount: Amount) -> Result<(), LedgerError>;

    /// Pay `amount` out of custody to `to`. Irreversible once `Ok`.
    fn pay_out(&mut self, to: PlayerId, amount: Amount) -> Result<(), LedgerError>;

    /// Value currently held by the game.
    fn custody_balance(&self) -> Amount;
}

/// In-memory ledger for development and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    custody: Amount,
    deposits: BTreeMap<PlayerId, Amount>,
    payouts: BTreeMap<PlayerId, Amount>,
    fail_next: bool,
}

impl InMemoryLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit custody directly (transfers not tied to a join).
    pub fn donate(&mut self, amount: Amount) {
        self.custody = self.custody.saturating_add(amount);
    }

    /// Total deposited by `player`.
    pub fn deposited_by(&self, player: &PlayerId) -> Amount {
        self.deposits.get(player).copied().unwrap_or(0)
    }

    /// Total paid to `player`.
    pub fn paid_to(&self, player: &PlayerId) -> Amount {
        self.payouts.get(player).copied().unwrap_or(0)
    }

    /// Make the next transfer fail once.
    pub fn fail_next_transfer(&mut self) {
        self.fail_next = true;
    }
}

impl Ledger for InMemoryLedger {
    fn receive_deposit(&mut self, from: PlayerId, amount: Amount) -> Result<(), LedgerError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(LedgerError::Rejected("injected failure".to_string()));
        }
        let custody = self
            .custody
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Rejected("custody overflow".to_string()))?;

        self.custody = custody;
        *self.deposits.entry(from).or_default() += amount;
        debug!("Ledger: deposit {} from {}, custody {}", amount, from, self.custody);
        Ok(())
    }

    fn pay_out(&mut self, to: PlayerId, amount: Amount) -> Result<(), LedgerError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(LedgerError::Rejected("injected failure".to_string()));
        }
        let custody = self.custody.checked_sub(amount).ok_or(LedgerError::InsufficientFunds {
            requested: amount,
            available: self.custody,
        })?;

        self.custody = custody;
        *self.payouts.entry(to).or_default() += amount;
        debug!("Ledger: payout {} to {}, custody {}", amount, to, self.custody);
        Ok(())
    }

    fn custody_balance(&self) -> Amount {
        self.custody
    }
}
