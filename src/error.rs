//! Game Errors
//!
//! Every failed operation leaves game state untouched.

use thiserror::Error;

use crate::core::grid::{Cell, Direction};
use crate::core::prime::OutOfRange;
use crate::game::state::{Amount, PlayerId, RoundIndex};
use crate::ledger::LedgerError;
use crate::oracle::{OracleError, RequestHandle};

/// Error category, for callers deciding whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input. Retrying the same call fails again.
    Validation,
    /// Misbehaving collaborator or broken internal invariant.
    Protocol,
    /// Not allowed yet. May succeed later.
    Temporal,
    /// A collaborator call failed.
    Collaborator,
}

/// Game errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------
    /// Paid fee differs from the configured entry fee.
    #[error("incorrect fee: expected {expected}, paid {paid}")]
    IncorrectFee {
        /// Configured fee
        expected: Amount,
        /// Fee sent
        paid: Amount,
    },

    /// Player already has an active record in this round.
    #[error("player {player} already joined round {round}")]
    AlreadyJoined {
        /// Round
        round: RoundIndex,
        /// Player
        player: PlayerId,
    },

    /// Player has no active record in this round.
    #[error("player {player} is not active in round {round}")]
    NotActive {
        /// Round
        round: RoundIndex,
        /// Player
        player: PlayerId,
    },

    /// Round is waiting on randomness.
    #[error("round {0} is awaiting randomness")]
    RoundBusy(RoundIndex),

    /// Step would leave the grid.
    #[error("cannot move {direction} from cell {from}")]
    OutOfBounds {
        /// Starting cell
        from: Cell,
        /// Attempted direction
        direction: Direction,
    },

    // -------------------------------------------------------------------------
    // Protocol
    // -------------------------------------------------------------------------
    /// Fulfillment for a handle that is not the pending request.
    #[error("unknown randomness request {0}")]
    UnknownRequest(RequestHandle),

    /// Fulfillment carried no random words.
    #[error("fulfillment for {0} carried no random words")]
    MissingRandomWords(RequestHandle),

    /// A second request was attempted while one is outstanding.
    #[error("randomness request already pending for round {0}")]
    RequestAlreadyPending(RoundIndex),

    /// Primality checked outside its range.
    #[error(transparent)]
    PrimeOutOfRange(#[from] OutOfRange),

    /// Treasure has no valid neighbor.
    #[error("treasure at {0} has no adjacent cell")]
    NoAdjacentCell(Cell),

    /// Round record missing.
    #[error("round {0} does not exist")]
    UnknownRound(RoundIndex),

    /// Recorded pool smaller than the amount being removed.
    #[error("round {round} pool {pool} cannot cover {amount}")]
    PoolUnderflow {
        /// Round
        round: RoundIndex,
        /// Recorded pool
        pool: Amount,
        /// Amount being removed
        amount: Amount,
    },

    /// Pool addition overflowed.
    #[error("round {0} pool overflow")]
    PoolOverflow(RoundIndex),

    // -------------------------------------------------------------------------
    // Temporal
    // -------------------------------------------------------------------------
    /// Round duration has not elapsed.
    #[error("round {round} cannot expire for another {remaining_secs}s")]
    NotYetExpirable {
        /// Round
        round: RoundIndex,
        /// Seconds left
        remaining_secs: i64,
    },

    /// Withdrawal targets the current (or a future) round.
    #[error("round {requested} is not finished (current round {current})")]
    RoundNotFinished {
        /// Requested round
        requested: RoundIndex,
        /// Current round
        current: RoundIndex,
    },

    /// Nothing to reclaim for this player in this round.
    #[error("player {player} has nothing to withdraw from round {round}")]
    NothingToWithdraw {
        /// Round
        round: RoundIndex,
        /// Player
        player: PlayerId,
    },

    /// Round was won; its pool has been paid out.
    #[error("round {0} was won; stakes are not refundable")]
    RoundWasWon(RoundIndex),

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------
    /// Randomness oracle refused the request.
    #[error("oracle: {0}")]
    Oracle(#[from] OracleError),

    /// Ledger refused the transfer.
    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),
}

impl GameError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::IncorrectFee { .. }
            | GameError::AlreadyJoined { .. }
            | GameError::NotActive { .. }
            | GameError::RoundBusy(_)
            | GameError::OutOfBounds { .. } => ErrorKind::Validation,

            GameError::UnknownRequest(_)
            | GameError::MissingRandomWords(_)
            | GameError::RequestAlreadyPending(_)
            | GameError::PrimeOutOfRange(_)
            | GameError::NoAdjacentCell(_)
            | GameError::UnknownRound(_)
            | GameError::PoolUnderflow { .. }
            | GameError::PoolOverflow(_) => ErrorKind::Protocol,

            GameError::NotYetExpirable { .. }
            | GameError::RoundNotFinished { .. }
            | GameError::NothingToWithdraw { .. }
            | GameError::RoundWasWon(_) => ErrorKind::Temporal,

            GameError::Oracle(_) | GameError::Ledger(_) => ErrorKind::Collaborator,
        }
    }
}

/// Result alias for game operations.
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(GameError::IncorrectFee { expected: 1, paid: 2 }.kind(), ErrorKind::Validation);
        assert_eq!(GameError::RoundBusy(1).kind(), ErrorKind::Validation);
        assert_eq!(GameError::UnknownRequest(RequestHandle([0; 32])).kind(), ErrorKind::Protocol);
        assert_eq!(GameError::from(OutOfRange(100)).kind(), ErrorKind::Protocol);
        assert_eq!(
            GameError::NotYetExpirable { round: 1, remaining_secs: 5 }.kind(),
            ErrorKind::Temporal
        );
        assert_eq!(
            GameError::from(LedgerError::Rejected("x".into())).kind(),
            ErrorKind::Collaborator
        );
    }

    #[test]
    fn test_error_messages() {
        let err = GameError::IncorrectFee { expected: 10, paid: 9 };
        assert_eq!(err.to_string(), "incorrect fee: expected 10, paid 9");
    }
}
