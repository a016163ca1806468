//! Randomness Oracle Collaborator
//!
//! The game submits requests through [`RandomnessOracle`]; the host later
//! feeds the oracle's answer back through `TreasureHunt::on_fulfillment`.
//! [`LocalOracle`] is an in-process oracle for development and tests.

use std::collections::VecDeque;
use std::fmt;

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::core::hash::{derive_request_id, Hash32};
use crate::game::state::RoundIndex;

/// Opaque handle identifying one randomness request.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestHandle(pub Hash32);

impl RequestHandle {
    /// Short hex prefix for logs.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestHandle({})", self.short())
    }
}

/// Why randomness is being requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPurpose {
    /// Pick a fresh round's treasure cell.
    SeedRound,
    /// Relocate the treasure after a move.
    ResolveMove,
}

/// Request configuration passed to the oracle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomnessRequest {
    /// Round the answer will be applied to.
    pub round: RoundIndex,
    /// Why randomness is needed.
    pub purpose: RequestPurpose,
    /// Number of random words wanted.
    pub num_words: u32,
}

impl RandomnessRequest {
    /// Single-word request.
    pub fn new(round: RoundIndex, purpose: RequestPurpose) -> Self {
        Self { round, purpose, num_words: 1 }
    }
}

/// Oracle submission errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The oracle refused or could not take the request.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// Outbound side of the randomness oracle.
pub trait RandomnessOracle {
    /// Submit a request and return its handle.
    fn submit_request(&mut self, request: &RandomnessRequest) -> Result<RequestHandle, OracleError>;
}

/// An answer ready to be delivered to the game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fulfillment {
    /// Request being answered.
    pub handle: RequestHandle,
    /// Random words.
    pub random_words: Vec<u64>,
}

// =============================================================================
// LOCAL ORACLE
// =============================================================================

/// SplitMix64 word stream backing [`LocalOracle`] answers.
#[derive(Debug, Clone)]
struct WordStream {
    state: u64,
}

impl WordStream {
    const GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

    fn next_word(&mut self) -> u64 {
        self.state = self.state.wrapping_add(Self::GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

/// Deterministic in-process oracle.
///
/// Requests queue up in submission order; the host decides when and with
/// which values they are answered. Requests the game has abandoned stay
/// queued, so hosts should answer by handle with [`LocalOracle::fulfill`].
#[derive(Debug)]
pub struct LocalOracle {
    words: WordStream,
    nonce: u64,
    outstanding: VecDeque<(RequestHandle, RandomnessRequest)>,
    fail_next: bool,
}

impl LocalOracle {
    /// Create an oracle whose answers come from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            words: WordStream { state: seed },
            nonce: 0,
            outstanding: VecDeque::new(),
            fail_next: false,
        }
    }

    /// Requests submitted but not yet answered, oldest first.
    pub fn outstanding(&self) -> impl Iterator<Item = &(RequestHandle, RandomnessRequest)> {
        self.outstanding.iter()
    }

    /// Number of unanswered requests.
    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }

    /// Make the next submission fail once.
    pub fn fail_next_submission(&mut self) {
        self.fail_next = true;
    }

    /// Pop the oldest request without generating a value.
    pub fn take_next(&mut self) -> Option<RequestHandle> {
        self.outstanding.pop_front().map(|(handle, _)| handle)
    }

    /// Answer the oldest request.
    pub fn fulfill_next(&mut self) -> Option<Fulfillment> {
        let (handle, request) = self.outstanding.pop_front()?;
        Some(self.answer(handle, &request))
    }

    /// Answer `handle`, wherever it sits in the queue.
    pub fn fulfill(&mut self, handle: RequestHandle) -> Option<Fulfillment> {
        let position = self.outstanding.iter().position(|(queued, _)| *queued == handle)?;
        let (handle, request) = self.outstanding.remove(position)?;
        Some(self.answer(handle, &request))
    }

    fn answer(&mut self, handle: RequestHandle, request: &RandomnessRequest) -> Fulfillment {
        let random_words = (0..request.num_words.max(1))
            .map(|_| self.words.next_word())
            .collect();
        Fulfillment { handle, random_words }
    }

    /// Pick an element with the oracle's word stream (for hosts simulating players).
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.words.next_word() % items.len() as u64;
        items.get(index as usize)
    }
}

impl Default for LocalOracle {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RandomnessOracle for LocalOracle {
    fn submit_request(&mut self, request: &RandomnessRequest) -> Result<RequestHandle, OracleError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(OracleError::Unavailable("injected failure".to_string()));
        }

        let handle = RequestHandle(derive_request_id(request.round, self.nonce));
        self.nonce += 1;
        self.outstanding.push_back((handle, request.clone()));

        debug!(
            "Oracle accepted request {} for round {} ({:?})",
            handle.short(),
            request.round,
            request.purpose
        );
        Ok(handle)
    }
}
