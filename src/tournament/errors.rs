//! Tournament error types.

use thiserror::Error;

use super::models::{MatchId, TeamId, TournamentId};
use crate::store::StoreError;

/// Errors returned by the registry and bracket engine.
///
/// Every variant is recoverable and carries a distinct, human-readable
/// message; callers surface these to users as-is.
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("team not found: {0}")]
    TeamNotFound(TeamId),

    #[error("match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("tournament is full")]
    Full,

    #[error("team name already taken in this tournament")]
    DuplicateName,

    #[error("need at least 2 teams to generate a bracket, have {current}")]
    InsufficientTeams { current: usize },

    #[error("bracket already generated for this tournament")]
    AlreadyStarted,

    #[error("winner is not a participant of this match")]
    InvalidWinner,

    #[error("a different winner is already recorded for this match")]
    Conflict,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("admin access required")]
    Unauthorized,

    /// A snapshot write failed after the in-memory mutation was applied.
    /// State is kept; the next successful mutation re-persists everything.
    #[error("failed to persist snapshot: {0}")]
    Persistence(#[from] StoreError),
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
