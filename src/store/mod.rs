//! Snapshot persistence for the two core collections.
//!
//! The store works in whole-collection snapshots: `load_*` returns everything,
//! `save_*` overwrites everything (last write wins). There are no partial or
//! incremental writes. Trait-based so the core can be tested against an
//! in-memory implementation.

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use std::collections::HashMap;
use thiserror::Error;

use crate::tournament::models::{Team, TeamId, Tournament, TournamentId};

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing data exists but does not parse; refusing to treat it as empty
    #[error("store data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Whole-collection snapshot persistence.
///
/// Missing backing data loads as an empty collection; corrupt data is an
/// error, never silently empty.
pub trait SnapshotStore: Send + Sync {
    fn load_tournaments(&self) -> StoreResult<HashMap<TournamentId, Tournament>>;

    fn save_tournaments(&self, tournaments: &HashMap<TournamentId, Tournament>)
    -> StoreResult<()>;

    fn load_teams(&self) -> StoreResult<HashMap<TeamId, Team>>;

    fn save_teams(&self, teams: &HashMap<TeamId, Team>) -> StoreResult<()>;
}
