//! In-memory snapshot store for tests and ephemeral embedding.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use super::{SnapshotStore, StoreResult};
use crate::tournament::models::{Team, TeamId, Tournament, TournamentId};

/// Snapshot store that keeps both collections in memory.
#[derive(Default)]
pub struct MemoryStore {
    tournaments: Mutex<HashMap<TournamentId, Tournament>>,
    teams: Mutex<HashMap<TeamId, Team>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn load_tournaments(&self) -> StoreResult<HashMap<TournamentId, Tournament>> {
        Ok(self
            .tournaments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save_tournaments(
        &self,
        tournaments: &HashMap<TournamentId, Tournament>,
    ) -> StoreResult<()> {
        *self
            .tournaments
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = tournaments.clone();
        Ok(())
    }

    fn load_teams(&self) -> StoreResult<HashMap<TeamId, Team>> {
        Ok(self
            .teams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save_teams(&self, teams: &HashMap<TeamId, Team>) -> StoreResult<()> {
        *self.teams.lock().unwrap_or_else(PoisonError::into_inner) = teams.clone();
        Ok(())
    }
}
