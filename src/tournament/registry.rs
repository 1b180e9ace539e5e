//! Tournament registry: creation, team admission, removal and listings.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::Utc;
use uuid::Uuid;

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    AssetRef, Caller, Team, TeamId, TeamStatus, Tournament, TournamentId, TournamentStatus, UserId,
};
use crate::notify::{Audience, Notifier};
use crate::store::SnapshotStore;

/// The two shared collections plus the admission counter.
///
/// One lock guards everything: every mutating operation holds the write
/// guard across its whole read-validate-apply sequence, so capacity and
/// uniqueness checks are atomic with the writes they protect.
#[derive(Debug, Default)]
pub(crate) struct CoreState {
    pub(crate) tournaments: HashMap<TournamentId, Tournament>,
    pub(crate) teams: HashMap<TeamId, Team>,
    pub(crate) next_team_seq: u64,
}

impl CoreState {
    /// Active teams of one tournament in admission order.
    pub(crate) fn active_teams(&self, tournament_id: TournamentId) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self
            .teams
            .values()
            .filter(|t| t.tournament_id == tournament_id && t.is_active())
            .collect();
        teams.sort_by_key(|t| t.seq);
        teams
    }

    pub(crate) fn active_team_count(&self, tournament_id: TournamentId) -> usize {
        self.teams
            .values()
            .filter(|t| t.tournament_id == tournament_id && t.is_active())
            .count()
    }

    fn name_taken(&self, tournament_id: TournamentId, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.teams.values().any(|t| {
            t.tournament_id == tournament_id && t.is_active() && t.name.to_lowercase() == wanted
        })
    }
}

/// Registry over the shared tournament and team collections.
///
/// Cheap to clone; clones share the same state, store and notifier.
#[derive(Clone)]
pub struct TournamentRegistry {
    state: Arc<RwLock<CoreState>>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
}

impl TournamentRegistry {
    /// Open a registry, loading both collections from the store.
    ///
    /// The admission counter resumes one past the highest persisted `seq`.
    pub fn open(
        store: Arc<dyn SnapshotStore>,
        notifier: Arc<dyn Notifier>,
    ) -> TournamentResult<Self> {
        let tournaments = store.load_tournaments()?;
        let teams = store.load_teams()?;
        let next_team_seq = teams.values().map(|t| t.seq + 1).max().unwrap_or(0);

        log::info!(
            "loaded {} tournaments and {} teams",
            tournaments.len(),
            teams.len()
        );

        Ok(Self {
            state: Arc::new(RwLock::new(CoreState {
                tournaments,
                teams,
                next_team_seq,
            })),
            store,
            notifier,
        })
    }

    pub(crate) fn shared_state(&self) -> Arc<RwLock<CoreState>> {
        Arc::clone(&self.state)
    }

    pub(crate) fn shared_store(&self) -> Arc<dyn SnapshotStore> {
        Arc::clone(&self.store)
    }

    pub(crate) fn shared_notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }

    pub(crate) fn write_state(&self) -> RwLockWriteGuard<'_, CoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a new tournament. Admin-only.
    pub fn create_tournament(
        &self,
        caller: Caller,
        name: &str,
        max_teams: u32,
        description: &str,
    ) -> TournamentResult<TournamentId> {
        if !caller.is_admin {
            return Err(TournamentError::Unauthorized);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::InvalidInput(
                "tournament name must not be empty".into(),
            ));
        }
        if max_teams == 0 {
            return Err(TournamentError::InvalidInput(
                "max teams must be positive".into(),
            ));
        }

        let tournament = Tournament::new(name.to_string(), max_teams, description.to_string());
        let id = tournament.id;

        let mut state = self.write_state();
        state.tournaments.insert(id, tournament);
        self.store.save_tournaments(&state.tournaments)?;

        log::info!("created tournament {id} ({name}, capacity {max_teams})");
        Ok(id)
    }

    /// Admit a finalized registration as an active team.
    ///
    /// Holds the write guard across the capacity and uniqueness checks and
    /// the insert, so concurrent admissions cannot overshoot `max_teams` or
    /// race a duplicate name in.
    pub fn admit_team(
        &self,
        tournament_id: TournamentId,
        name: &str,
        leader_contact: &str,
        roster_assets: Vec<AssetRef>,
        registered_by: UserId,
    ) -> TournamentResult<TeamId> {
        let name = name.trim();
        let leader_contact = leader_contact.trim().trim_start_matches('@');
        if name.is_empty() {
            return Err(TournamentError::InvalidInput(
                "team name must not be empty".into(),
            ));
        }
        if leader_contact.is_empty() {
            return Err(TournamentError::InvalidInput(
                "leader contact must not be empty".into(),
            ));
        }
        if roster_assets.len() != 3 {
            return Err(TournamentError::InvalidInput(format!(
                "expected 3 roster assets, got {}",
                roster_assets.len()
            )));
        }

        let mut state = self.write_state();
        let tournament = state
            .tournaments
            .get(&tournament_id)
            .ok_or(TournamentError::TournamentNotFound(tournament_id))?;
        if tournament.bracket.is_some() {
            return Err(TournamentError::AlreadyStarted);
        }
        let max_teams = tournament.max_teams;
        let tournament_name = tournament.name.clone();

        let active_count = state.active_team_count(tournament_id);
        if active_count >= max_teams as usize {
            return Err(TournamentError::Full);
        }
        if state.name_taken(tournament_id, name) {
            return Err(TournamentError::DuplicateName);
        }

        let seq = state.next_team_seq;
        state.next_team_seq += 1;
        let team = Team {
            id: Uuid::new_v4(),
            name: name.to_string(),
            leader_contact: leader_contact.to_string(),
            tournament_id,
            roster_assets,
            registered_by,
            status: TeamStatus::Active,
            seq,
            registered_at: Utc::now(),
        };
        let team_id = team.id;
        state.teams.insert(team_id, team);

        let new_count = active_count + 1;
        let now_full = new_count >= max_teams as usize;
        if now_full {
            if let Some(t) = state.tournaments.get_mut(&tournament_id) {
                t.status = TournamentStatus::Full;
            }
        }

        self.notifier.notify(
            Audience::Admins,
            &format!(
                "New team registered!\nTournament: {tournament_name}\nTeam: {name}\n\
                 Leader: @{leader_contact}\nTotal teams: {new_count}/{max_teams}"
            ),
        );
        self.notifier
            .notify(Audience::Admins, &roster_summary(&state, tournament_id));
        if now_full {
            self.notifier.notify(
                Audience::Admins,
                &format!("Tournament {tournament_name} is now FULL!"),
            );
        }

        self.store.save_teams(&state.teams)?;
        if now_full {
            self.store.save_tournaments(&state.tournaments)?;
        }

        log::info!("admitted team {team_id} ({name}) into tournament {tournament_id}");
        Ok(team_id)
    }

    /// Soft-delete a team. Admin-only.
    ///
    /// A full tournament that has not started reopens for registration.
    pub fn remove_team(&self, caller: Caller, team_id: TeamId) -> TournamentResult<()> {
        if !caller.is_admin {
            return Err(TournamentError::Unauthorized);
        }

        let mut state = self.write_state();
        let team = state
            .teams
            .get_mut(&team_id)
            .filter(|t| t.is_active())
            .ok_or(TournamentError::TeamNotFound(team_id))?;
        team.status = TeamStatus::Removed;
        let tournament_id = team.tournament_id;
        let team_name = team.name.clone();

        let active_count = state.active_team_count(tournament_id);
        let mut tournaments_dirty = false;
        if let Some(t) = state.tournaments.get_mut(&tournament_id)
            && t.status == TournamentStatus::Full
            && t.bracket.is_none()
            && active_count < t.max_teams as usize
        {
            t.status = TournamentStatus::Active;
            tournaments_dirty = true;
        }

        self.store.save_teams(&state.teams)?;
        if tournaments_dirty {
            self.store.save_tournaments(&state.tournaments)?;
        }

        log::info!("removed team {team_id} ({team_name}) from tournament {tournament_id}");
        Ok(())
    }

    /// Delete a tournament and every team registered to it. Admin-only.
    pub fn delete_tournament(
        &self,
        caller: Caller,
        tournament_id: TournamentId,
    ) -> TournamentResult<()> {
        if !caller.is_admin {
            return Err(TournamentError::Unauthorized);
        }

        let mut state = self.write_state();
        let tournament = state
            .tournaments
            .remove(&tournament_id)
            .ok_or(TournamentError::TournamentNotFound(tournament_id))?;
        state.teams.retain(|_, t| t.tournament_id != tournament_id);

        self.store.save_tournaments(&state.tournaments)?;
        self.store.save_teams(&state.teams)?;

        log::info!("deleted tournament {tournament_id} ({})", tournament.name);
        Ok(())
    }

    /// Active teams of a tournament in admission order.
    pub fn list_active_teams(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Team>> {
        let state = self.read_state();
        if !state.tournaments.contains_key(&tournament_id) {
            return Err(TournamentError::TournamentNotFound(tournament_id));
        }
        Ok(state
            .active_teams(tournament_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// All tournaments, newest first.
    pub fn list_tournaments(&self) -> Vec<Tournament> {
        let state = self.read_state();
        let mut tournaments: Vec<Tournament> = state.tournaments.values().cloned().collect();
        tournaments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tournaments
    }

    pub fn get_tournament(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        self.read_state()
            .tournaments
            .get(&tournament_id)
            .cloned()
            .ok_or(TournamentError::TournamentNotFound(tournament_id))
    }

    pub fn get_team(&self, team_id: TeamId) -> TournamentResult<Team> {
        self.read_state()
            .teams
            .get(&team_id)
            .cloned()
            .ok_or(TournamentError::TeamNotFound(team_id))
    }

    /// Number of active teams, for capacity captions like `3/8`.
    pub fn active_team_count(&self, tournament_id: TournamentId) -> TournamentResult<usize> {
        let state = self.read_state();
        if !state.tournaments.contains_key(&tournament_id) {
            return Err(TournamentError::TournamentNotFound(tournament_id));
        }
        Ok(state.active_team_count(tournament_id))
    }
}

fn roster_summary(state: &CoreState, tournament_id: TournamentId) -> String {
    let Some(tournament) = state.tournaments.get(&tournament_id) else {
        return String::new();
    };
    let teams = state.active_teams(tournament_id);
    let mut text = format!("Teams in {}:\n\n", tournament.name);
    for (i, team) in teams.iter().enumerate() {
        text.push_str(&format!(
            "{}. {} (@{})\n",
            i + 1,
            team.name,
            team.leader_contact
        ));
    }
    text.push_str(&format!(
        "\nTotal: {}/{}",
        teams.len(),
        tournament.max_teams
    ));
    text
}
