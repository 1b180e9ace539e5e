//! Bracket engine: pairing generation, winner recording and round
//! progression until a champion is determined.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::seq::SliceRandom;

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    Bracket, Caller, Match, MatchId, Team, TeamId, TournamentId, TournamentStatus,
};
use super::registry::{CoreState, TournamentRegistry};
use crate::notify::{Action, Audience, Choice, Notifier};
use crate::store::SnapshotStore;

/// Drives a tournament's bracket from generation to champion.
///
/// Shares the registry's state, store and notifier; all mutations serialize
/// through the same lock as admissions.
#[derive(Clone)]
pub struct BracketEngine {
    state: Arc<RwLock<CoreState>>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
}

impl BracketEngine {
    /// Create an engine over the same collections as `registry`.
    pub fn new(registry: &TournamentRegistry) -> Self {
        Self {
            state: registry.shared_state(),
            store: registry.shared_store(),
            notifier: registry.shared_notifier(),
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generate the round-1 pairings for a tournament. Admin-only.
    ///
    /// Active teams are shuffled uniformly and paired consecutively; an odd
    /// trailing team receives a bye. The tournament moves to `Started` and
    /// the pairings are announced for winner reporting.
    pub fn generate_bracket(
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
            .get(&tournament_id)
            .ok_or(TournamentError::TournamentNotFound(tournament_id))?;
        if tournament.bracket.is_some() {
            return Err(TournamentError::AlreadyStarted);
        }
        let tournament_name = tournament.name.clone();

        let mut team_ids: Vec<TeamId> = state
            .active_teams(tournament_id)
            .into_iter()
            .map(|t| t.id)
            .collect();
        // A lone team is not auto-crowned; generation requires a real round.
        if team_ids.len() < 2 {
            return Err(TournamentError::InsufficientTeams {
                current: team_ids.len(),
            });
        }

        team_ids.shuffle(&mut rand::rng());
        let matches = pair_round(&team_ids, 1);

        let tournament = state
            .tournaments
            .get_mut(&tournament_id)
            .ok_or(TournamentError::TournamentNotFound(tournament_id))?;
        tournament.bracket = Some(Bracket::new(matches));
        tournament.status = TournamentStatus::Started;

        self.announce_round(&state, tournament_id, 1, &tournament_name);
        self.store.save_tournaments(&state.tournaments)?;

        log::info!("generated bracket for tournament {tournament_id} ({tournament_name})");
        Ok(())
    }

    /// Record the winner of a match.
    ///
    /// Re-reporting the same winner is a no-op; reporting a different winner
    /// once one is recorded fails with `Conflict`. Completing the last open
    /// match of the current round advances the bracket.
    pub fn report_winner(
        &self,
        caller: Caller,
        match_id: MatchId,
        winner: TeamId,
    ) -> TournamentResult<()> {
        if !caller.is_admin {
            return Err(TournamentError::Unauthorized);
        }

        let mut state = self.write_state();
        let tournament_id = find_match(&state, match_id)?;

        let bracket = state
            .tournaments
            .get_mut(&tournament_id)
            .and_then(|t| t.bracket.as_mut())
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        let m = bracket
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?;

        if !m.has_participant(winner) {
            return Err(TournamentError::InvalidWinner);
        }
        match m.winner {
            Some(recorded) if recorded == winner => return Ok(()),
            Some(_) => return Err(TournamentError::Conflict),
            None => m.winner = Some(winner),
        }

        log::info!("recorded winner {winner} for match {match_id}");

        if state
            .tournaments
            .get(&tournament_id)
            .and_then(|t| t.bracket.as_ref())
            .is_some_and(Bracket::current_round_complete)
        {
            self.advance_round(&mut state, tournament_id);
        }

        self.store.save_tournaments(&state.tournaments)?;
        Ok(())
    }

    /// Current-round matches still awaiting a winner report. Byes never
    /// appear here.
    pub fn pending_matches(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Match>> {
        let state = self.read_state();
        let tournament = state
            .tournaments
            .get(&tournament_id)
            .ok_or(TournamentError::TournamentNotFound(tournament_id))?;
        let Some(bracket) = &tournament.bracket else {
            return Ok(Vec::new());
        };
        Ok(bracket
            .round_matches(bracket.current_round)
            .filter(|m| m.winner.is_none())
            .cloned()
            .collect())
    }

    /// The champion, once the tournament is finished.
    pub fn champion(&self, tournament_id: TournamentId) -> TournamentResult<Option<TeamId>> {
        let state = self.read_state();
        let tournament = state
            .tournaments
            .get(&tournament_id)
            .ok_or(TournamentError::TournamentNotFound(tournament_id))?;
        if tournament.status != TournamentStatus::Finished {
            return Ok(None);
        }
        let champion = tournament
            .bracket
            .as_ref()
            .and_then(|b| b.round_winners(b.current_round).into_iter().next());
        Ok(champion)
    }

    /// Collect the completed round's winners and either crown a champion or
    /// append the next round's pairings.
    fn advance_round(&self, state: &mut CoreState, tournament_id: TournamentId) {
        let Some(tournament) = state.tournaments.get_mut(&tournament_id) else {
            return;
        };
        let tournament_name = tournament.name.clone();
        let Some(bracket) = tournament.bracket.as_mut() else {
            return;
        };

        let winners = bracket.round_winners(bracket.current_round);
        if let [champion] = winners[..] {
            tournament.status = TournamentStatus::Finished;
            let champion_name = state
                .teams
                .get(&champion)
                .map_or_else(|| champion.to_string(), |t| t.name.clone());
            self.notifier.notify(
                Audience::Admins,
                &format!(
                    "TOURNAMENT FINISHED!\nTournament: {tournament_name}\n\
                     1st place: {champion_name}\nCongratulations to the winners!"
                ),
            );
            log::info!(
                "tournament {tournament_id} finished, champion {champion} ({champion_name})"
            );
            return;
        }

        let next_round = bracket.current_round + 1;
        let mut matches = pair_round(&winners, next_round);
        bracket.matches.append(&mut matches);
        bracket.current_round = next_round;

        self.announce_round(state, tournament_id, next_round, &tournament_name);
        log::info!("tournament {tournament_id} advanced to round {next_round}");
    }

    /// Announce a round's pairings to admins: a summary plus one
    /// choice-message per reportable match. Byes get no choices.
    fn announce_round(
        &self,
        state: &CoreState,
        tournament_id: TournamentId,
        round: u32,
        tournament_name: &str,
    ) {
        let Some(bracket) = state
            .tournaments
            .get(&tournament_id)
            .and_then(|t| t.bracket.as_ref())
        else {
            return;
        };
        let team_name = |id: TeamId| {
            state
                .teams
                .get(&id)
                .map_or_else(|| id.to_string(), |t: &Team| t.name.clone())
        };

        let mut text = format!("Bracket for {tournament_name} - Round {round}:\n\n");
        for m in bracket.round_matches(round) {
            let team1 = team_name(m.team1);
            match m.team2 {
                Some(team2_id) => {
                    let team2 = team_name(team2_id);
                    text.push_str(&format!("{team1} vs {team2}\n"));
                    self.notifier.notify_with_choices(
                        Audience::Admins,
                        &format!("Match: {team1} vs {team2}"),
                        &[
                            Choice::new(
                                team1.clone(),
                                Action::ReportWinner {
                                    match_id: m.id,
                                    winner: m.team1,
                                },
                            ),
                            Choice::new(
                                team2,
                                Action::ReportWinner {
                                    match_id: m.id,
                                    winner: team2_id,
                                },
                            ),
                        ],
                    );
                }
                None => text.push_str(&format!("{team1} vs BYE\n")),
            }
        }
        self.notifier.notify(Audience::Admins, &text);
    }
}

/// Pair ids consecutively into matches for `round`; an odd trailing id
/// becomes a bye.
fn pair_round(team_ids: &[TeamId], round: u32) -> Vec<Match> {
    let mut matches = Vec::with_capacity(team_ids.len().div_ceil(2));
    let mut pairs = team_ids.chunks_exact(2);
    for pair in &mut pairs {
        matches.push(Match::pairing(round, pair[0], pair[1]));
    }
    if let [odd] = pairs.remainder() {
        matches.push(Match::bye(round, *odd));
    }
    matches
}

/// Locate a match by id across every started tournament.
fn find_match(state: &CoreState, match_id: MatchId) -> TournamentResult<TournamentId> {
    for tournament in state.tournaments.values() {
        if let Some(bracket) = &tournament.bracket
            && bracket.matches.iter().any(|m| m.id == match_id)
        {
            return Ok(tournament.id);
        }
    }
    Err(TournamentError::MatchNotFound(match_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_pair_round_even() {
        let ids: Vec<TeamId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let matches = pair_round(&ids, 1);
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| !m.is_bye()));
        assert_eq!(matches[0].team1, ids[0]);
        assert_eq!(matches[0].team2, Some(ids[1]));
        assert_eq!(matches[1].team1, ids[2]);
        assert_eq!(matches[1].team2, Some(ids[3]));
    }

    #[test]
    fn test_pair_round_odd_gets_trailing_bye() {
        let ids: Vec<TeamId> = (0..5).map(|_| Uuid::new_v4()).collect();
        let matches = pair_round(&ids, 2);
        assert_eq!(matches.len(), 3);
        let bye = &matches[2];
        assert!(bye.is_bye());
        assert_eq!(bye.team1, ids[4]);
        assert_eq!(bye.winner, Some(ids[4]));
        assert_eq!(bye.round, 2);
    }
}
