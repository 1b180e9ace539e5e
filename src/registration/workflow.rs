//! Per-user registration state machine.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use crate::tournament::{
    TournamentError, TournamentRegistry, TournamentResult,
    models::{AssetRef, TeamId, TournamentId, UserId},
};

/// Where a registration session currently is. Each state carries exactly the
/// data accumulated so far; there are no optional half-filled fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    AwaitingTeamName,
    AwaitingLeaderContact {
        team_name: String,
    },
    AwaitingRosterAsset {
        team_name: String,
        leader_contact: String,
        assets: Vec<AssetRef>,
    },
}

/// One user's in-flight registration. Transient; never persisted.
#[derive(Debug, Clone)]
pub struct RegistrationSession {
    pub tournament_id: TournamentId,
    pub state: SessionState,
}

/// What a workflow step produced.
#[derive(Debug)]
pub enum StepOutcome {
    /// Input consumed; show this prompt to the user.
    Prompt(String),
    /// Input was invalid for this step; the session stays put so the user
    /// can retry.
    Rejected(String),
    /// Input did not match the kind expected by the current state (or the
    /// user has no session). Dropped without comment, so stray messages
    /// interleaved with the flow do nothing.
    Ignored,
    /// Registration finished and the team was admitted.
    Admitted(TeamId),
    /// The registry rejected the admission; the session is gone and the
    /// user must start over.
    Failed(TournamentError),
}

/// The number of roster assets a finalized registration carries.
pub const ROSTER_ASSET_COUNT: usize = 3;

/// Drives team registrations, one session per user.
///
/// Sessions are independent across users; admission itself serializes
/// through the registry's lock.
pub struct RegistrationWorkflow {
    sessions: RwLock<HashMap<UserId, RegistrationSession>>,
    registry: TournamentRegistry,
}

impl RegistrationWorkflow {
    pub fn new(registry: TournamentRegistry) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            registry,
        }
    }

    /// Start (or restart) a registration for `user`.
    ///
    /// An existing session for the user is overwritten. Fails up front if
    /// the tournament is unknown, already underway, or at capacity.
    pub fn begin(&self, user: UserId, tournament_id: TournamentId) -> TournamentResult<String> {
        let tournament = self.registry.get_tournament(tournament_id)?;
        if tournament.bracket.is_some() {
            return Err(TournamentError::AlreadyStarted);
        }
        if self.registry.active_team_count(tournament_id)? >= tournament.max_teams as usize {
            return Err(TournamentError::Full);
        }

        let mut sessions = self.write_sessions();
        sessions.insert(
            user,
            RegistrationSession {
                tournament_id,
                state: SessionState::AwaitingTeamName,
            },
        );
        log::info!("user {user} started registration for tournament {tournament_id}");
        Ok(format!(
            "Joining: {}\n\nPlease enter your team name:",
            tournament.name
        ))
    }

    /// Feed a text input (team name or leader contact) into the user's
    /// session.
    pub fn handle_text(&self, user: UserId, text: &str) -> StepOutcome {
        let mut sessions = self.write_sessions();
        let Some(session) = sessions.get_mut(&user) else {
            return StepOutcome::Ignored;
        };

        match &session.state {
            SessionState::AwaitingTeamName => {
                let name = text.trim();
                if name.is_empty() {
                    return StepOutcome::Rejected("Please enter a valid team name:".into());
                }
                match self.name_available(session.tournament_id, name) {
                    Ok(true) => {}
                    Ok(false) => {
                        return StepOutcome::Rejected(
                            "Team name already exists in this tournament. \
                             Please choose a different name:"
                                .into(),
                        );
                    }
                    // Tournament vanished mid-session; nothing left to retry.
                    Err(err) => {
                        sessions.remove(&user);
                        return StepOutcome::Failed(err);
                    }
                }
                session.state = SessionState::AwaitingLeaderContact {
                    team_name: name.to_string(),
                };
                StepOutcome::Prompt(
                    "Please enter the team leader's username (for contact):".into(),
                )
            }
            SessionState::AwaitingLeaderContact { team_name } => {
                let contact = text.trim().trim_start_matches('@');
                if contact.is_empty() {
                    return StepOutcome::Rejected("Please enter a valid username:".into());
                }
                session.state = SessionState::AwaitingRosterAsset {
                    team_name: team_name.clone(),
                    leader_contact: contact.to_string(),
                    assets: Vec::with_capacity(ROSTER_ASSET_COUNT),
                };
                StepOutcome::Prompt(format!(
                    "Please send {ROSTER_ASSET_COUNT} roster photos (send them one by one):"
                ))
            }
            SessionState::AwaitingRosterAsset { .. } => StepOutcome::Ignored,
        }
    }

    /// Feed an uploaded roster asset into the user's session. The third
    /// asset finalizes the registration and attempts admission.
    pub fn handle_asset(&self, user: UserId, asset: AssetRef) -> StepOutcome {
        let mut sessions = self.write_sessions();
        let Some(session) = sessions.get_mut(&user) else {
            return StepOutcome::Ignored;
        };
        let SessionState::AwaitingRosterAsset { assets, .. } = &mut session.state else {
            return StepOutcome::Ignored;
        };

        assets.push(asset);
        let remaining = ROSTER_ASSET_COUNT.saturating_sub(assets.len());
        if remaining > 0 {
            return StepOutcome::Prompt(format!(
                "Photo received! Send {remaining} more photo(s)."
            ));
        }

        // Finalized; the session is consumed whether admission succeeds or
        // not. No retry on rejection.
        match sessions.remove(&user) {
            Some(RegistrationSession {
                tournament_id,
                state:
                    SessionState::AwaitingRosterAsset {
                        team_name,
                        leader_contact,
                        assets,
                    },
            }) => match self
                .registry
                .admit_team(tournament_id, &team_name, &leader_contact, assets, user)
            {
                Ok(team_id) => StepOutcome::Admitted(team_id),
                Err(err) => {
                    log::warn!("admission failed for user {user}: {err}");
                    StepOutcome::Failed(err)
                }
            },
            _ => StepOutcome::Ignored,
        }
    }

    /// Drop the user's session, if any.
    pub fn cancel(&self, user: UserId) -> bool {
        self.write_sessions().remove(&user).is_some()
    }

    /// Snapshot of the user's current session.
    pub fn session(&self, user: UserId) -> Option<RegistrationSession> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user)
            .cloned()
    }

    fn write_sessions(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<UserId, RegistrationSession>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn name_available(
        &self,
        tournament_id: TournamentId,
        name: &str,
    ) -> TournamentResult<bool> {
        let wanted = name.to_lowercase();
        let teams = self.registry.list_active_teams(tournament_id)?;
        Ok(!teams.iter().any(|t| t.name.to_lowercase() == wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogNotifier;
    use crate::store::MemoryStore;
    use crate::tournament::models::Caller;
    use std::sync::Arc;

    fn workflow_with_tournament(max_teams: u32) -> (RegistrationWorkflow, TournamentId) {
        let registry = TournamentRegistry::open(
            Arc::new(MemoryStore::new()),
            Arc::new(LogNotifier),
        )
        .expect("open registry");
        let id = registry
            .create_tournament(Caller::admin(1), "Test Cup", max_teams, "test")
            .expect("create tournament");
        (RegistrationWorkflow::new(registry), id)
    }

    #[test]
    fn test_happy_path_admits_after_three_assets() {
        let (workflow, tournament_id) = workflow_with_tournament(4);
        workflow.begin(10, tournament_id).unwrap();

        assert!(matches!(
            workflow.handle_text(10, "Alpha"),
            StepOutcome::Prompt(_)
        ));
        assert!(matches!(
            workflow.handle_text(10, "@alpha_lead"),
            StepOutcome::Prompt(_)
        ));
        assert!(matches!(
            workflow.handle_asset(10, "p1.jpg".into()),
            StepOutcome::Prompt(_)
        ));
        assert!(matches!(
            workflow.handle_asset(10, "p2.jpg".into()),
            StepOutcome::Prompt(_)
        ));
        let outcome = workflow.handle_asset(10, "p3.jpg".into());
        assert!(matches!(outcome, StepOutcome::Admitted(_)));
        assert!(workflow.session(10).is_none());
    }

    #[test]
    fn test_wrong_kind_inputs_are_ignored() {
        let (workflow, tournament_id) = workflow_with_tournament(4);
        workflow.begin(10, tournament_id).unwrap();

        // Asset while awaiting a name, text while awaiting assets.
        assert!(matches!(
            workflow.handle_asset(10, "early.jpg".into()),
            StepOutcome::Ignored
        ));
        workflow.handle_text(10, "Alpha");
        workflow.handle_text(10, "alpha_lead");
        assert!(matches!(
            workflow.handle_text(10, "stray message"),
            StepOutcome::Ignored
        ));
        // No session at all.
        assert!(matches!(
            workflow.handle_text(99, "hello"),
            StepOutcome::Ignored
        ));
    }

    #[test]
    fn test_blank_and_duplicate_names_keep_session_alive() {
        let (workflow, tournament_id) = workflow_with_tournament(4);

        workflow.begin(10, tournament_id).unwrap();
        workflow.handle_text(10, "Alpha");
        workflow.handle_text(10, "lead_a");
        workflow.handle_asset(10, "1".into());
        workflow.handle_asset(10, "2".into());
        workflow.handle_asset(10, "3".into());

        workflow.begin(11, tournament_id).unwrap();
        assert!(matches!(
            workflow.handle_text(11, "   "),
            StepOutcome::Rejected(_)
        ));
        assert!(matches!(
            workflow.handle_text(11, "ALPHA"),
            StepOutcome::Rejected(_)
        ));
        assert!(matches!(
            workflow.session(11).unwrap().state,
            SessionState::AwaitingTeamName
        ));
        assert!(matches!(
            workflow.handle_text(11, "Bravo"),
            StepOutcome::Prompt(_)
        ));
    }

    #[test]
    fn test_rejoin_overwrites_session() {
        let (workflow, tournament_id) = workflow_with_tournament(4);
        workflow.begin(10, tournament_id).unwrap();
        workflow.handle_text(10, "Alpha");

        workflow.begin(10, tournament_id).unwrap();
        assert!(matches!(
            workflow.session(10).unwrap().state,
            SessionState::AwaitingTeamName
        ));
    }

    #[test]
    fn test_contact_strips_leading_at() {
        let (workflow, tournament_id) = workflow_with_tournament(4);
        workflow.begin(10, tournament_id).unwrap();
        workflow.handle_text(10, "Alpha");
        workflow.handle_text(10, "@lead");
        match workflow.session(10).unwrap().state {
            SessionState::AwaitingRosterAsset { leader_contact, .. } => {
                assert_eq!(leader_contact, "lead");
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_begin_rejects_full_tournament() {
        let (workflow, tournament_id) = workflow_with_tournament(1);
        workflow.begin(10, tournament_id).unwrap();
        workflow.handle_text(10, "Alpha");
        workflow.handle_text(10, "lead");
        workflow.handle_asset(10, "1".into());
        workflow.handle_asset(10, "2".into());
        workflow.handle_asset(10, "3".into());

        assert!(matches!(
            workflow.begin(11, tournament_id),
            Err(TournamentError::Full)
        ));
    }

    #[test]
    fn test_cancel_drops_session() {
        let (workflow, tournament_id) = workflow_with_tournament(4);
        workflow.begin(10, tournament_id).unwrap();
        assert!(workflow.cancel(10));
        assert!(!workflow.cancel(10));
        assert!(matches!(
            workflow.handle_text(10, "Alpha"),
            StepOutcome::Ignored
        ));
    }
}
