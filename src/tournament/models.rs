//! Data models for tournaments, teams and bracket matches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tournament ID type
pub type TournamentId = Uuid;

/// Team ID type
pub type TeamId = Uuid;

/// Match ID type (globally unique, not scoped to a tournament)
pub type MatchId = Uuid;

/// User ID type for the chat platform driving registrations
pub type UserId = i64;

/// Opaque reference to an uploaded roster asset. The core never resolves
/// asset bytes; that is the transport's job.
pub type AssetRef = String;

/// Caller identity for admin-gated operations. Authorization is resolved
/// upstream; the core only consumes the boolean.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Caller {
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }
}

/// Tournament lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Accepting team registrations
    Active,
    /// At capacity, registrations closed
    Full,
    /// Bracket generated, rounds in progress
    Started,
    /// Champion determined
    Finished,
}

/// Team status within its tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    /// Counted against capacity and eligible for brackets
    Active,
    /// Soft-deleted; kept so historical bracket references stay resolvable
    Removed,
}

/// A single bracket match.
///
/// `team2 == None` encodes a bye: the unpaired trailing team of an odd-sized
/// round advances automatically, with `winner` pre-set at creation. Byes are
/// never surfaced for winner reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    /// Round number, 1-indexed
    pub round: u32,
    pub team1: TeamId,
    pub team2: Option<TeamId>,
    /// Once set, never changed
    pub winner: Option<TeamId>,
}

impl Match {
    /// Create a regular match between two teams.
    pub fn pairing(round: u32, team1: TeamId, team2: TeamId) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            team1,
            team2: Some(team2),
            winner: None,
        }
    }

    /// Create a bye: the sole team has already won.
    pub fn bye(round: u32, team: TeamId) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            team1: team,
            team2: None,
            winner: Some(team),
        }
    }

    /// Whether this match is a bye.
    pub fn is_bye(&self) -> bool {
        self.team2.is_none()
    }

    /// Whether the given team plays in this match.
    pub fn has_participant(&self, team_id: TeamId) -> bool {
        self.team1 == team_id || self.team2 == Some(team_id)
    }
}

/// Full single-elimination bracket for one tournament.
///
/// Matches are append-only: each completed round's matches stay in place and
/// the next round's matches are pushed behind them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub matches: Vec<Match>,
    /// Round currently awaiting winner reports, 1-indexed
    pub current_round: u32,
}

impl Bracket {
    pub fn new(matches: Vec<Match>) -> Self {
        Self {
            matches,
            current_round: 1,
        }
    }

    /// Matches belonging to the given round, in creation order.
    pub fn round_matches(&self, round: u32) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.round == round)
    }

    /// Whether every match of the current round has a recorded winner.
    pub fn current_round_complete(&self) -> bool {
        self.round_matches(self.current_round)
            .all(|m| m.winner.is_some())
    }

    /// Winners of the given round in original match order. `None` entries are
    /// skipped (only possible for an incomplete round).
    pub fn round_winners(&self, round: u32) -> Vec<TeamId> {
        self.round_matches(round).filter_map(|m| m.winner).collect()
    }
}

/// A tournament record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Capacity; admissions beyond this count are rejected
    pub max_teams: u32,
    pub description: String,
    pub status: TournamentStatus,
    /// Present only from `Started` onwards; never reverts to `None`
    pub bracket: Option<Bracket>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn new(name: String, max_teams: u32, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            max_teams,
            description,
            status: TournamentStatus::Active,
            bracket: None,
            created_at: Utc::now(),
        }
    }
}

/// A registered team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    /// Unique (case-insensitively) among active teams of one tournament
    pub name: String,
    /// Leader's contact handle, stored without a leading `@`
    pub leader_contact: String,
    pub tournament_id: TournamentId,
    /// Exactly three opaque asset references once finalized
    pub roster_assets: Vec<AssetRef>,
    /// User who completed the registration
    pub registered_by: UserId,
    pub status: TeamStatus,
    /// Admission order across the whole store; drives team listings
    pub seq: u64,
    pub registered_at: DateTime<Utc>,
}

impl Team {
    pub fn is_active(&self) -> bool {
        self.status == TeamStatus::Active
    }
}
