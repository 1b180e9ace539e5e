//! Notification boundary between the core and the chat transport.
//!
//! The core announces state changes (new teams, full tournaments, round
//! pairings, the champion) through [`Notifier`]. Delivery is fire-and-forget:
//! a failing transport logs on its own side and never propagates an error
//! back into a core operation.

use serde::{Deserialize, Serialize};

use crate::tournament::models::{MatchId, TeamId, TournamentId, UserId};

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// All privileged operators
    Admins,
    /// One specific user
    User(UserId),
}

/// Typed callback payload attached to a notification choice.
///
/// The transport serializes an `Action` into whatever its button payloads
/// look like and hands it back intact; the boundary dispatches on the variant
/// by pattern match. This replaces delimiter-encoded action strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Start the registration workflow for a tournament
    JoinTournament { tournament_id: TournamentId },
    /// Record a match winner
    ReportWinner { match_id: MatchId, winner: TeamId },
}

/// A labeled choice offered alongside a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub action: Action,
}

impl Choice {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Outbound notification port. Implementations deliver messages over the
/// actual chat transport; the core never learns whether delivery succeeded.
pub trait Notifier: Send + Sync {
    fn notify(&self, audience: Audience, message: &str);

    fn notify_with_choices(&self, audience: Audience, message: &str, choices: &[Choice]);
}

/// Notifier that only writes to the log. Default for embedding the core
/// without a transport, and handy in tests.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, audience: Audience, message: &str) {
        log::info!("notify {audience:?}: {message}");
    }

    fn notify_with_choices(&self, audience: Audience, message: &str, choices: &[Choice]) {
        log::info!(
            "notify {audience:?}: {message} (choices: {:?})",
            choices.iter().map(|c| c.label.as_str()).collect::<Vec<_>>()
        );
    }
}
