//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use team_brackets::{
    Caller, TournamentRegistry,
    notify::{Audience, Choice, Notifier},
    store::MemoryStore,
    tournament::models::{TeamId, TournamentId},
};

/// Notifier that records every delivery for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(Audience, String)>>,
    pub choice_messages: Mutex<Vec<(Audience, String, Vec<Choice>)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages_containing(&self, needle: &str) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, m)| m.contains(needle))
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, audience: Audience, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((audience, message.to_string()));
    }

    fn notify_with_choices(&self, audience: Audience, message: &str, choices: &[Choice]) {
        self.choice_messages.lock().unwrap().push((
            audience,
            message.to_string(),
            choices.to_vec(),
        ));
    }
}

pub const ADMIN: Caller = Caller {
    user_id: 1,
    is_admin: true,
};

pub const OUTSIDER: Caller = Caller {
    user_id: 99,
    is_admin: false,
};

/// Registry over a fresh in-memory store plus the notifier recording it.
pub fn new_registry() -> (TournamentRegistry, Arc<RecordingNotifier>) {
    let notifier = RecordingNotifier::new();
    let registry = TournamentRegistry::open(Arc::new(MemoryStore::new()), notifier.clone())
        .expect("open registry");
    (registry, notifier)
}

/// Create a tournament and admit `names` as teams.
pub fn seed_tournament(
    registry: &TournamentRegistry,
    max_teams: u32,
    names: &[&str],
) -> (TournamentId, Vec<TeamId>) {
    let tournament_id = registry
        .create_tournament(ADMIN, "Test Cup", max_teams, "integration fixture")
        .expect("create tournament");
    let team_ids = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            registry
                .admit_team(
                    tournament_id,
                    name,
                    &format!("{}_lead", name.to_lowercase()),
                    vec!["r1".into(), "r2".into(), "r3".into()],
                    100 + i as i64,
                )
                .expect("admit team")
        })
        .collect();
    (tournament_id, team_ids)
}
