//! Integration tests for team admission and the registration workflow.

mod common;

use common::{ADMIN, OUTSIDER, new_registry, seed_tournament};
use team_brackets::{
    RegistrationWorkflow, StepOutcome, TournamentError,
    tournament::models::TournamentStatus,
};
use uuid::Uuid;

fn assets() -> Vec<String> {
    vec!["r1".into(), "r2".into(), "r3".into()]
}

#[test]
fn test_admission_never_exceeds_capacity() {
    let (registry, _) = new_registry();
    let (tournament_id, _) = seed_tournament(&registry, 2, &["Alpha", "Bravo"]);

    assert!(matches!(
        registry.admit_team(tournament_id, "Charlie", "c_lead", assets(), 12),
        Err(TournamentError::Full)
    ));
    assert_eq!(registry.active_team_count(tournament_id).unwrap(), 2);
    assert_eq!(
        registry.get_tournament(tournament_id).unwrap().status,
        TournamentStatus::Full
    );
}

#[test]
fn test_duplicate_names_case_insensitive() {
    let (registry, _) = new_registry();
    let (tournament_id, _) = seed_tournament(&registry, 8, &["Alpha"]);

    for name in ["Alpha", "alpha", "ALPHA", "  alpha  "] {
        assert!(
            matches!(
                registry.admit_team(tournament_id, name, "x_lead", assets(), 13),
                Err(TournamentError::DuplicateName)
            ),
            "{name:?} should collide"
        );
    }

    // The same name is fine in a different tournament.
    let (other, _) = seed_tournament(&registry, 8, &[]);
    registry
        .admit_team(other, "Alpha", "x_lead", assets(), 13)
        .unwrap();
}

#[test]
fn test_admission_validates_inputs() {
    let (registry, _) = new_registry();
    let (tournament_id, _) = seed_tournament(&registry, 8, &[]);

    assert!(matches!(
        registry.admit_team(tournament_id, "  ", "lead", assets(), 10),
        Err(TournamentError::InvalidInput(_))
    ));
    assert!(matches!(
        registry.admit_team(tournament_id, "Alpha", "@", assets(), 10),
        Err(TournamentError::InvalidInput(_))
    ));
    assert!(matches!(
        registry.admit_team(tournament_id, "Alpha", "lead", vec!["one".into()], 10),
        Err(TournamentError::InvalidInput(_))
    ));
    assert!(matches!(
        registry.admit_team(Uuid::new_v4(), "Alpha", "lead", assets(), 10),
        Err(TournamentError::TournamentNotFound(_))
    ));
}

#[test]
fn test_removing_a_team_reopens_a_full_tournament() {
    let (registry, _) = new_registry();
    let (tournament_id, team_ids) = seed_tournament(&registry, 2, &["Alpha", "Bravo"]);
    assert_eq!(
        registry.get_tournament(tournament_id).unwrap().status,
        TournamentStatus::Full
    );

    registry.remove_team(ADMIN, team_ids[0]).unwrap();
    assert_eq!(
        registry.get_tournament(tournament_id).unwrap().status,
        TournamentStatus::Active
    );
    // Soft delete: the record resolves, the name is free again.
    assert!(!registry.get_team(team_ids[0]).unwrap().is_active());
    registry
        .admit_team(tournament_id, "Alpha", "new_lead", assets(), 20)
        .unwrap();

    // Removing an already-removed team is NotFound.
    assert!(matches!(
        registry.remove_team(ADMIN, team_ids[0]),
        Err(TournamentError::TeamNotFound(_))
    ));
}

#[test]
fn test_delete_tournament_cascades() {
    let (registry, _) = new_registry();
    let (tournament_id, team_ids) = seed_tournament(&registry, 4, &["Alpha", "Bravo"]);

    registry.delete_tournament(ADMIN, tournament_id).unwrap();

    assert!(matches!(
        registry.list_active_teams(tournament_id),
        Err(TournamentError::TournamentNotFound(_))
    ));
    for team_id in team_ids {
        assert!(matches!(
            registry.get_team(team_id),
            Err(TournamentError::TeamNotFound(_))
        ));
    }
    assert!(matches!(
        registry.delete_tournament(ADMIN, tournament_id),
        Err(TournamentError::TournamentNotFound(_))
    ));
}

#[test]
fn test_list_active_teams_in_admission_order() {
    let (registry, _) = new_registry();
    let (tournament_id, _) =
        seed_tournament(&registry, 8, &["Zulu", "Alpha", "Mike", "Bravo"]);

    let names: Vec<String> = registry
        .list_active_teams(tournament_id)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, ["Zulu", "Alpha", "Mike", "Bravo"]);
}

#[test]
fn test_admin_gating() {
    let (registry, _) = new_registry();
    let (tournament_id, team_ids) = seed_tournament(&registry, 4, &["Alpha"]);

    assert!(matches!(
        registry.create_tournament(OUTSIDER, "Nope", 4, ""),
        Err(TournamentError::Unauthorized)
    ));
    assert!(matches!(
        registry.remove_team(OUTSIDER, team_ids[0]),
        Err(TournamentError::Unauthorized)
    ));
    assert!(matches!(
        registry.delete_tournament(OUTSIDER, tournament_id),
        Err(TournamentError::Unauthorized)
    ));
}

#[test]
fn test_create_tournament_rejects_zero_capacity() {
    let (registry, _) = new_registry();
    assert!(matches!(
        registry.create_tournament(ADMIN, "Tiny", 0, ""),
        Err(TournamentError::InvalidInput(_))
    ));
}

#[test]
fn test_workflow_fills_tournament_and_notifies() {
    let (registry, notifier) = new_registry();
    let (tournament_id, _) = seed_tournament(&registry, 2, &[]);
    let workflow = RegistrationWorkflow::new(registry.clone());

    for (user, name) in [(10, "Alpha"), (11, "Beta")] {
        workflow.begin(user, tournament_id).unwrap();
        workflow.handle_text(user, name);
        workflow.handle_text(user, &format!("@{}_lead", name.to_lowercase()));
        workflow.handle_asset(user, "p1".into());
        workflow.handle_asset(user, "p2".into());
        let outcome = workflow.handle_asset(user, "p3".into());
        assert!(matches!(outcome, StepOutcome::Admitted(_)), "{outcome:?}");
    }

    assert_eq!(
        registry.get_tournament(tournament_id).unwrap().status,
        TournamentStatus::Full
    );
    assert_eq!(notifier.messages_containing("New team registered"), 2);
    assert_eq!(notifier.messages_containing("is now FULL"), 1);

    // Stored teams carry the finalized roster and stripped contact.
    let teams = registry.list_active_teams(tournament_id).unwrap();
    assert_eq!(teams[0].roster_assets, ["p1", "p2", "p3"]);
    assert_eq!(teams[0].leader_contact, "alpha_lead");
}

#[test]
fn test_concurrent_sessions_race_for_last_slot() {
    let (registry, _) = new_registry();
    let (tournament_id, _) = seed_tournament(&registry, 1, &[]);
    let workflow = RegistrationWorkflow::new(registry.clone());

    // Both users pass the begin() pre-check while the slot is still open.
    workflow.begin(10, tournament_id).unwrap();
    workflow.begin(11, tournament_id).unwrap();
    for user in [10_i64, 11] {
        workflow.handle_text(user, &format!("Team{user}"));
        workflow.handle_text(user, "lead");
        workflow.handle_asset(user, "p1".into());
        workflow.handle_asset(user, "p2".into());
    }

    // First to finalize wins the slot; the loser's admission is rejected by
    // the registry's atomic capacity check and the session is gone.
    assert!(matches!(
        workflow.handle_asset(10, "p3".into()),
        StepOutcome::Admitted(_)
    ));
    assert!(matches!(
        workflow.handle_asset(11, "p3".into()),
        StepOutcome::Failed(TournamentError::Full)
    ));
    assert!(workflow.session(11).is_none());
    assert_eq!(registry.active_team_count(tournament_id).unwrap(), 1);
}
