//! Tournament registry and single-elimination bracket engine.
//!
//! This module provides the tournament lifecycle:
//! - Tournament creation and capacity tracking
//! - Team admission with uniqueness and capacity invariants
//! - Randomized bracket generation with explicit byes
//! - Round-by-round winner reporting until a champion is produced
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use team_brackets::notify::LogNotifier;
//! use team_brackets::store::MemoryStore;
//! use team_brackets::tournament::{BracketEngine, TournamentRegistry, models::Caller};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = TournamentRegistry::open(Arc::new(MemoryStore::new()), Arc::new(LogNotifier))?;
//! let engine = BracketEngine::new(&registry);
//!
//! let admin = Caller::admin(1);
//! let cup = registry.create_tournament(admin, "Friday Cup", 2, "weekly showdown")?;
//! registry.admit_team(cup, "Alpha", "alpha_lead", vec!["a1".into(), "a2".into(), "a3".into()], 10)?;
//! registry.admit_team(cup, "Beta", "beta_lead", vec!["b1".into(), "b2".into(), "b3".into()], 11)?;
//!
//! engine.generate_bracket(admin, cup)?;
//! let open = engine.pending_matches(cup)?;
//! engine.report_winner(admin, open[0].id, open[0].team1)?;
//! assert!(engine.champion(cup)?.is_some());
//! # Ok(())
//! # }
//! ```

pub mod bracket;
pub mod errors;
pub mod models;
pub mod registry;

pub use bracket::BracketEngine;
pub use errors::{TournamentError, TournamentResult};
pub use models::{
    AssetRef, Bracket, Caller, Match, MatchId, Team, TeamId, TeamStatus, Tournament, TournamentId,
    TournamentStatus, UserId,
};
pub use registry::TournamentRegistry;
