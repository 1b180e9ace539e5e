//! # Team Brackets
//!
//! A single-elimination tournament core for small competitive teams:
//! registration intake, capacity tracking, bracket generation and
//! round-by-round winner reporting until a champion is produced.
//!
//! ## Architecture
//!
//! The core is a set of components over two shared collections (tournaments
//! and teams) guarded by a single lock:
//!
//! - **Registration workflow**: a per-user FSM walking registrants through
//!   team name, leader contact and three roster assets
//! - **Tournament registry**: capacity and uniqueness checks, team
//!   admission, tournament lifecycle (`active` → `full`/`started` →
//!   `finished`)
//! - **Bracket engine**: randomized pairing, round progression, winner
//!   recording and champion determination
//! - **Store**: whole-snapshot persistence of both collections
//! - **Notifier**: outbound boundary through which state changes are
//!   announced; delivery is someone else's problem
//!
//! Message transports, asset storage and caller authentication live outside
//! the crate; the core talks to them only through the [`store`] and
//! [`notify`] traits and a pre-resolved admin flag on privileged calls.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use team_brackets::{
//!     notify::LogNotifier,
//!     registration::RegistrationWorkflow,
//!     store::MemoryStore,
//!     tournament::TournamentRegistry,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = TournamentRegistry::open(Arc::new(MemoryStore::new()), Arc::new(LogNotifier))?;
//! let workflow = RegistrationWorkflow::new(registry.clone());
//! # Ok(())
//! # }
//! ```

/// Snapshot persistence for tournaments and teams.
pub mod store;
pub use store::{JsonFileStore, MemoryStore, SnapshotStore, StoreError};

/// Outbound notification boundary.
pub mod notify;
pub use notify::{Action, Audience, Choice, LogNotifier, Notifier};

/// Registry, bracket engine and the core data model.
pub mod tournament;
pub use tournament::{
    BracketEngine, Caller, TournamentError, TournamentRegistry, TournamentResult,
};

/// Team registration intake workflow.
pub mod registration;
pub use registration::{RegistrationWorkflow, StepOutcome};
