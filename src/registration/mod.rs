//! Team registration intake.
//!
//! A per-user finite-state machine walks each registrant through team name,
//! leader contact and three roster assets, then hands the finished
//! registration to the registry for admission.

pub mod workflow;

pub use workflow::{RegistrationSession, RegistrationWorkflow, SessionState, StepOutcome};
