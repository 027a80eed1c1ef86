//! Acceptance tests for the blockrun interpreter
//!
//! Programs are assembled the way the editor builds them, then run end to end
//! through the orchestrator.

pub mod test_acceptance_runs;
