//! Blockrun interpreter.
//!
//! Evaluates block trees built with `blockrun-blocks`: expressions against a
//! scope chain, statements against a turtle actuator, and whole programs in
//! canvas run order with one outcome entry per top-level unit.

#![allow(clippy::result_large_err)]

pub mod actuator;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod operators;
pub mod runner;
pub mod scope;
pub mod session;
pub mod trace;
pub mod value;

// Include tests directory with all test modules
#[cfg(test)]
#[path = "tests/mod.rs"]
pub mod tests;

// Re-export public API
pub use actuator::{Actuator, Point, Segment, Turtle};
pub use error::{Construct, Result, RuntimeError};
pub use evaluator::Evaluator;
pub use executor::Executor;
pub use runner::{run_all, wrap, OutcomeEntry, RunConfig, RunReport};
pub use scope::ScopeChain;
pub use session::{RunHandle, RunSession, SessionError, SessionSnapshot};
pub use trace::TraceTable;
pub use value::Value;

/// Evaluate a single expression tree against `scope`
///
/// Convenience entry point for callers that only need a value, such as the
/// REPL's inspection commands and tests.
pub fn evaluate_expression(
    block: &blockrun_blocks::Block,
    scope: &ScopeChain,
) -> Result<Value> {
    Evaluator::new(RunConfig::default().max_depth).evaluate(block, scope)
}
