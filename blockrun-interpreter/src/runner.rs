//! Run orchestration.
//!
//! Orders the units on the canvas, executes each one and collects one outcome
//! entry per unit behind a timestamp entry. The scope chain is reset when the
//! run ends, however it ends.

use crate::actuator::Actuator;
use crate::error::RuntimeError;
use crate::executor::Executor;
use crate::scope::ScopeChain;
use crate::trace::TraceTable;
use crate::value::Value;
use blockrun_blocks::{run_order, ProgramUnit};
use std::num::NonZeroUsize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

const DEFAULT_LINE_LENGTH: NonZeroUsize = match NonZeroUsize::new(80) {
    Some(width) => width,
    None => unreachable!(),
};

/// Settings that shape a run and its output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Width output lines are wrapped to
    pub line_length: NonZeroUsize,
    /// Deepest statement and expression nesting a run may reach
    pub max_depth: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            line_length: DEFAULT_LINE_LENGTH,
            max_depth: 1000,
        }
    }
}

/// Split `text` into consecutive chunks of exactly `width` characters; the last may be shorter
pub fn wrap(text: &str, width: NonZeroUsize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.get())
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// One entry of a run's output
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeEntry {
    /// When the run started
    Timestamp(String),
    /// Output of one top-level unit, labelled by its run-order position
    Unit { label: usize, lines: Vec<String> },
    /// A run-wide fault that stopped the run
    Fault(String),
}

impl OutcomeEntry {
    /// Unwrapped output lines of this entry
    pub fn lines(&self) -> Vec<&str> {
        match self {
            OutcomeEntry::Timestamp(text) | OutcomeEntry::Fault(text) => vec![text.as_str()],
            OutcomeEntry::Unit { lines, .. } => lines.iter().map(String::as_str).collect(),
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    entries: Vec<OutcomeEntry>,
    bindings: Vec<(String, Value)>,
    line_length: NonZeroUsize,
}

impl RunReport {
    pub fn entries(&self) -> &[OutcomeEntry] {
        &self.entries
    }

    /// Global bindings as they stood just before the scope was reset
    pub fn bindings(&self) -> &[(String, Value)] {
        &self.bindings
    }

    /// The run-wide fault, if the run was cut short
    pub fn fault(&self) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            OutcomeEntry::Fault(message) => Some(message.as_str()),
            _ => None,
        })
    }

    /// Every output line, wrapped to the configured width
    pub fn display_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(OutcomeEntry::lines)
            .flat_map(|line| wrap(line, self.line_length))
            .collect()
    }
}

/// Execute every unit in run order
pub fn run_all(
    units: &[ProgramUnit],
    actuator: &mut dyn Actuator,
    scope: &mut ScopeChain,
    trace: &mut TraceTable,
    timestamp: impl Into<String>,
    config: &RunConfig,
) -> RunReport {
    let cancel = AtomicBool::new(false);
    run_cancellable(units, actuator, scope, trace, timestamp, config, &cancel)
}

/// Execute every unit in run order, stopping early once `cancel` is set
#[tracing::instrument(skip_all, fields(units = units.len()))]
pub fn run_cancellable(
    units: &[ProgramUnit],
    actuator: &mut dyn Actuator,
    scope: &mut ScopeChain,
    trace: &mut TraceTable,
    timestamp: impl Into<String>,
    config: &RunConfig,
    cancel: &AtomicBool,
) -> RunReport {
    let mut entries = Vec::with_capacity(units.len() + 1);

    let outcome = catch_unwind(AssertUnwindSafe(|| -> Result<(), RuntimeError> {
        let mut executor =
            Executor::new(scope, trace, actuator, config.max_depth).with_cancellation(cancel);

        for (rank, unit) in run_order(units).into_iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                return Err(RuntimeError::Cancelled);
            }

            let label = rank + 1;
            debug!(label, unit = %unit.id(), "running unit");
            let lines = executor.execute_unit(&unit.block, label)?;
            entries.push(OutcomeEntry::Unit { label, lines });
        }
        Ok(())
    }));

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(error)) => {
            warn!(%error, "run stopped early");
            entries.push(OutcomeEntry::Fault(error.to_string()));
        }
        Err(_) => {
            warn!("interpreter panicked during run");
            let fault = RuntimeError::interpreter_exhausted(config.max_depth);
            entries.push(OutcomeEntry::Fault(fault.to_string()));
        }
    }

    entries.insert(0, OutcomeEntry::Timestamp(timestamp.into()));
    let bindings = scope.visible_bindings();
    scope.reset();

    RunReport {
        entries,
        bindings,
        line_length: config.line_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::{Point, Segment, Turtle};
    use blockrun_blocks::{BinaryOperator, Block, Placement, Program};
    use pretty_assertions::assert_eq;

    fn width(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_wrap_chunks() {
        assert_eq!(wrap("abcdefgh", width(3)), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("abc", width(3)), vec!["abc"]);
        assert_eq!(wrap("", width(3)), Vec::<String>::new());
    }

    #[test]
    fn test_wrap_counts_chars_not_bytes() {
        assert_eq!(wrap("×÷×÷×", width(2)), vec!["×÷", "×÷", "×"]);
    }

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.line_length.get(), 80);
        assert_eq!(config.max_depth, 1000);
    }

    #[test]
    fn test_report_lines_are_wrapped() {
        let mut program = Program::new();
        program.add(Block::variable("undefined"), Placement::default());

        let config = RunConfig {
            line_length: width(20),
            ..RunConfig::default()
        };
        let report = run_all(
            program.units(),
            &mut Turtle::new(),
            &mut ScopeChain::new(),
            &mut TraceTable::new(),
            "now",
            &config,
        );

        let lines = report.display_lines();
        assert_eq!(lines[0], "now");
        assert!(lines[1..].iter().all(|line| line.chars().count() <= 20));
        assert_eq!(
            lines[1..].concat(),
            "Error running block 1: variable 'undefined' not defined in this scope"
        );
    }

    #[test]
    fn test_bindings_captured_before_reset() {
        let mut program = Program::new();
        program.add(
            Block::assign("a", Block::binary(BinaryOperator::ADD, Block::literal(2), Block::literal(4))),
            Placement::default(),
        );

        let mut scope = ScopeChain::new();
        let report = run_all(
            program.units(),
            &mut Turtle::new(),
            &mut scope,
            &mut TraceTable::new(),
            "now",
            &RunConfig::default(),
        );

        assert_eq!(report.bindings(), &[("a".to_string(), Value::Integer(6))]);
        assert!(scope.visible_bindings().is_empty());
        assert_eq!(report.fault(), None);
    }

    /// Turtle whose motor fails on the first move
    #[derive(Default)]
    struct SeizedTurtle(Turtle);

    impl Actuator for SeizedTurtle {
        fn position(&self) -> Point {
            self.0.position()
        }

        fn heading(&self) -> f64 {
            self.0.heading()
        }

        fn segments(&self) -> &[Segment] {
            self.0.segments()
        }

        fn relocate(&mut self, x: f64, y: f64) {
            self.0.relocate(x, y);
        }

        fn face(&mut self, heading: f64) {
            self.0.face(heading);
        }

        fn advance(&mut self, _distance: f64) {
            panic!("motor seized");
        }

        fn push_segment(&mut self, segment: Segment) {
            self.0.push_segment(segment);
        }
    }

    #[test]
    fn test_panic_is_reported_and_scope_reset() {
        let mut program = Program::new();
        program.add(Block::assign("a", Block::literal(7)), Placement::new(0, 0));
        program.add(
            Block::if_else(
                Block::literal(1),
                [
                    Block::assign("inner", Block::literal(1)),
                    Block::move_forward(Block::literal(5)),
                ],
                [],
            ),
            Placement::new(0, 10),
        );
        program.add(Block::literal(9), Placement::new(0, 20));

        let config = RunConfig::default();
        let mut scope = ScopeChain::new();
        let report = run_all(
            program.units(),
            &mut SeizedTurtle::default(),
            &mut scope,
            &mut TraceTable::new(),
            "now",
            &config,
        );

        assert_eq!(
            report.entries(),
            &[
                OutcomeEntry::Timestamp("now".to_string()),
                OutcomeEntry::Unit {
                    label: 1,
                    lines: vec!["Ran block 1".to_string()],
                },
                OutcomeEntry::Fault(
                    "There was an error, which may be due to too many nested if/while blocks or the program being too long."
                        .to_string()
                ),
            ]
        );
        assert_eq!(
            report.fault(),
            Some(RuntimeError::interpreter_exhausted(config.max_depth).to_string().as_str())
        );
        assert_eq!(report.bindings(), &[("a".to_string(), Value::Integer(7))]);
        assert_eq!(scope.depth(), 1);
        assert!(scope.visible_bindings().is_empty());
    }
}
