//! Acceptance tests for whole runs: ordering, outcome entries, scoping and faults

use crate::{run_all, OutcomeEntry, RunConfig, RunReport, ScopeChain, TraceTable, Turtle, Value};
use blockrun_blocks::{BinaryOperator, Block, Placement, Program};
use pretty_assertions::assert_eq;

struct Harness {
    program: Program,
    scope: ScopeChain,
    trace: TraceTable,
    turtle: Turtle,
    config: RunConfig,
}

impl Harness {
    fn new() -> Self {
        Self {
            program: Program::new(),
            scope: ScopeChain::new(),
            trace: TraceTable::new(),
            turtle: Turtle::new(),
            config: RunConfig::default(),
        }
    }

    fn add(&mut self, block: Block, x: i32, y: i32) {
        self.program.add(block, Placement::new(x, y));
    }

    fn run(&mut self) -> RunReport {
        run_all(
            self.program.units(),
            &mut self.turtle,
            &mut self.scope,
            &mut self.trace,
            "Run time: 01/02/2024 10:00:00",
            &self.config,
        )
    }
}

fn add(left: Block, right: Block) -> Block {
    Block::binary(BinaryOperator::ADD, left, right)
}

fn unit_lines(report: &RunReport) -> Vec<Vec<String>> {
    report
        .entries()
        .iter()
        .filter_map(|entry| match entry {
            OutcomeEntry::Unit { lines, .. } => Some(lines.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_single_assignment_end_to_end() {
    let mut harness = Harness::new();
    harness.add(
        Block::assign("a", add(Block::literal(2), Block::literal(4))),
        0,
        0,
    );

    let report = harness.run();

    assert_eq!(
        report.entries(),
        &[
            OutcomeEntry::Timestamp("Run time: 01/02/2024 10:00:00".to_string()),
            OutcomeEntry::Unit {
                label: 1,
                lines: vec!["Ran block 1".to_string()]
            },
        ]
    );
    assert_eq!(harness.trace.column("a"), Some(&[Some(Value::Integer(6))][..]));
    assert_eq!(harness.scope.depth(), 1);
    assert!(!harness.scope.contains("a"));
}

#[test]
fn test_run_order_follows_rows_then_columns() {
    let mut harness = Harness::new();
    harness.add(Block::literal(50), 50, 100);
    harness.add(Block::literal(10), 10, 100);
    harness.add(Block::literal(1), 300, 5);

    let report = harness.run();
    assert_eq!(
        report.display_lines(),
        vec![
            "Run time: 01/02/2024 10:00:00",
            "Ran block 1: 1",
            "Ran block 2: 10",
            "Ran block 3: 50",
        ]
    );
}

#[test]
fn test_units_share_globals_within_a_run() {
    let mut harness = Harness::new();
    harness.add(Block::assign("x", Block::literal(4)), 0, 0);
    harness.add(Block::assign("x", Block::literal(7)), 0, 10);
    harness.add(add(Block::variable("x"), Block::literal(1)), 0, 20);

    let report = harness.run();
    assert_eq!(
        unit_lines(&report),
        vec![vec!["Ran block 1"], vec!["Ran block 2"], vec!["Ran block 3: 8"]]
    );
    assert_eq!(
        harness.trace.column("x"),
        Some(&[Some(Value::Integer(4)), Some(Value::Integer(7))][..])
    );
    assert_eq!(harness.trace.length(), 2);
}

#[test]
fn test_globals_reset_between_runs_but_trace_persists() {
    let mut harness = Harness::new();
    harness.add(Block::assign("x", Block::literal(1)), 0, 0);
    harness.run();

    harness.program = Program::new();
    harness.add(Block::variable("x"), 0, 0);
    let report = harness.run();

    assert_eq!(
        unit_lines(&report),
        vec![vec!["Error running block 1: variable 'x' not defined in this scope"]]
    );
    assert_eq!(harness.trace.column("x"), Some(&[Some(Value::Integer(1))][..]));
}

#[test]
fn test_inner_bindings_vanish_after_if() {
    let mut harness = Harness::new();
    harness.add(Block::assign("outer", Block::literal(0)), 0, 0);
    harness.add(
        Block::if_else(
            Block::binary(BinaryOperator::EQUAL, Block::variable("outer"), Block::literal(0)),
            [
                Block::assign("outer", Block::literal(5)),
                Block::assign("inner", Block::literal(1)),
            ],
            [Block::literal(99)],
        ),
        0,
        10,
    );
    harness.add(Block::variable("outer"), 0, 20);
    harness.add(Block::variable("inner"), 0, 30);

    let report = harness.run();
    assert_eq!(
        unit_lines(&report),
        vec![
            vec!["Ran block 1"],
            vec!["Ran block 2", "Ran block 2"],
            vec!["Ran block 3: 5"],
            vec!["Error running block 4: variable 'inner' not defined in this scope"],
        ]
    );
}

#[test]
fn test_empty_branch_yields_empty_entry() {
    let mut harness = Harness::new();
    harness.add(Block::if_else(Block::literal(0), [Block::literal(1)], []), 0, 0);

    let report = harness.run();
    assert_eq!(
        report.entries()[1],
        OutcomeEntry::Unit {
            label: 1,
            lines: vec![]
        }
    );
    assert_eq!(report.display_lines().len(), 1);
}

#[test]
fn test_while_sums_with_trace() {
    let mut harness = Harness::new();
    harness.add(Block::assign("i", Block::literal(0)), 0, 0);
    harness.add(Block::assign("total", Block::literal(0)), 0, 10);
    harness.add(
        Block::while_loop(
            Block::binary(BinaryOperator::LESS_THAN, Block::variable("i"), Block::literal(3)),
            [
                Block::assign("i", add(Block::variable("i"), Block::literal(1))),
                Block::assign("total", add(Block::variable("total"), Block::variable("i"))),
            ],
        ),
        0,
        20,
    );
    harness.add(Block::variable("total"), 0, 30);

    let report = harness.run();
    assert_eq!(unit_lines(&report)[3], vec!["Ran block 4: 6"]);

    let int = |n| Some(Value::Integer(n));
    assert_eq!(
        harness.trace.column("i"),
        Some(&[int(0), int(1), int(2), int(3)][..])
    );
    assert_eq!(
        harness.trace.column("total"),
        Some(&[int(0), int(1), int(3), int(6)][..])
    );
}

#[test]
fn test_depth_exhaustion_is_reported_once() {
    let mut harness = Harness::new();
    harness.config.max_depth = 4;

    let mut deep = Block::literal(1);
    for _ in 0..10 {
        deep = Block::if_else(Block::literal(1), [deep], []);
    }
    harness.add(Block::literal(7), 0, 0);
    harness.add(deep, 0, 10);
    harness.add(Block::literal(8), 0, 20);

    let report = harness.run();
    let lines = report.display_lines();
    assert_eq!(
        &lines[1..],
        &[
            "Ran block 1: 7",
            "There was an error, which may be due to too many nested if/while blocks or the p",
            "rogram being too long.",
        ]
    );
    assert!(report.fault().is_some());
    assert_eq!(harness.scope.depth(), 1);
}

#[test]
fn test_boolean_results_in_arithmetic() {
    let mut harness = Harness::new();
    harness.add(
        add(
            Block::binary(BinaryOperator::GREATER_THAN, Block::literal(3), Block::literal(2)),
            Block::literal(1),
        ),
        0,
        0,
    );

    let report = harness.run();
    assert_eq!(unit_lines(&report), vec![vec!["Ran block 1: 2"]]);
}
