// Program editing tests
// Units on the canvas, grafting, detaching and run order

use crate::{BinaryOperator, Block, EditError, Placement, Program, SlotPath, MAX_TREE_DEPTH};
use pretty_assertions::assert_eq;

fn path(text: &str) -> SlotPath {
    text.parse().unwrap()
}

#[test]
fn test_run_order_sorts_by_row_then_column() {
    let mut program = Program::new();
    let right = program.add(Block::literal(1), Placement::new(50, 100));
    let left = program.add(Block::literal(2), Placement::new(10, 100));
    let top = program.add(Block::literal(3), Placement::new(400, 20));

    let order: Vec<_> = program.run_order().iter().map(|unit| unit.id()).collect();
    assert_eq!(order, vec![top, left, right]);
    assert_eq!(program.label(top), Some(1));
    assert_eq!(program.label(right), Some(3));
}

#[test]
fn test_run_order_ties_keep_insertion_order() {
    let mut program = Program::new();
    let first = program.add(Block::literal(1), Placement::new(0, 0));
    let second = program.add(Block::literal(2), Placement::new(0, 0));

    let order: Vec<_> = program.run_order().iter().map(|unit| unit.id()).collect();
    assert_eq!(order, vec![first, second]);
}

#[test]
fn test_place_changes_run_order() {
    let mut program = Program::new();
    let a = program.add(Block::literal(1), Placement::new(0, 0));
    let b = program.add(Block::literal(2), Placement::new(0, 10));
    program.place(a, Placement::new(0, 20)).unwrap();
    assert_eq!(program.label(b), Some(1));
    assert_eq!(program.label(a), Some(2));
}

#[test]
fn test_graft_moves_unit_into_slot() {
    let mut program = Program::new();
    let assign = program.add(Block::empty_assign("a"), Placement::new(0, 0));
    let sum = program.add(
        Block::binary(BinaryOperator::ADD, Block::literal(2), Block::literal(4)),
        Placement::new(0, 40),
    );

    let displaced = program.graft(sum, assign, &path("expr")).unwrap();
    assert_eq!(displaced, None);
    assert_eq!(program.len(), 1);
    assert!(program.get(sum).is_none());
    assert_eq!(program.get(assign).unwrap().block.to_string(), "a <- (2 + 4)");
}

#[test]
fn test_graft_displaced_operand_returns_to_canvas() {
    let mut program = Program::new();
    let assign = program.add(Block::assign("a", Block::literal(1)), Placement::new(0, 0));
    let two = program.add(Block::literal(2), Placement::new(30, 60));

    let displaced = program.graft(two, assign, &path("expr")).unwrap();
    let displaced = displaced.unwrap();
    let unit = program.get(displaced).unwrap();
    assert_eq!(unit.block, Block::literal(1));
    assert_eq!(unit.placement, Placement::new(30, 60));
}

#[test]
fn test_graft_failure_keeps_unit() {
    let mut program = Program::new();
    let number = program.add(Block::literal(3), Placement::new(0, 0));
    let moved = program.add(Block::literal(5), Placement::new(5, 5));

    let result = program.graft(moved, number, &path("left"));
    assert!(matches!(result, Err(EditError::NoSuchSlot { .. })));
    assert_eq!(program.len(), 2);
    assert_eq!(program.units()[1].id(), moved);
    assert_eq!(program.get(moved).unwrap().placement, Placement::new(5, 5));
}

#[test]
fn test_graft_into_self_rejected() {
    let mut program = Program::new();
    let id = program.add(Block::empty_if(), Placement::default());
    assert_eq!(
        program.graft(id, id, &path("then.0")),
        Err(EditError::SelfGraft { id })
    );
}

#[test]
fn test_graft_unknown_target() {
    let mut program = Program::new();
    let id = program.add(Block::literal(1), Placement::default());
    let ghost = program.add(Block::literal(2), Placement::default());
    program.remove(ghost).unwrap();

    assert_eq!(
        program.graft(id, ghost, &path("expr")),
        Err(EditError::UnknownUnit { id: ghost })
    );
    assert_eq!(program.len(), 1);
}

#[test]
fn test_detach_returns_subtree_to_canvas() {
    let mut program = Program::new();
    let loop_id = program.add(
        Block::while_loop(
            Block::binary(BinaryOperator::LESS_THAN, Block::variable("i"), Block::literal(3)),
            [Block::move_forward(Block::literal(10))],
        ),
        Placement::new(0, 0),
    );

    let lifted = program
        .detach(loop_id, &path("body.0"), Placement::new(100, 100))
        .unwrap();
    assert_eq!(
        program.get(lifted).unwrap().block,
        Block::move_forward(Block::literal(10))
    );
    assert_eq!(
        program.get(loop_id).unwrap().block.to_string(),
        "while (i < 3) do [_]"
    );
}

#[test]
fn test_ids_are_not_reused() {
    let mut program = Program::new();
    let a = program.add(Block::literal(1), Placement::default());
    program.remove(a).unwrap();
    let b = program.add(Block::literal(1), Placement::default());
    assert_ne!(a, b);
    assert_eq!(program.remove(a), Err(EditError::UnknownUnit { id: a }));
}

/// A left-leaning sum `((1 + 1) + 1) + ...` that is `depth` levels deep
fn nested_sum(depth: usize) -> Block {
    let mut block = Block::literal(1);
    for _ in 1..depth {
        block = Block::binary(BinaryOperator::ADD, block, Block::literal(1));
    }
    block
}

#[test]
fn test_block_depth() {
    assert_eq!(Block::literal(1).depth(), 1);
    assert_eq!(Block::empty_assign("a").depth(), 2);
    assert_eq!(nested_sum(4).depth(), 4);
    assert_eq!(
        Block::if_else(Block::literal(1), [Block::assign("x", nested_sum(3))], []).depth(),
        5
    );
}

#[test]
fn test_graft_refuses_trees_beyond_depth_limit() {
    let mut program = Program::new();
    let assign = program.add(Block::empty_assign("a"), Placement::new(0, 0));
    let deep = program.add(nested_sum(MAX_TREE_DEPTH), Placement::new(0, 10));

    assert_eq!(
        program.graft(deep, assign, &path("expr")),
        Err(EditError::TooDeep {
            depth: MAX_TREE_DEPTH + 1,
            limit: MAX_TREE_DEPTH,
        })
    );
    assert_eq!(program.len(), 2);
    assert_eq!(program.get(deep).unwrap().placement, Placement::new(0, 10));
}

#[test]
fn test_graft_up_to_depth_limit() {
    let mut program = Program::new();
    let assign = program.add(Block::empty_assign("a"), Placement::new(0, 0));
    let deep = program.add(nested_sum(MAX_TREE_DEPTH - 1), Placement::new(0, 10));

    assert_eq!(program.graft(deep, assign, &path("expr")), Ok(None));
    assert_eq!(program.get(assign).unwrap().block.depth(), MAX_TREE_DEPTH);
}
