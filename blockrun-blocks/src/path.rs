// Blockrun Slot Paths
// Structural addressing of operand and statement slots, plus splicing

use crate::ast::{Block, Slot, StatementList};
use crate::error::{EditError, EditResult, ParseError};

/// One step from a block into one of its slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotStep {
    Left,
    Right,
    Expr,
    Condition,
    Then(usize),
    Else(usize),
    Body(usize),
    StartX,
    StartY,
    DestX,
    DestY,
    Distance,
    Angle,
}

impl std::fmt::Display for SlotStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotStep::Left => f.write_str("left"),
            SlotStep::Right => f.write_str("right"),
            SlotStep::Expr => f.write_str("expr"),
            SlotStep::Condition => f.write_str("cond"),
            SlotStep::Then(index) => write!(f, "then.{index}"),
            SlotStep::Else(index) => write!(f, "else.{index}"),
            SlotStep::Body(index) => write!(f, "body.{index}"),
            SlotStep::StartX => f.write_str("start_x"),
            SlotStep::StartY => f.write_str("start_y"),
            SlotStep::DestX => f.write_str("dest_x"),
            SlotStep::DestY => f.write_str("dest_y"),
            SlotStep::Distance => f.write_str("distance"),
            SlotStep::Angle => f.write_str("angle"),
        }
    }
}

/// A route from the root of a tree to one of its slots
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SlotPath {
    steps: Vec<SlotStep>,
}

impl SlotPath {
    pub fn new(steps: Vec<SlotStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[SlotStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn push(&mut self, step: SlotStep) {
        self.steps.push(step);
    }

    /// The path made of the first `len` steps
    pub fn prefix(&self, len: usize) -> SlotPath {
        SlotPath::new(self.steps[..len.min(self.steps.len())].to_vec())
    }
}

impl FromIterator<SlotStep> for SlotPath {
    fn from_iter<I: IntoIterator<Item = SlotStep>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl std::str::FromStr for SlotPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::BlockParser::parse_slot_path(s)
    }
}

impl std::fmt::Display for SlotPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// A resolved slot inside a parent block
enum SlotRef<'a> {
    Operand(&'a mut Slot),
    Statement {
        list: &'a mut StatementList,
        index: usize,
    },
}

impl Block {
    fn slot_mut(&mut self, step: SlotStep) -> EditResult<SlotRef<'_>> {
        let block = self.kind_name();
        let slot = match (self, step) {
            (Block::BinaryOp(op), SlotStep::Left) => SlotRef::Operand(&mut op.left),
            (Block::BinaryOp(op), SlotStep::Right) => SlotRef::Operand(&mut op.right),
            (Block::Assign(assign), SlotStep::Expr) => SlotRef::Operand(&mut assign.expr),
            (Block::If(if_else), SlotStep::Condition) => SlotRef::Operand(&mut if_else.condition),
            (Block::If(if_else), SlotStep::Then(index)) => SlotRef::Statement {
                list: &mut if_else.then_branch,
                index,
            },
            (Block::If(if_else), SlotStep::Else(index)) => SlotRef::Statement {
                list: &mut if_else.else_branch,
                index,
            },
            (Block::While(while_loop), SlotStep::Condition) => {
                SlotRef::Operand(&mut while_loop.condition)
            }
            (Block::While(while_loop), SlotStep::Body(index)) => SlotRef::Statement {
                list: &mut while_loop.body,
                index,
            },
            (Block::MoveTo(move_to), SlotStep::StartX) => SlotRef::Operand(&mut move_to.start_x),
            (Block::MoveTo(move_to), SlotStep::StartY) => SlotRef::Operand(&mut move_to.start_y),
            (Block::MoveTo(move_to), SlotStep::DestX) => SlotRef::Operand(&mut move_to.dest_x),
            (Block::MoveTo(move_to), SlotStep::DestY) => SlotRef::Operand(&mut move_to.dest_y),
            (Block::MoveForward(forward), SlotStep::Distance) => {
                SlotRef::Operand(&mut forward.distance)
            }
            (Block::Rotate(rotate), SlotStep::Angle) => SlotRef::Operand(&mut rotate.angle),
            (_, step) => {
                return Err(EditError::NoSuchSlot {
                    block,
                    step: step.to_string(),
                })
            }
        };
        Ok(slot)
    }

    fn child_mut(&mut self, step: SlotStep, at: &SlotPath) -> EditResult<&mut Block> {
        match self.slot_mut(step)? {
            SlotRef::Operand(slot) => slot
                .as_deref_mut()
                .ok_or_else(|| EditError::EmptySlot { path: at.clone() }),
            SlotRef::Statement { list, index } => {
                if index >= list.slot_count() {
                    return Err(EditError::IndexOutOfRange {
                        path: at.clone(),
                        index,
                    });
                }
                list.statement_mut(index)
                    .ok_or_else(|| EditError::EmptySlot { path: at.clone() })
            }
        }
    }

    /// Walk every step but the last, returning the parent of the addressed slot
    fn parent_mut(&mut self, path: &SlotPath) -> EditResult<(&mut Block, SlotStep)> {
        let (last, init) = path.steps().split_last().ok_or(EditError::EmptyPath)?;
        let mut current = self;
        for (i, step) in init.iter().enumerate() {
            current = current.child_mut(*step, &path.prefix(i + 1))?;
        }
        Ok((current, *last))
    }

    /// The block bound at `path`, or `None` if that slot is open
    pub fn block_at(&self, path: &SlotPath) -> EditResult<Option<&Block>> {
        let mut current = self;
        for (i, step) in path.steps().iter().enumerate() {
            let at = path.prefix(i + 1);
            let next = match (current, *step) {
                (Block::BinaryOp(op), SlotStep::Left) => op.left.as_deref(),
                (Block::BinaryOp(op), SlotStep::Right) => op.right.as_deref(),
                (Block::Assign(assign), SlotStep::Expr) => assign.expr.as_deref(),
                (Block::If(if_else), SlotStep::Condition) => if_else.condition.as_deref(),
                (Block::If(if_else), SlotStep::Then(index)) => {
                    statement_at(&if_else.then_branch, index, &at)?
                }
                (Block::If(if_else), SlotStep::Else(index)) => {
                    statement_at(&if_else.else_branch, index, &at)?
                }
                (Block::While(while_loop), SlotStep::Condition) => {
                    while_loop.condition.as_deref()
                }
                (Block::While(while_loop), SlotStep::Body(index)) => {
                    statement_at(&while_loop.body, index, &at)?
                }
                (Block::MoveTo(move_to), SlotStep::StartX) => move_to.start_x.as_deref(),
                (Block::MoveTo(move_to), SlotStep::StartY) => move_to.start_y.as_deref(),
                (Block::MoveTo(move_to), SlotStep::DestX) => move_to.dest_x.as_deref(),
                (Block::MoveTo(move_to), SlotStep::DestY) => move_to.dest_y.as_deref(),
                (Block::MoveForward(forward), SlotStep::Distance) => forward.distance.as_deref(),
                (Block::Rotate(rotate), SlotStep::Angle) => rotate.angle.as_deref(),
                (block, step) => {
                    return Err(EditError::NoSuchSlot {
                        block: block.kind_name(),
                        step: step.to_string(),
                    })
                }
            };
            match next {
                Some(block) => current = block,
                None if i + 1 == path.steps().len() => return Ok(None),
                None => return Err(EditError::EmptySlot { path: at }),
            }
        }
        Ok(Some(current))
    }

    /// Drop `block` into the slot at `path`.
    ///
    /// Operand slots are overwritten and the displaced block, if any, is handed
    /// back. Statement lists only accept blocks in their trailing open slot,
    /// which is then followed by a fresh open slot.
    pub fn insert(&mut self, path: &SlotPath, block: Block) -> EditResult<Option<Block>> {
        let (parent, step) = self.parent_mut(path)?;
        match parent.slot_mut(step)? {
            SlotRef::Operand(slot) => Ok(slot.replace(Box::new(block)).map(|old| *old)),
            SlotRef::Statement { list, index } => {
                if index == list.open_slot() {
                    list.push(block);
                    Ok(None)
                } else if index < list.open_slot() {
                    Err(EditError::SlotOccupied { path: path.clone() })
                } else {
                    Err(EditError::IndexOutOfRange {
                        path: path.clone(),
                        index,
                    })
                }
            }
        }
    }

    /// Lift the block at `path` out of the tree, leaving the slot open
    pub fn detach(&mut self, path: &SlotPath) -> EditResult<Block> {
        let (parent, step) = self.parent_mut(path)?;
        match parent.slot_mut(step)? {
            SlotRef::Operand(slot) => slot
                .take()
                .map(|old| *old)
                .ok_or_else(|| EditError::EmptySlot { path: path.clone() }),
            SlotRef::Statement { list, index } => {
                if index >= list.slot_count() {
                    return Err(EditError::IndexOutOfRange {
                        path: path.clone(),
                        index,
                    });
                }
                list.remove(index)
                    .ok_or_else(|| EditError::EmptySlot { path: path.clone() })
            }
        }
    }
}

fn statement_at<'a>(
    list: &'a StatementList,
    index: usize,
    at: &SlotPath,
) -> EditResult<Option<&'a Block>> {
    list.slots()
        .get(index)
        .map(Option::as_ref)
        .ok_or_else(|| EditError::IndexOutOfRange {
            path: at.clone(),
            index,
        })
}
