//! Expression evaluation.
//!
//! Literals, variable references and binary operators are evaluated against a
//! scope chain. Any other block in an operand position, or an open slot, is a
//! missing operand of the enclosing construct.

use crate::error::{Construct, Result, RuntimeError};
use crate::operators::evaluate_binary;
use crate::scope::ScopeChain;
use crate::value::Value;
use blockrun_blocks::{ensure_sufficient_stack, Block};

/// Evaluates expression trees with a bound on nesting depth
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    max_depth: usize,
}

impl Evaluator {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Evaluate a standalone expression block
    pub fn evaluate(&self, block: &Block, scope: &ScopeChain) -> Result<Value> {
        self.eval(block, scope, Construct::Expression, 0)
    }

    /// Evaluate the contents of a slot belonging to `construct`.
    ///
    /// `depth` is the nesting level the slot sits at, so statement nesting and
    /// expression nesting share one limit.
    pub fn evaluate_slot(
        &self,
        slot: Option<&Block>,
        construct: Construct,
        scope: &ScopeChain,
        depth: usize,
    ) -> Result<Value> {
        match slot {
            Some(block) => self.eval(block, scope, construct, depth),
            None => Err(RuntimeError::missing_operand(construct)),
        }
    }

    fn eval(
        &self,
        block: &Block,
        scope: &ScopeChain,
        construct: Construct,
        depth: usize,
    ) -> Result<Value> {
        if depth > self.max_depth {
            return Err(RuntimeError::interpreter_exhausted(self.max_depth));
        }

        match block {
            Block::Literal(number) => Ok(Value::from(*number)),
            Block::Variable(name) => scope.read(name),
            Block::BinaryOp(op) => {
                let inner = if op.operator.is_comparison() {
                    Construct::Comparison
                } else {
                    Construct::ArithmeticOperation
                };

                let (left, right) = ensure_sufficient_stack(|| {
                    let left = self.evaluate_slot(op.left.as_deref(), inner, scope, depth + 1)?;
                    let right = self.evaluate_slot(op.right.as_deref(), inner, scope, depth + 1)?;
                    Ok::<_, RuntimeError>((left, right))
                })?;
                evaluate_binary(op.operator, left, right)
            }
            Block::Assign(_)
            | Block::If(_)
            | Block::While(_)
            | Block::MoveTo(_)
            | Block::MoveForward(_)
            | Block::Rotate(_) => Err(RuntimeError::missing_operand(construct)),
        }
    }
}
