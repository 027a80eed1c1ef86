//! Statement execution.
//!
//! Runs one top-level unit and produces its output lines. Every nested
//! statement reports on its own line, labelled with the unit's run-order
//! number. Statement errors become a line of output; only run-wide faults
//! escape as `Err`.

use crate::actuator::{Actuator, Point};
use crate::error::{Construct, Result, RuntimeError};
use crate::evaluator::Evaluator;
use crate::scope::ScopeChain;
use crate::trace::TraceTable;
use crate::value::Value;
use blockrun_blocks::{
    ensure_sufficient_stack, Block, IfElse, MoveTo, Slot, StatementList, WhileLoop,
};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::trace;

/// Executes statements against the state owned by a run
pub struct Executor<'run> {
    scope: &'run mut ScopeChain,
    trace: &'run mut TraceTable,
    actuator: &'run mut dyn Actuator,
    evaluator: Evaluator,
    cancel: Option<&'run AtomicBool>,
    depth: usize,
}

/// Guard that pops the scope frame it opened when dropped
pub struct ScopedExecutor<'guard, 'run> {
    executor: &'guard mut Executor<'run>,
}

impl Drop for ScopedExecutor<'_, '_> {
    fn drop(&mut self) {
        self.executor.scope.pop();
    }
}

impl<'run> Deref for ScopedExecutor<'_, 'run> {
    type Target = Executor<'run>;

    fn deref(&self) -> &Self::Target {
        self.executor
    }
}

impl DerefMut for ScopedExecutor<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.executor
    }
}

impl<'run> Executor<'run> {
    pub fn new(
        scope: &'run mut ScopeChain,
        trace: &'run mut TraceTable,
        actuator: &'run mut dyn Actuator,
        max_depth: usize,
    ) -> Self {
        Self {
            scope,
            trace,
            actuator,
            evaluator: Evaluator::new(max_depth),
            cancel: None,
            depth: 0,
        }
    }

    /// Check `flag` between loop iterations and stop with `Cancelled` once set
    pub fn with_cancellation(mut self, flag: &'run AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Open a scope frame that is popped when the guard drops
    pub fn scoped(&mut self) -> ScopedExecutor<'_, 'run> {
        self.scope.push();
        ScopedExecutor { executor: self }
    }

    /// Run a top-level unit labelled `label` and return its output lines
    pub fn execute_unit(&mut self, block: &Block, label: usize) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        self.execute(block, label, &mut lines)?;
        Ok(lines)
    }

    fn check_cancelled(&self) -> Result<()> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(RuntimeError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Turn a statement error into an output line, passing run-wide faults through
    fn report(error: RuntimeError, label: usize, lines: &mut Vec<String>) -> Result<()> {
        if error.is_fatal() {
            return Err(error);
        }
        lines.push(format!("Error running block {label}: {error}"));
        Ok(())
    }

    fn slot(&self, slot: &Slot, construct: Construct) -> Result<Value> {
        self.evaluator
            .evaluate_slot(slot.as_deref(), construct, self.scope, self.depth + 1)
            .map_err(|error| error.attribute_to(construct))
    }

    fn execute(&mut self, block: &Block, label: usize, lines: &mut Vec<String>) -> Result<()> {
        if self.depth > self.evaluator.max_depth() {
            return Err(RuntimeError::interpreter_exhausted(self.evaluator.max_depth()));
        }
        trace!(label, kind = block.kind_name(), depth = self.depth, "executing block");

        match block {
            Block::Literal(_) | Block::Variable(_) | Block::BinaryOp(_) => {
                match self
                    .evaluator
                    .evaluate_slot(Some(block), Construct::Expression, self.scope, self.depth)
                {
                    Ok(value) => {
                        lines.push(format!("Ran block {label}: {value}"));
                        Ok(())
                    }
                    Err(error) => Self::report(error, label, lines),
                }
            }
            Block::Assign(assign) => match self.slot(&assign.expr, Construct::Assignment) {
                Ok(value) => {
                    self.trace.record(&assign.name, value);
                    self.scope.write(&assign.name, value);
                    lines.push(format!("Ran block {label}"));
                    Ok(())
                }
                Err(error) => Self::report(error, label, lines),
            },
            Block::If(if_else) => self.nested(|executor| executor.execute_if(if_else, label, lines)),
            Block::While(while_loop) => {
                self.nested(|executor| executor.execute_while(while_loop, label, lines))
            }
            Block::MoveTo(move_to) => match self.move_to_points(move_to) {
                Ok((start, dest)) => {
                    self.actuator.move_to(start, dest);
                    lines.push(format!("Ran block {label}"));
                    Ok(())
                }
                Err(error) => Self::report(error, label, lines),
            },
            Block::MoveForward(forward) => {
                match self.slot(&forward.distance, Construct::TurtleMoveForward) {
                    Ok(distance) => {
                        self.actuator.move_forward(distance.as_f64());
                        lines.push(format!("Ran block {label}"));
                        Ok(())
                    }
                    Err(error) => Self::report(error, label, lines),
                }
            }
            Block::Rotate(rotate) => match self.slot(&rotate.angle, Construct::TurtleRotation) {
                Ok(angle) => {
                    self.actuator.rotate_by(angle.as_f64().to_radians());
                    lines.push(format!("Ran block {label}"));
                    Ok(())
                }
                Err(error) => Self::report(error, label, lines),
            },
        }
    }

    /// Evaluate every operand before the turtle moves
    fn move_to_points(&self, move_to: &MoveTo) -> Result<(Point, Point)> {
        let construct = Construct::TurtleMovement;
        let start_x = self.slot(&move_to.start_x, construct)?;
        let start_y = self.slot(&move_to.start_y, construct)?;
        let dest_x = self.slot(&move_to.dest_x, construct)?;
        let dest_y = self.slot(&move_to.dest_y, construct)?;
        Ok((
            Point::new(start_x.as_f64(), start_y.as_f64()),
            Point::new(dest_x.as_f64(), dest_y.as_f64()),
        ))
    }

    /// Run `f` one nesting level deeper, growing the stack if needed
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.depth += 1;
        let result = ensure_sufficient_stack(|| f(self));
        self.depth -= 1;
        result
    }

    fn execute_list(
        &mut self,
        list: &StatementList,
        label: usize,
        lines: &mut Vec<String>,
    ) -> Result<()> {
        for statement in list.statements() {
            self.execute(statement, label, lines)?;
        }
        Ok(())
    }

    fn execute_if(&mut self, if_else: &IfElse, label: usize, lines: &mut Vec<String>) -> Result<()> {
        let mut scoped = self.scoped();

        let condition = match scoped.slot(&if_else.condition, Construct::IfCondition) {
            Ok(condition) => condition,
            Err(error) => return Self::report(error, label, lines),
        };

        let branch = if condition.is_truthy() {
            &if_else.then_branch
        } else {
            &if_else.else_branch
        };
        scoped.execute_list(branch, label, lines)
    }

    fn execute_while(
        &mut self,
        while_loop: &WhileLoop,
        label: usize,
        lines: &mut Vec<String>,
    ) -> Result<()> {
        let mut scoped = self.scoped();

        loop {
            scoped.check_cancelled()?;
            match scoped.slot(&while_loop.condition, Construct::WhileCondition) {
                Ok(condition) if condition.is_truthy() => {
                    scoped.execute_list(&while_loop.body, label, lines)?;
                }
                Ok(_) => return Ok(()),
                Err(error) => return Self::report(error, label, lines),
            }
        }
    }
}
