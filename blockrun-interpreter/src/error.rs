//! Runtime error types for the blockrun interpreter.
//!
//! Statement-level errors become one output line for the block that raised
//! them. Run-wide faults stop the whole run and are reported once.

use miette::Diagnostic;
use thiserror::Error;

/// The block construct that was missing an operand or condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    /// A bare expression with no enclosing construct
    Expression,
    ArithmeticOperation,
    Comparison,
    Assignment,
    TurtleMovement,
    TurtleMoveForward,
    TurtleRotation,
    IfCondition,
    WhileCondition,
}

impl Construct {
    /// What kind of slot was missing: an argument or a condition
    pub fn slot_kind(self) -> &'static str {
        match self {
            Construct::IfCondition | Construct::WhileCondition => "condition",
            _ => "argument",
        }
    }
}

impl std::fmt::Display for Construct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Construct::Expression => "expression",
            Construct::ArithmeticOperation => "arithmetic operation",
            Construct::Comparison => "comparison",
            Construct::Assignment => "assignment",
            Construct::TurtleMovement => "turtle movement",
            Construct::TurtleMoveForward => "turtle move forward",
            Construct::TurtleRotation => "turtle rotation",
            Construct::IfCondition => "if statement",
            Construct::WhileCondition => "while statement",
        })
    }
}

/// Runtime errors that can occur during a run
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("missing or invalid {} provided to {construct}", .construct.slot_kind())]
    #[diagnostic(
        code(blockrun::runtime::missing_operand),
        help("Drop an expression block into every open slot")
    )]
    MissingOperand { construct: Construct },

    #[error("variable '{name}' not defined in this scope")]
    #[diagnostic(
        code(blockrun::runtime::undefined_variable),
        help("Assign the variable in this block or an enclosing one before reading it")
    )]
    UndefinedVariable { name: String },

    #[error("cannot divide by zero")]
    #[diagnostic(code(blockrun::runtime::division_by_zero))]
    DivisionByZero,

    #[error("result too large")]
    #[diagnostic(
        code(blockrun::runtime::result_too_large),
        help("Integers are 64-bit and floats must stay finite")
    )]
    ResultTooLarge,

    #[error("unexpected error while parsing")]
    #[diagnostic(code(blockrun::runtime::unexpected_fault))]
    UnexpectedFault { detail: String },

    #[error(
        "There was an error, which may be due to too many nested if/while blocks or the program being too long."
    )]
    #[diagnostic(
        code(blockrun::runtime::interpreter_exhausted),
        help("Nesting depth is bounded by --max-depth; flatten the program or raise the limit")
    )]
    InterpreterExhausted { limit: usize },

    #[error("Run cancelled")]
    #[diagnostic(code(blockrun::runtime::cancelled))]
    Cancelled,
}

impl RuntimeError {
    pub fn missing_operand(construct: Construct) -> Self {
        Self::MissingOperand { construct }
    }

    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::UndefinedVariable { name: name.into() }
    }

    pub fn division_by_zero() -> Self {
        Self::DivisionByZero
    }

    pub fn result_too_large() -> Self {
        Self::ResultTooLarge
    }

    pub fn unexpected_fault(detail: impl Into<String>) -> Self {
        Self::UnexpectedFault {
            detail: detail.into(),
        }
    }

    pub fn interpreter_exhausted(limit: usize) -> Self {
        Self::InterpreterExhausted { limit }
    }

    /// Run-wide faults abort the whole run instead of a single block
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RuntimeError::InterpreterExhausted { .. } | RuntimeError::Cancelled
        )
    }

    /// Report a missing operand against `construct` instead of the inner expression
    pub fn attribute_to(self, construct: Construct) -> Self {
        match self {
            RuntimeError::MissingOperand { .. } => Self::missing_operand(construct),
            other => other,
        }
    }
}

/// Type alias for interpreter results
pub type Result<T> = std::result::Result<T, RuntimeError>;
