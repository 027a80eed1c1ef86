// Blockrun Block Errors
// Entry parsing and tree editing errors with miette integration

use crate::parser::Rule;
use crate::path::SlotPath;
use crate::program::UnitId;
use miette::{Diagnostic, SourceSpan};
use pest::error::InputLocation;
use thiserror::Error;

/// Errors raised while turning typed text into blocks or slot paths
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid entry: {message}")]
    #[diagnostic(
        code(blockrun::parse::invalid_entry),
        help("Enter `if`, `while`, a number such as 3 or -2.5, or a name made of letters and digits")
    )]
    InvalidEntry {
        #[source_code]
        src: String,
        #[label("not a block")]
        span: SourceSpan,
        message: String,
    },

    #[error("Unknown palette item: {message}")]
    #[diagnostic(
        code(blockrun::parse::unknown_palette_item),
        help("Palette items are + - × ÷ ^ > < = moveTo moveForward rotate")
    )]
    UnknownPaletteItem {
        #[source_code]
        src: String,
        #[label("not in the palette")]
        span: SourceSpan,
        message: String,
    },

    #[error("Invalid slot path: {message}")]
    #[diagnostic(
        code(blockrun::parse::invalid_slot_path),
        help("Paths are dot separated steps such as `cond`, `then.0.left` or `body.2.expr`")
    )]
    InvalidSlotPath {
        #[source_code]
        src: String,
        #[label("error occurred here")]
        span: SourceSpan,
        message: String,
    },

    #[error("Invalid number literal")]
    #[diagnostic(
        code(blockrun::parse::invalid_number),
        help("Numbers must fit in a 64-bit integer or float")
    )]
    InvalidNumber {
        #[source_code]
        src: String,
        #[label("out of range")]
        span: SourceSpan,
    },

    #[error("Unexpected grammar rule: {rule}")]
    #[diagnostic(code(blockrun::parse::unexpected_rule))]
    UnexpectedRule { rule: String },
}

/// Constructor shape shared by the pest-backed variants
pub(crate) type PestErrorConstructor = fn(String, SourceSpan, String) -> ParseError;

impl ParseError {
    pub fn invalid_entry(src: String, span: SourceSpan, message: String) -> Self {
        Self::InvalidEntry { src, span, message }
    }

    pub fn unknown_palette_item(src: String, span: SourceSpan, message: String) -> Self {
        Self::UnknownPaletteItem { src, span, message }
    }

    pub fn invalid_slot_path(src: String, span: SourceSpan, message: String) -> Self {
        Self::InvalidSlotPath { src, span, message }
    }

    pub fn invalid_number(src: &str, start: usize, len: usize) -> Self {
        Self::InvalidNumber {
            src: src.to_string(),
            span: SourceSpan::new(start.into(), len),
        }
    }

    pub fn unexpected_rule(rule: Rule) -> Self {
        Self::UnexpectedRule {
            rule: format!("{rule:?}"),
        }
    }

    /// Convert a pest failure into one of our diagnostics
    pub(crate) fn from_pest(
        error: pest::error::Error<Rule>,
        src: &str,
        constructor: PestErrorConstructor,
    ) -> Self {
        let span = match error.location {
            InputLocation::Pos(pos) => SourceSpan::new(pos.into(), 0),
            InputLocation::Span((start, end)) => SourceSpan::new(start.into(), end - start),
        };
        constructor(src.to_string(), span, error.variant.message().into_owned())
    }
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors raised while splicing blocks into or out of a tree
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("A {block} block has no `{step}` slot")]
    #[diagnostic(
        code(blockrun::edit::no_such_slot),
        help("Operators have left/right, assignments have expr, if has cond/then.N/else.N, while has cond/body.N")
    )]
    NoSuchSlot { block: &'static str, step: String },

    #[error("Slot `{path}` is empty")]
    #[diagnostic(code(blockrun::edit::empty_slot))]
    EmptySlot { path: SlotPath },

    #[error("Slot `{path}` is already occupied")]
    #[diagnostic(
        code(blockrun::edit::slot_occupied),
        help("Statements can only be dropped into the open slot at the end of a list")
    )]
    SlotOccupied { path: SlotPath },

    #[error("Statement index {index} is out of range at `{path}`")]
    #[diagnostic(code(blockrun::edit::index_out_of_range))]
    IndexOutOfRange { path: SlotPath, index: usize },

    #[error("An empty path does not name a slot")]
    #[diagnostic(code(blockrun::edit::empty_path))]
    EmptyPath,

    #[error("No block {id} on the canvas")]
    #[diagnostic(code(blockrun::edit::unknown_unit))]
    UnknownUnit { id: UnitId },

    #[error("Dropping here would nest blocks {depth} levels deep")]
    #[diagnostic(
        code(blockrun::edit::too_deep),
        help("Split the program into more units on the canvas")
    )]
    TooDeep { depth: usize, limit: usize },

    #[error("Block {id} cannot be dropped into itself")]
    #[diagnostic(code(blockrun::edit::self_graft))]
    SelfGraft { id: UnitId },
}

pub type EditResult<T> = std::result::Result<T, EditError>;
