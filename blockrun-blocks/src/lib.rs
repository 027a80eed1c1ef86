// Blockrun Blocks Library
// Block trees, program units, slot-path editing and pest-based entry parsing

pub mod ast;
pub mod error;
pub mod parser;
pub mod path;
pub mod program;
pub mod stack;

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;

pub use ast::*;
pub use error::*;
pub use parser::{BlockParser, EntryMode, Rule};
pub use path::{SlotPath, SlotStep};
pub use program::{run_order, Placement, Program, ProgramUnit, UnitId, MAX_TREE_DEPTH};
pub use stack::ensure_sufficient_stack;

/// Turn text typed into the entry bar into a block
pub fn parse_entry(input: &str, mode: EntryMode) -> Result<Block, ParseError> {
    BlockParser::parse_entry(input, mode)
}

/// Turn a palette item name into a fresh block with open slots
pub fn parse_palette_item(input: &str) -> Result<Block, ParseError> {
    BlockParser::parse_palette_item(input)
}

pub fn parse_slot_path(input: &str) -> Result<SlotPath, ParseError> {
    BlockParser::parse_slot_path(input)
}

// Version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
