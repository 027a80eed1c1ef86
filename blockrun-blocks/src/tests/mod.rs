// Block model tests
// Entry parsing, palette parsing, slot paths and canvas editing

pub mod test_entry_parsing;
pub mod test_program_editing;
