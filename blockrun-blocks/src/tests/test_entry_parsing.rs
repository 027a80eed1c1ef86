// Typed entry parsing tests
// Keywords, numbers and identifiers typed into the entry bar

use crate::{parse_entry, Block, EntryMode, Number, ParseError};
use pretty_assertions::assert_eq;

#[test]
fn test_parse_if_keyword() {
    let block = parse_entry("if", EntryMode::Value).unwrap();
    assert_eq!(block, Block::empty_if());
}

#[test]
fn test_parse_while_keyword() {
    let block = parse_entry("while", EntryMode::Value).unwrap();
    assert_eq!(block, Block::empty_while());
}

#[test]
fn test_keyword_wins_in_assignment_mode() {
    let block = parse_entry("if", EntryMode::Assignment).unwrap();
    assert_eq!(block, Block::empty_if());
}

#[test]
fn test_keyword_prefix_is_identifier() {
    let block = parse_entry("iffy", EntryMode::Value).unwrap();
    assert_eq!(block, Block::variable("iffy"));

    let block = parse_entry("whilex", EntryMode::Assignment).unwrap();
    assert_eq!(block, Block::empty_assign("whilex"));
}

#[test]
fn test_parse_integer() {
    assert_eq!(
        parse_entry("42", EntryMode::Value).unwrap(),
        Block::Literal(Number::Integer(42))
    );
    assert_eq!(
        parse_entry("-7", EntryMode::Value).unwrap(),
        Block::Literal(Number::Integer(-7))
    );
}

#[test]
fn test_parse_float() {
    assert_eq!(
        parse_entry("2.5", EntryMode::Value).unwrap(),
        Block::Literal(Number::Float(2.5))
    );
    assert_eq!(
        parse_entry("-.5", EntryMode::Value).unwrap(),
        Block::Literal(Number::Float(-0.5))
    );
}

#[test]
fn test_rejects_malformed_numbers() {
    for input in ["1.", ".5", "1.2.3", "5-", "--1", "-"] {
        let result = parse_entry(input, EntryMode::Value);
        assert!(
            matches!(result, Err(ParseError::InvalidEntry { .. })),
            "expected {input:?} to be rejected, got {result:?}"
        );
    }
}

#[test]
fn test_integer_out_of_range() {
    let result = parse_entry("99999999999999999999", EntryMode::Value);
    assert!(matches!(result, Err(ParseError::InvalidNumber { .. })));
}

#[test]
fn test_parse_identifier_modes() {
    assert_eq!(
        parse_entry("total", EntryMode::Value).unwrap(),
        Block::variable("total")
    );
    assert_eq!(
        parse_entry("total", EntryMode::Assignment).unwrap(),
        Block::empty_assign("total")
    );
    assert_eq!(
        parse_entry("x2", EntryMode::Value).unwrap(),
        Block::variable("x2")
    );
}

#[test]
fn test_rejects_identifier_starting_with_digit() {
    let result = parse_entry("2x", EntryMode::Value);
    assert!(matches!(result, Err(ParseError::InvalidEntry { .. })));
}

#[test]
fn test_rejects_empty_and_punctuation() {
    assert!(parse_entry("", EntryMode::Value).is_err());
    assert!(parse_entry("a b", EntryMode::Value).is_err());
    assert!(parse_entry("x_y", EntryMode::Value).is_err());
}
