// Blockrun Entry Parser
// Pest-based parsing of typed entries, palette items and slot paths

use crate::ast::{BinaryOperator, Block, Number};
use crate::error::{ParseError, ParseResult, PestErrorConstructor};
use crate::path::{SlotPath, SlotStep};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct BlockParser;

/// How an identifier typed into the entry bar should become a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryMode {
    /// A variable reference
    #[default]
    Value,
    /// An assignment to the named variable with an open expression slot
    Assignment,
}

impl BlockParser {
    /// Parse `rule` and hand back the single meaningful child of the top-level pair
    fn parse_single(
        rule: Rule,
        input: &str,
        constructor: PestErrorConstructor,
    ) -> ParseResult<Pair<'_, Rule>> {
        let mut pairs = Self::parse(rule, input)
            .map_err(|error| ParseError::from_pest(error, input, constructor))?;
        pairs
            .next()
            .and_then(|top| top.into_inner().next())
            .ok_or_else(|| ParseError::unexpected_rule(rule))
    }

    pub fn parse_entry(input: &str, mode: EntryMode) -> ParseResult<Block> {
        let pair = Self::parse_single(Rule::entry, input, ParseError::invalid_entry)?;

        match pair.as_rule() {
            Rule::keyword_if => Ok(Block::empty_if()),
            Rule::keyword_while => Ok(Block::empty_while()),
            Rule::number => Self::parse_number(pair, input).map(Block::Literal),
            Rule::identifier => {
                let name = pair.as_str();
                Ok(match mode {
                    EntryMode::Value => Block::variable(name),
                    EntryMode::Assignment => Block::empty_assign(name),
                })
            }
            rule => Err(ParseError::unexpected_rule(rule)),
        }
    }

    fn parse_number(pair: Pair<Rule>, input: &str) -> ParseResult<Number> {
        let span = pair.as_span();
        let inner = pair
            .into_inner()
            .next()
            .ok_or_else(|| ParseError::unexpected_rule(Rule::number))?;
        let text = inner.as_str();
        let invalid = || ParseError::invalid_number(input, span.start(), span.end() - span.start());

        match inner.as_rule() {
            Rule::integer => text.parse::<i64>().map(Number::Integer).map_err(|_| invalid()),
            Rule::float => match text.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Number::Float(value)),
                _ => Err(invalid()),
            },
            rule => Err(ParseError::unexpected_rule(rule)),
        }
    }

    pub fn parse_palette_item(input: &str) -> ParseResult<Block> {
        let pair = Self::parse_single(Rule::palette_item, input, ParseError::unknown_palette_item)?;

        match pair.as_rule() {
            Rule::operator_symbol => BinaryOperator::from_symbol(pair.as_str())
                .map(Block::empty_binary)
                .ok_or_else(|| ParseError::unexpected_rule(Rule::operator_symbol)),
            Rule::turtle_move_to => Ok(Block::MoveTo(Default::default())),
            Rule::turtle_move_forward => Ok(Block::MoveForward(Default::default())),
            Rule::turtle_rotate => Ok(Block::Rotate(Default::default())),
            rule => Err(ParseError::unexpected_rule(rule)),
        }
    }

    pub fn parse_slot_path(input: &str) -> ParseResult<SlotPath> {
        let mut pairs = Self::parse(Rule::slot_path, input)
            .map_err(|error| ParseError::from_pest(error, input, ParseError::invalid_slot_path))?;
        let top = pairs
            .next()
            .ok_or_else(|| ParseError::unexpected_rule(Rule::slot_path))?;

        top.into_inner()
            .filter(|pair| pair.as_rule() == Rule::slot_step)
            .map(|pair| Self::parse_slot_step(pair, input))
            .collect()
    }

    fn parse_slot_step(pair: Pair<Rule>, input: &str) -> ParseResult<SlotStep> {
        let step = pair
            .into_inner()
            .next()
            .ok_or_else(|| ParseError::unexpected_rule(Rule::slot_step))?;

        let step = match step.as_rule() {
            Rule::step_then => SlotStep::Then(Self::parse_index(step, input)?),
            Rule::step_else => SlotStep::Else(Self::parse_index(step, input)?),
            Rule::step_body => SlotStep::Body(Self::parse_index(step, input)?),
            Rule::step_left => SlotStep::Left,
            Rule::step_right => SlotStep::Right,
            Rule::step_expr => SlotStep::Expr,
            Rule::step_cond => SlotStep::Condition,
            Rule::step_start_x => SlotStep::StartX,
            Rule::step_start_y => SlotStep::StartY,
            Rule::step_dest_x => SlotStep::DestX,
            Rule::step_dest_y => SlotStep::DestY,
            Rule::step_distance => SlotStep::Distance,
            Rule::step_angle => SlotStep::Angle,
            rule => return Err(ParseError::unexpected_rule(rule)),
        };
        Ok(step)
    }

    fn parse_index(pair: Pair<Rule>, input: &str) -> ParseResult<usize> {
        let index = pair
            .into_inner()
            .next()
            .ok_or_else(|| ParseError::unexpected_rule(Rule::index))?;
        let span = index.as_span();
        index.as_str().parse().map_err(|_| {
            ParseError::invalid_slot_path(
                input.to_string(),
                miette::SourceSpan::new(span.start().into(), span.end() - span.start()),
                "statement index is too large".to_string(),
            )
        })
    }
}
