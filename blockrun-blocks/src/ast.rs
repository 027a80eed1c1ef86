// Blockrun Block Definitions
// Block tree nodes with explicit absent slots

use crate::stack::ensure_sufficient_stack;

/// A numeric literal as typed into the editor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Integer(value) => write!(f, "{value}"),
            Number::Float(value) => write!(f, "{value:?}"),
        }
    }
}

/// Arithmetic operators available in the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl ArithmeticOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOperator::Add => "+",
            ArithmeticOperator::Subtract => "-",
            ArithmeticOperator::Multiply => "×",
            ArithmeticOperator::Divide => "÷",
            ArithmeticOperator::Power => "^",
        }
    }
}

/// Comparison operators available in the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    GreaterThan,
    LessThan,
    Equal,
}

impl ComparisonOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::Equal => "=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Arithmetic(ArithmeticOperator),
    Comparison(ComparisonOperator),
}

impl BinaryOperator {
    pub const ADD: Self = BinaryOperator::Arithmetic(ArithmeticOperator::Add);
    pub const SUBTRACT: Self = BinaryOperator::Arithmetic(ArithmeticOperator::Subtract);
    pub const MULTIPLY: Self = BinaryOperator::Arithmetic(ArithmeticOperator::Multiply);
    pub const DIVIDE: Self = BinaryOperator::Arithmetic(ArithmeticOperator::Divide);
    pub const POWER: Self = BinaryOperator::Arithmetic(ArithmeticOperator::Power);
    pub const GREATER_THAN: Self = BinaryOperator::Comparison(ComparisonOperator::GreaterThan);
    pub const LESS_THAN: Self = BinaryOperator::Comparison(ComparisonOperator::LessThan);
    pub const EQUAL: Self = BinaryOperator::Comparison(ComparisonOperator::Equal);

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Arithmetic(op) => op.symbol(),
            BinaryOperator::Comparison(op) => op.symbol(),
        }
    }

    /// Look up an operator by its palette symbol (`*` and `/` are accepted as aliases)
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::ADD),
            "-" => Some(Self::SUBTRACT),
            "×" | "*" => Some(Self::MULTIPLY),
            "÷" | "/" => Some(Self::DIVIDE),
            "^" => Some(Self::POWER),
            ">" => Some(Self::GREATER_THAN),
            "<" => Some(Self::LESS_THAN),
            "=" => Some(Self::EQUAL),
            _ => None,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOperator::Comparison(_))
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An operand position; `None` is an open drop target
pub type Slot = Option<Box<Block>>;

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub operator: BinaryOperator,
    pub left: Slot,
    pub right: Slot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub expr: Slot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfElse {
    pub condition: Slot,
    pub then_branch: StatementList,
    pub else_branch: StatementList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileLoop {
    pub condition: Slot,
    pub body: StatementList,
}

/// Relocate the turtle to the start point and draw towards the destination
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoveTo {
    pub start_x: Slot,
    pub start_y: Slot,
    pub dest_x: Slot,
    pub dest_y: Slot,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoveForward {
    pub distance: Slot,
}

/// Rotation in degrees, anticlockwise
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rotate {
    pub angle: Slot,
}

/// A node of a block tree
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Literal(Number),
    Variable(String),
    BinaryOp(BinaryOp),
    Assign(Assignment),
    If(IfElse),
    While(WhileLoop),
    MoveTo(MoveTo),
    MoveForward(MoveForward),
    Rotate(Rotate),
}

impl Block {
    pub fn literal(value: impl Into<Number>) -> Self {
        Block::Literal(value.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Block::Variable(name.into())
    }

    /// An operator block with both operands bound
    pub fn binary(operator: BinaryOperator, left: Block, right: Block) -> Self {
        Block::BinaryOp(BinaryOp {
            operator,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        })
    }

    /// An operator block fresh from the palette
    pub fn empty_binary(operator: BinaryOperator) -> Self {
        Block::BinaryOp(BinaryOp {
            operator,
            left: None,
            right: None,
        })
    }

    pub fn assign(name: impl Into<String>, expr: Block) -> Self {
        Block::Assign(Assignment {
            name: name.into(),
            expr: Some(Box::new(expr)),
        })
    }

    pub fn empty_assign(name: impl Into<String>) -> Self {
        Block::Assign(Assignment {
            name: name.into(),
            expr: None,
        })
    }

    pub fn if_else(
        condition: Block,
        then_branch: impl IntoIterator<Item = Block>,
        else_branch: impl IntoIterator<Item = Block>,
    ) -> Self {
        Block::If(IfElse {
            condition: Some(Box::new(condition)),
            then_branch: StatementList::from_blocks(then_branch),
            else_branch: StatementList::from_blocks(else_branch),
        })
    }

    pub fn empty_if() -> Self {
        Block::If(IfElse {
            condition: None,
            then_branch: StatementList::new(),
            else_branch: StatementList::new(),
        })
    }

    pub fn while_loop(condition: Block, body: impl IntoIterator<Item = Block>) -> Self {
        Block::While(WhileLoop {
            condition: Some(Box::new(condition)),
            body: StatementList::from_blocks(body),
        })
    }

    pub fn empty_while() -> Self {
        Block::While(WhileLoop {
            condition: None,
            body: StatementList::new(),
        })
    }

    pub fn move_to(start_x: Block, start_y: Block, dest_x: Block, dest_y: Block) -> Self {
        Block::MoveTo(MoveTo {
            start_x: Some(Box::new(start_x)),
            start_y: Some(Box::new(start_y)),
            dest_x: Some(Box::new(dest_x)),
            dest_y: Some(Box::new(dest_y)),
        })
    }

    pub fn move_forward(distance: Block) -> Self {
        Block::MoveForward(MoveForward {
            distance: Some(Box::new(distance)),
        })
    }

    pub fn rotate(angle: Block) -> Self {
        Block::Rotate(Rotate {
            angle: Some(Box::new(angle)),
        })
    }

    /// Short name of the block kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Literal(_) => "number",
            Block::Variable(_) => "variable",
            Block::BinaryOp(op) if op.operator.is_comparison() => "comparison",
            Block::BinaryOp(_) => "operation",
            Block::Assign(_) => "assignment",
            Block::If(_) => "if",
            Block::While(_) => "while",
            Block::MoveTo(_) => "moveTo",
            Block::MoveForward(_) => "moveForward",
            Block::Rotate(_) => "rotate",
        }
    }

    /// Whether the block produces a value when evaluated
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Block::Literal(_) | Block::Variable(_) | Block::BinaryOp(_)
        )
    }

    /// Nesting depth of the tree; leaves and absent slots count as one level
    pub fn depth(&self) -> usize {
        ensure_sufficient_stack(|| self.depth_inner())
    }

    fn depth_inner(&self) -> usize {
        fn slot_depth(slot: &Slot) -> usize {
            slot.as_deref().map_or(1, Block::depth)
        }

        fn list_depth(list: &StatementList) -> usize {
            list.slots()
                .iter()
                .map(|slot| slot.as_ref().map_or(1, Block::depth))
                .max()
                .unwrap_or(1)
        }

        match self {
            Block::Literal(_) | Block::Variable(_) => 1,
            Block::BinaryOp(op) => 1 + slot_depth(&op.left).max(slot_depth(&op.right)),
            Block::Assign(assign) => 1 + slot_depth(&assign.expr),
            Block::If(if_else) => {
                1 + slot_depth(&if_else.condition)
                    .max(list_depth(&if_else.then_branch))
                    .max(list_depth(&if_else.else_branch))
            }
            Block::While(while_loop) => {
                1 + slot_depth(&while_loop.condition).max(list_depth(&while_loop.body))
            }
            Block::MoveTo(move_to) => {
                1 + slot_depth(&move_to.start_x)
                    .max(slot_depth(&move_to.start_y))
                    .max(slot_depth(&move_to.dest_x))
                    .max(slot_depth(&move_to.dest_y))
            }
            Block::MoveForward(forward) => 1 + slot_depth(&forward.distance),
            Block::Rotate(rotate) => 1 + slot_depth(&rotate.angle),
        }
    }
}

/// An ordered statement list that always ends in an open slot
#[derive(Debug, Clone, PartialEq)]
pub struct StatementList {
    slots: Vec<Option<Block>>,
}

impl StatementList {
    pub fn new() -> Self {
        Self { slots: vec![None] }
    }

    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut list = Self::new();
        for block in blocks {
            list.push(block);
        }
        list
    }

    /// Every slot, including the trailing open one
    pub fn slots(&self) -> &[Option<Block>] {
        &self.slots
    }

    /// Bound statements in order, skipping absent slots
    pub fn statements(&self) -> impl Iterator<Item = &Block> {
        self.slots.iter().flatten()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn statement_count(&self) -> usize {
        self.statements().count()
    }

    /// Index of the trailing open slot
    pub fn open_slot(&self) -> usize {
        self.slots.len() - 1
    }

    /// Bind a block into the open slot and open a fresh one after it
    pub fn push(&mut self, block: Block) {
        let open = self.open_slot();
        self.slots[open] = Some(block);
        self.slots.push(None);
    }

    pub(crate) fn statement_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Remove a bound statement; the open slot cannot be removed
    pub(crate) fn remove(&mut self, index: usize) -> Option<Block> {
        if index >= self.open_slot() || self.slots[index].is_none() {
            return None;
        }
        self.slots.remove(index)
    }
}

impl Default for StatementList {
    fn default() -> Self {
        Self::new()
    }
}

fn fmt_slot(slot: &Slot, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match slot {
        Some(block) => write!(f, "{block}"),
        None => f.write_str("_"),
    }
}

impl std::fmt::Display for StatementList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            match slot {
                Some(block) => write!(f, "{block}")?,
                None => f.write_str("_")?,
            }
        }
        f.write_str("]")
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        ensure_sufficient_stack(|| self.fmt_tree(f))
    }
}

impl Block {
    fn fmt_tree(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Block::Literal(number) => write!(f, "{number}"),
            Block::Variable(name) => f.write_str(name),
            Block::BinaryOp(op) => {
                f.write_str("(")?;
                fmt_slot(&op.left, f)?;
                write!(f, " {} ", op.operator)?;
                fmt_slot(&op.right, f)?;
                f.write_str(")")
            }
            Block::Assign(assign) => {
                write!(f, "{} <- ", assign.name)?;
                fmt_slot(&assign.expr, f)
            }
            Block::If(if_else) => {
                f.write_str("if ")?;
                fmt_slot(&if_else.condition, f)?;
                write!(
                    f,
                    " then {} else {}",
                    if_else.then_branch, if_else.else_branch
                )
            }
            Block::While(while_loop) => {
                f.write_str("while ")?;
                fmt_slot(&while_loop.condition, f)?;
                write!(f, " do {}", while_loop.body)
            }
            Block::MoveTo(move_to) => {
                f.write_str("moveTo(")?;
                fmt_slot(&move_to.start_x, f)?;
                f.write_str(", ")?;
                fmt_slot(&move_to.start_y, f)?;
                f.write_str(", ")?;
                fmt_slot(&move_to.dest_x, f)?;
                f.write_str(", ")?;
                fmt_slot(&move_to.dest_y, f)?;
                f.write_str(")")
            }
            Block::MoveForward(forward) => {
                f.write_str("moveForward(")?;
                fmt_slot(&forward.distance, f)?;
                f.write_str(")")
            }
            Block::Rotate(rotate) => {
                f.write_str("rotate(")?;
                fmt_slot(&rotate.angle, f)?;
                f.write_str(")")
            }
        }
    }
}
