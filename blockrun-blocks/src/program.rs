// Blockrun Programs
// Top-level units on the canvas and the editing operations over them

use crate::ast::Block;
use crate::error::{EditError, EditResult};
use crate::path::SlotPath;

/// Deepest tree a graft may build
pub const MAX_TREE_DEPTH: usize = 1024;

/// Stable identity of a unit on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Canvas position of a unit; only the run order is derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
}

impl Placement {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Units run top to bottom, then left to right
    pub fn run_order_key(&self) -> (i32, i32) {
        (self.y, self.x)
    }
}

/// A block tree placed on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramUnit {
    id: UnitId,
    pub placement: Placement,
    pub block: Block,
}

impl ProgramUnit {
    pub fn new(id: UnitId, block: Block, placement: Placement) -> Self {
        Self {
            id,
            placement,
            block,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }
}

/// Order units for a run: stable sort on `(y, x)`, ties keep insertion order
pub fn run_order(units: &[ProgramUnit]) -> Vec<&ProgramUnit> {
    let mut ordered: Vec<&ProgramUnit> = units.iter().collect();
    ordered.sort_by_key(|unit| unit.placement.run_order_key());
    ordered
}

/// Every unit on the canvas, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Program {
    units: Vec<ProgramUnit>,
    next_id: u32,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn units(&self) -> &[ProgramUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn add(&mut self, block: Block, placement: Placement) -> UnitId {
        self.next_id += 1;
        let id = UnitId(self.next_id);
        self.units.push(ProgramUnit::new(id, block, placement));
        id
    }

    pub fn get(&self, id: UnitId) -> Option<&ProgramUnit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut ProgramUnit> {
        self.units.iter_mut().find(|unit| unit.id == id)
    }

    fn position(&self, id: UnitId) -> EditResult<usize> {
        self.units
            .iter()
            .position(|unit| unit.id == id)
            .ok_or(EditError::UnknownUnit { id })
    }

    pub fn remove(&mut self, id: UnitId) -> EditResult<ProgramUnit> {
        let index = self.position(id)?;
        Ok(self.units.remove(index))
    }

    pub fn place(&mut self, id: UnitId, placement: Placement) -> EditResult<()> {
        let unit = self.get_mut(id).ok_or(EditError::UnknownUnit { id })?;
        unit.placement = placement;
        Ok(())
    }

    /// Drag unit `id` into the slot at `path` inside unit `target`.
    ///
    /// On success the dragged unit leaves the canvas. A block displaced from an
    /// operand slot is put back on the canvas where the dragged unit was, and
    /// its new id is returned. On failure the canvas is unchanged.
    ///
    /// Grafts that would nest deeper than [`MAX_TREE_DEPTH`] are refused.
    pub fn graft(
        &mut self,
        id: UnitId,
        target: UnitId,
        path: &SlotPath,
    ) -> EditResult<Option<UnitId>> {
        if id == target {
            return Err(EditError::SelfGraft { id });
        }
        self.position(target)?;
        let index = self.position(id)?;

        let depth = path.steps().len() + self.units[index].block.depth();
        if depth > MAX_TREE_DEPTH {
            return Err(EditError::TooDeep {
                depth,
                limit: MAX_TREE_DEPTH,
            });
        }

        let unit = self.units.remove(index);
        let placement = unit.placement;

        let result = match self.get_mut(target) {
            Some(target_unit) => target_unit.block.insert(path, unit.block.clone()),
            None => Err(EditError::UnknownUnit { id: target }),
        };

        match result {
            Ok(displaced) => Ok(displaced.map(|block| self.add(block, placement))),
            Err(error) => {
                self.units.insert(index, unit);
                Err(error)
            }
        }
    }

    /// Lift the subtree at `path` inside `target` back onto the canvas
    pub fn detach(
        &mut self,
        target: UnitId,
        path: &SlotPath,
        placement: Placement,
    ) -> EditResult<UnitId> {
        let unit = self
            .get_mut(target)
            .ok_or(EditError::UnknownUnit { id: target })?;
        let block = unit.block.detach(path)?;
        Ok(self.add(block, placement))
    }

    /// Units in the order a run executes them
    pub fn run_order(&self) -> Vec<&ProgramUnit> {
        run_order(&self.units)
    }

    /// The 1-based "Block n" label a unit carries in the run order
    pub fn label(&self, id: UnitId) -> Option<usize> {
        self.run_order()
            .iter()
            .position(|unit| unit.id == id)
            .map(|rank| rank + 1)
    }
}
