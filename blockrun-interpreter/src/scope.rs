//! Scope management for the blockrun interpreter.
//!
//! `If` and `While` blocks open a frame on entry and drop it on exit. Writes
//! go to the innermost frame that already binds the name, so an inner block
//! updates outer variables in place and never shadows them.

use crate::error::{Result, RuntimeError};
use crate::value::Value;
use indexmap::IndexMap;

/// A single frame of variable bindings, in first-assigned order
#[derive(Debug, Clone, Default, PartialEq)]
struct Frame {
    variables: IndexMap<String, Value>,
}

/// Stack of variable frames; frame 0 is the permanent global frame
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeChain {
    frames: Vec<Frame>,
}

impl ScopeChain {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Open a frame for a nested block
    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Drop the innermost frame; the global frame is never removed
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Back to a single empty global frame
    pub fn reset(&mut self) {
        self.frames.clear();
        self.frames.push(Frame::default());
    }

    /// Number of frames, including the global one
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Look a name up from the innermost frame outwards
    pub fn read(&self, name: &str) -> Result<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.variables.get(name))
            .copied()
            .ok_or_else(|| RuntimeError::undefined_variable(name))
    }

    /// Update the innermost frame that binds `name`, else bind it in the innermost frame
    pub fn write(&mut self, name: &str, value: Value) {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.variables.get_mut(name) {
                *slot = value;
                return;
            }
        }

        if let Some(frame) = self.frames.last_mut() {
            frame.variables.insert(name.to_string(), value);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frames
            .iter()
            .any(|frame| frame.variables.contains_key(name))
    }

    /// Every binding visible from the innermost frame, outermost frame first
    pub fn visible_bindings(&self) -> Vec<(String, Value)> {
        self.frames
            .iter()
            .flat_map(|frame| frame.variables.iter())
            .map(|(name, value)| (name.clone(), *value))
            .collect()
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}
