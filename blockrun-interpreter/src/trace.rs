//! Execution trace recorder.
//!
//! Every assignment writes its value into the variable's column. Columns stay
//! aligned: a value goes into the last row, and when that cell is already
//! taken a new row is opened across every column first.

use crate::value::Value;
use indexmap::IndexMap;

/// Per-variable value history, one row per step
#[derive(Debug, Clone, PartialEq)]
pub struct TraceTable {
    columns: IndexMap<String, Vec<Option<Value>>>,
    length: usize,
    scratch_row: bool,
}

impl TraceTable {
    /// An empty table with a single open row
    pub fn new() -> Self {
        Self {
            columns: IndexMap::new(),
            length: 1,
            scratch_row: false,
        }
    }

    /// Number of recorded rows
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn record(&mut self, name: &str, value: Value) {
        if let Some(column) = self.columns.get(name) {
            if column.last().is_some_and(Option::is_some) {
                for column in self.columns.values_mut() {
                    column.push(None);
                }
                self.length += 1;
            }
        } else {
            self.columns
                .insert(name.to_string(), vec![None; self.length]);
        }

        if let Some(cell) = self
            .columns
            .get_mut(name)
            .and_then(|column| column.last_mut())
        {
            *cell = Some(value);
        }
    }

    /// Variable names in the order they were first recorded
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<Value>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Forget every column and return to a single open row
    pub fn clear(&mut self) {
        self.columns.clear();
        self.length = 1;
        self.scratch_row = false;
    }

    /// Show an extra blank row below the table while a renderer lays it out
    pub fn begin_scratch_row(&mut self) {
        self.scratch_row = true;
    }

    pub fn end_scratch_row(&mut self) {
        self.scratch_row = false;
    }

    /// Rows a renderer should draw, including the scratch row when open
    pub fn row_count(&self) -> usize {
        self.length + usize::from(self.scratch_row)
    }

    /// Aligned rows, one cell per column in `column_names` order
    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<Value>>> + '_ {
        (0..self.row_count()).map(move |row| {
            self.columns
                .values()
                .map(|column| column.get(row).copied().flatten())
                .collect()
        })
    }
}

impl Default for TraceTable {
    fn default() -> Self {
        Self::new()
    }
}
