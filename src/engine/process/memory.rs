//! Sparse memory.

use std::collections::HashMap;

/// Backing store for a process: any i64 addresses any i64, and cells nobody
/// wrote read 0. Strings are runs of one character code per cell, ended by
/// a 0 cell.
#[derive(Debug, Default)]
pub(crate) struct Memory {
    cells: HashMap<i64, i64>,
}

impl Memory {
    pub(crate) fn new() -> Memory {
        Memory { cells: HashMap::new() }
    }

    pub(crate) fn get(&self, address: i64) -> i64 {
        self.cells.get(&address).copied().unwrap_or(0)
    }

    pub(crate) fn set(&mut self, address: i64, value: i64) {
        self.cells.insert(address, value);
    }

    /// Reads the NUL-terminated string starting at `address`.
    pub(crate) fn read_string(&self, address: i64) -> String {
        let mut text = String::new();
        let mut at = address;
        loop {
            let cell = self.get(at);
            if cell == 0 {
                break;
            }
            text.push(cell_to_char(cell));
            at = at.wrapping_add(1);
        }
        text
    }

    /// Writes `text` one character code per cell, then the terminating 0.
    pub(crate) fn write_string(&mut self, address: i64, text: &str) {
        let mut at = address;
        for c in text.chars() {
            self.set(at, c as u32 as i64);
            at = at.wrapping_add(1);
        }
        self.set(at, 0);
    }
}

/// The character a cell value encodes; values outside the Unicode scalar
/// range render as U+FFFD.
pub(crate) fn cell_to_char(cell: i64) -> char {
    u32::try_from(cell)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or('\u{FFFD}')
}
