//! Dense register file.

use crate::engine::program::Sym;

/// One cell per interned symbol, zero-initialized, indexed by symbol id.
/// Every word a program mentions gets a slot, so "unset" registers read 0
/// simply because nothing ever wrote to them.
#[derive(Debug)]
pub(crate) struct Registers(Vec<i64>);

impl Registers {
    pub(crate) fn new(symbol_count: usize) -> Registers {
        Registers(vec![0; symbol_count])
    }

    pub(crate) fn get(&self, reg: Sym) -> i64 {
        self.0.get(reg.index()).copied().unwrap_or(0)
    }

    pub(crate) fn set(&mut self, reg: Sym, value: i64) {
        if let Some(cell) = self.0.get_mut(reg.index()) {
            *cell = value;
        }
    }
}
