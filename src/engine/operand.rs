//! Lowered instruction operands.

use crate::engine::program::Sym;

/// An instruction operand after words have been interned.
///
/// Addressing is asymmetric for bare integers: they read as immediate
/// values but name a memory cell when written to or updated in place.
/// Words name registers, except in control transfers where they name
/// labels. Pointer operands always address memory, either directly
/// (`[5]`) or through a register's value (`[eax]`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Word(Sym),
    Int(i64),
    Str(Box<str>),
    PointerWord(Sym),
    PointerInt(i64),
    Symbol(char),
}

impl Operand {
    /// Human-readable operand kind, for fault messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Operand::Word(_) => "word",
            Operand::Int(_) => "integer",
            Operand::Str(_) => "string literal",
            Operand::PointerWord(_) | Operand::PointerInt(_) => "pointer",
            Operand::Symbol(_) => "symbol",
        }
    }
}
