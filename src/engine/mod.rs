//! Execution engine for the shell's text-assembly binaries.
//!
//! A binary is plain text: `label:` lines open instruction blocks, other
//! lines are `mnemonic operand, operand, ...` with `;` comments. The engine
//! tokenizes each line, groups instructions under their labels, and runs
//! them over a register file and a sparse memory space. The host is
//! reachable only through the numbered syscall table.
//!
//! # Architecture
//!
//! - **Registers**: named i64 cells, dense-indexed by interned symbol id.
//! - **Memory**: sparse i64-to-i64 cells; unwritten cells read 0; strings
//!   are NUL-terminated runs of one character code per cell.
//! - **Addressing**: bare words name registers, bare integers read as
//!   immediates but write to the cell they name, and `[x]` always means
//!   memory.
//! - **Control flow**: an explicit frame stack. `jmp` and taken branches
//!   replace the top frame, `call` pushes, a block running out pops, and
//!   the scheduler yields to the host at every block entry.
//! - **Faults**: terminal and line-tagged; hosts report them as the
//!   negated 0-based line.
//!
//! # Modules
//!
//! - [`errors`]: the fault taxonomy
//! - [`isa`]: the mnemonic table
//! - [`operand`]: lowered operands
//! - [`process`]: the executor and its state
//! - [`program`]: label walk and instruction lowering
//! - [`syscall`]: the host service table
//! - [`tokenizer`]: the line lexer

pub mod errors;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub mod operand;
pub mod process;
pub mod program;
pub mod syscall;
pub mod tokenizer;
