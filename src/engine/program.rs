//! Program building: the label walk, symbol interning, and instruction
//! lowering.
//!
//! A binary is line-oriented. A trimmed line ending in `:` opens a labeled
//! block; every following instruction line belongs to it until the next
//! label. Blocks are independent: execution never falls from one block into
//! the next, whatever their order in the source.

use std::collections::HashMap;

use crate::engine::errors::ExecError;
use crate::engine::isa::Mnemonic;
use crate::engine::operand::Operand;
use crate::engine::tokenizer::{tokenize, Token, TokenKind};

/// Interned identifier id. Registers index their file with it; labels are
/// looked up by it. Ids are only meaningful within the program that
/// produced them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Sym(u32);

impl Sym {
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// First syscall argument register; also carries the exit code.
pub const EAX: Sym = Sym(0);
/// Second syscall argument register.
pub const EBX: Sym = Sym(1);
/// Third syscall argument register.
pub const ECX: Sym = Sym(2);
/// The entry label every runnable binary must define.
pub const MAIN: Sym = Sym(3);

/// Identifier interner. Mnemonics, registers and labels all share one id
/// space; the well-known names above are interned first so their ids are
/// fixed.
#[derive(Debug)]
pub struct SymbolTable {
    names: Vec<Box<str>>,
    ids: HashMap<Box<str>, Sym>,
}

impl SymbolTable {
    fn new() -> SymbolTable {
        let mut table = SymbolTable {
            names: Vec::new(),
            ids: HashMap::new(),
        };
        table.intern("eax");
        table.intern("ebx");
        table.intern("ecx");
        table.intern("main");
        table
    }

    fn intern(&mut self, name: &str) -> Sym {
        if let Some(&sym) = self.ids.get(name) {
            return sym;
        }
        let sym = Sym(self.names.len() as u32);
        self.names.push(name.into());
        self.ids.insert(name.into(), sym);
        sym
    }

    /// The text a symbol was interned from.
    pub fn name(&self, sym: Sym) -> &str {
        self.names.get(sym.index()).map_or("", |name| name)
    }

    /// Looks up an already-interned name.
    pub fn lookup(&self, name: &str) -> Option<Sym> {
        self.ids.get(name).copied()
    }

    /// Number of interned symbols; registers size their file with it.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Never true: the well-known symbols are always present.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One executable instruction.
///
/// The mnemonic is pre-resolved from the head token but nothing is
/// validated at build time beyond lexical shape: unknown mnemonics, bad
/// arities and bad operand kinds only fault if the instruction is reached.
#[derive(Clone, Debug)]
pub struct Instruction {
    /// `None` when the head is not a word, or names no operation.
    pub op: Option<Mnemonic>,
    /// The raw head operand, kept for fault messages.
    pub head: Operand,
    /// Operands in source order, head excluded.
    pub args: Vec<Operand>,
    /// 0-based source line.
    pub line: u32,
}

/// A loaded binary: labeled instruction blocks plus the symbol table they
/// share.
#[derive(Debug)]
pub struct Program {
    symbols: SymbolTable,
    blocks: HashMap<Sym, Vec<Instruction>>,
}

impl Program {
    /// Parses source text into labeled blocks.
    ///
    /// Faults here abort before anything runs: malformed literals, a
    /// pointer with no `]`, and any non-blank line before the first label
    /// (comment lines included). Redefining a label replaces its earlier
    /// block. Label names are lowercased like every other word.
    pub fn parse(source: &str) -> Result<Program, ExecError> {
        let mut symbols = SymbolTable::new();
        let mut blocks: HashMap<Sym, Vec<Instruction>> = HashMap::new();
        let mut current: Option<Sym> = None;

        for (index, line) in source.lines().enumerate() {
            let line_no = index as u32;
            if line.is_empty() {
                continue;
            }

            let trimmed = line.trim();
            if let Some(name) = trimmed.strip_suffix(':') {
                let label = symbols.intern(&name.to_lowercase());
                blocks.insert(label, Vec::new());
                current = Some(label);
                continue;
            }

            let Some(label) = current else {
                return Err(ExecError::InstructionBeforeLabel { line: line_no });
            };
            let tokens = tokenize(line, line_no)?;
            if tokens.is_empty() {
                continue;
            }
            let instruction = lower(&mut symbols, tokens, line_no);
            if let Some(block) = blocks.get_mut(&label) {
                block.push(instruction);
            }
        }

        Ok(Program { symbols, blocks })
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The instruction block a label opens, if the label exists.
    pub(crate) fn block(&self, label: Sym) -> Option<&[Instruction]> {
        self.blocks.get(&label).map(Vec::as_slice)
    }

    pub fn has_label(&self, label: Sym) -> bool {
        self.blocks.contains_key(&label)
    }
}

/// Lowers one non-empty token list into an instruction.
fn lower(symbols: &mut SymbolTable, tokens: Vec<Token>, line: u32) -> Instruction {
    let mut operands = tokens.into_iter().map(|token| match token.kind {
        TokenKind::Word(name) => Operand::Word(symbols.intern(&name)),
        TokenKind::Int(value) => Operand::Int(value),
        TokenKind::Str(text) => Operand::Str(text.into_boxed_str()),
        TokenKind::PointerWord(name) => Operand::PointerWord(symbols.intern(&name)),
        TokenKind::PointerInt(value) => Operand::PointerInt(value),
        TokenKind::Symbol(c) => Operand::Symbol(c),
    });

    let head = operands.next().unwrap_or(Operand::Symbol(' '));
    let args: Vec<Operand> = operands.collect();
    let op = match &head {
        Operand::Word(sym) => Mnemonic::from_name(symbols.name(*sym)),
        _ => None,
    };

    Instruction { op, head, args, line }
}
