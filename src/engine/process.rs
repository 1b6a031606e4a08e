//! The executor.
//!
//! A process owns everything a running binary can touch: its program, a
//! register file, sparse memory, the frame stack, argv, and the two
//! iteration-handle spaces. The host reaches in through [`Process::step`],
//! which runs the top frame until the process enters a new block, and the
//! binary reaches out through the syscall table.
//!
//! Control flow is a stack of block activations. `jmp` and taken branches
//! replace the top frame, `call` pushes a new one, and running off the end
//! of a block pops. An empty stack is a normal exit with code 0.

mod handles;
mod memory;
mod registers;

use self::handles::HandleTable;
use self::memory::{cell_to_char, Memory};
use self::registers::Registers;
use crate::console::Console;
use crate::engine::errors::ExecError;
use crate::engine::isa::Mnemonic;
use crate::engine::operand::Operand;
use crate::engine::program::{Instruction, Program, Sym, MAIN};
use crate::fs::MemoryFs;

/// Upper bound on pending `call` frames; runaway recursion faults instead
/// of exhausting host memory.
pub const MAX_CALL_DEPTH: usize = 4096;

/// Exit code of a binary that defines no `main` label.
pub const NO_MAIN_EXIT_CODE: i64 = -1;

/// One pending block activation.
#[derive(Copy, Clone, Debug)]
struct Frame {
    label: Sym,
    /// Index of the next instruction to run. Already advanced past the
    /// current one while it executes, so a completed `call` resumes after
    /// its call site.
    index: usize,
}

/// Outcome of one scheduler step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// The process entered a new block and yielded; step again to resume
    /// before that block's first instruction.
    Running,
    /// The process terminated with an exit code.
    Exited(i64),
}

/// Terminal state of a completed run.
#[derive(Debug)]
pub enum ExitStatus {
    /// Normal termination: an exit syscall, or the last frame ran off its
    /// block's end.
    Exited(i64),
    /// The process faulted.
    Faulted(ExecError),
}

impl ExitStatus {
    /// The code a host reports: faults surface as the negated 0-based line.
    pub fn code(&self) -> i64 {
        match self {
            ExitStatus::Exited(code) => *code,
            ExitStatus::Faulted(fault) => -(fault.line() as i64),
        }
    }
}

/// What an executed instruction asks the scheduler to do next.
pub(super) enum Flow {
    /// Fall through to the next instruction.
    Next,
    /// Replace the current block with this one.
    Enter(Sym),
    /// Push this block and resume here once it completes.
    Call(Sym),
    /// Unwind everything with an exit code.
    Exit(i64),
}

/// A running (or finished) binary.
pub struct Process {
    pub(super) program: Program,
    pub(super) registers: Registers,
    pub(super) memory: Memory,
    pub(super) frames: Vec<Frame>,
    pub(super) argv: Vec<String>,
    pub(super) dir_handles: HandleTable,
    pub(super) argv_handles: HandleTable,
    pub(super) finished: Option<i64>,
}

impl Process {
    /// Creates a process poised at the entry label.
    ///
    /// The symbol table is complete once parsing ends, so the register file
    /// is sized once and never grows. A binary without `main` is already
    /// finished, with [`NO_MAIN_EXIT_CODE`].
    pub fn spawn(program: Program, argv: Vec<String>) -> Process {
        let registers = Registers::new(program.symbols().len());
        let frames = if program.has_label(MAIN) {
            vec![Frame { label: MAIN, index: 0 }]
        } else {
            Vec::new()
        };
        let finished = frames.is_empty().then_some(NO_MAIN_EXIT_CODE);
        Process {
            program,
            registers,
            memory: Memory::new(),
            frames,
            argv,
            dir_handles: HandleTable::new(),
            argv_handles: HandleTable::new(),
            finished,
        }
    }

    /// Runs instructions until the process enters a new block or
    /// terminates.
    ///
    /// Every block entry yields exactly once, before the entered block's
    /// first instruction; resuming a caller after a completed `call` does
    /// not. Faults are terminal: after an `Err`, further steps report the
    /// fault's exit code.
    pub fn step(
        &mut self,
        fs: &mut MemoryFs,
        console: &mut dyn Console,
    ) -> Result<Step, ExecError> {
        if let Some(code) = self.finished {
            return Ok(Step::Exited(code));
        }
        loop {
            let Some(&Frame { label, index }) = self.frames.last() else {
                self.finished = Some(0);
                return Ok(Step::Exited(0));
            };
            let block = self.program.block(label).unwrap_or(&[]);
            let Some(instruction) = block.get(index).cloned() else {
                self.frames.pop();
                continue;
            };
            if let Some(top) = self.frames.last_mut() {
                top.index += 1;
            }

            let flow = match self.execute(&instruction, fs, console) {
                Ok(flow) => flow,
                Err(fault) => {
                    self.frames.clear();
                    self.finished = Some(-(fault.line() as i64));
                    return Err(fault);
                }
            };
            match flow {
                Flow::Next => {}
                Flow::Enter(label) => {
                    if let Some(top) = self.frames.last_mut() {
                        *top = Frame { label, index: 0 };
                    }
                    return Ok(Step::Running);
                }
                Flow::Call(label) => {
                    if self.frames.len() >= MAX_CALL_DEPTH {
                        let fault = ExecError::CallDepthExceeded { line: instruction.line };
                        self.frames.clear();
                        self.finished = Some(-(fault.line() as i64));
                        return Err(fault);
                    }
                    self.frames.push(Frame { label, index: 0 });
                    return Ok(Step::Running);
                }
                Flow::Exit(code) => {
                    self.frames.clear();
                    self.finished = Some(code);
                    return Ok(Step::Exited(code));
                }
            }
        }
    }

    /// Drives the process to completion.
    pub fn run(&mut self, fs: &mut MemoryFs, console: &mut dyn Console) -> ExitStatus {
        loop {
            match self.step(fs, console) {
                Ok(Step::Running) => {}
                Ok(Step::Exited(code)) => return ExitStatus::Exited(code),
                Err(fault) => return ExitStatus::Faulted(fault),
            }
        }
    }

    /// Current value of a register.
    pub fn register(&self, reg: Sym) -> i64 {
        self.registers.get(reg)
    }

    /// Current value of a memory cell.
    pub fn cell(&self, address: i64) -> i64 {
        self.memory.get(address)
    }

    // ==================== Instruction dispatch ====================

    fn execute(
        &mut self,
        instruction: &Instruction,
        fs: &mut MemoryFs,
        console: &mut dyn Console,
    ) -> Result<Flow, ExecError> {
        let line = instruction.line;
        let args = &instruction.args;

        let Some(op) = instruction.op else {
            return Err(match &instruction.head {
                Operand::Word(sym) => ExecError::UnknownMnemonic {
                    mnemonic: self.program.symbols().name(*sym).to_string(),
                    line,
                },
                other => ExecError::ExpectedMnemonic {
                    found: other.kind_name(),
                    line,
                },
            });
        };
        if !op.accepts_arity(args.len()) {
            return Err(ExecError::ArityMismatch {
                mnemonic: op.name(),
                expected: op.arity_text(),
                got: args.len(),
                line,
            });
        }

        match op {
            Mnemonic::Mov => {
                let value = self.read(&args[1], line)?;
                self.write(&args[0], value, line)?;
                Ok(Flow::Next)
            }
            Mnemonic::Str => {
                let address = self.read(&args[0], line)?;
                let mut text = String::new();
                for part in &args[1..] {
                    match part {
                        Operand::Str(literal) => text.push_str(literal),
                        value => text.push(cell_to_char(self.read(value, line)?)),
                    }
                }
                self.memory.write_string(address, &text);
                Ok(Flow::Next)
            }

            Mnemonic::Add => self.update(args, line, i64::wrapping_add),
            Mnemonic::Sub => self.update(args, line, i64::wrapping_sub),
            Mnemonic::Mul => self.update(args, line, i64::wrapping_mul),
            Mnemonic::Or => self.update(args, line, |a, b| a | b),
            Mnemonic::And => self.update(args, line, |a, b| a & b),
            Mnemonic::Xor => self.update(args, line, |a, b| a ^ b),
            Mnemonic::Div | Mnemonic::Mod => {
                let current = self.read_cell(&args[0], line)?;
                let divisor = self.read(&args[1], line)?;
                if divisor == 0 {
                    return Err(ExecError::DivisionByZero { line });
                }
                let value = if op == Mnemonic::Div {
                    div_floor(current, divisor)
                } else {
                    mod_floor(current, divisor)
                };
                self.write(&args[0], value, line)?;
                Ok(Flow::Next)
            }

            Mnemonic::Not => self.update_unary(&args[0], line, |v| !v),
            Mnemonic::Inc => self.update_unary(&args[0], line, |v| v.wrapping_add(1)),
            Mnemonic::Dec => self.update_unary(&args[0], line, |v| v.wrapping_sub(1)),

            Mnemonic::Jmp => Ok(Flow::Enter(self.target(&args[0], line)?)),
            Mnemonic::Call => Ok(Flow::Call(self.target(&args[0], line)?)),
            Mnemonic::Je => self.branch(args, line, |a, b| a == b),
            Mnemonic::Jg => self.branch(args, line, |a, b| a > b),
            Mnemonic::Jl => self.branch(args, line, |a, b| a < b),

            Mnemonic::Syscall => self.syscall(&args[0], fs, console, line),
        }
    }

    /// Binary in-place update: `dst = cell(dst) op read(src)`.
    fn update(
        &mut self,
        args: &[Operand],
        line: u32,
        op: impl Fn(i64, i64) -> i64,
    ) -> Result<Flow, ExecError> {
        let current = self.read_cell(&args[0], line)?;
        let operand = self.read(&args[1], line)?;
        self.write(&args[0], op(current, operand), line)?;
        Ok(Flow::Next)
    }

    /// Unary in-place update: `dst = op(cell(dst))`.
    fn update_unary(
        &mut self,
        target: &Operand,
        line: u32,
        op: impl Fn(i64) -> i64,
    ) -> Result<Flow, ExecError> {
        let current = self.read_cell(target, line)?;
        self.write(target, op(current), line)?;
        Ok(Flow::Next)
    }

    /// Conditional transfer. The target label is validated before the
    /// comparison, so a bad label faults even on the fall-through path.
    fn branch(
        &mut self,
        args: &[Operand],
        line: u32,
        taken: impl Fn(i64, i64) -> bool,
    ) -> Result<Flow, ExecError> {
        let target = self.target(&args[2], line)?;
        let a = self.read(&args[0], line)?;
        let b = self.read(&args[1], line)?;
        Ok(if taken(a, b) { Flow::Enter(target) } else { Flow::Next })
    }

    /// Resolves a control-transfer operand to an existing label.
    fn target(&self, operand: &Operand, line: u32) -> Result<Sym, ExecError> {
        if let Operand::Word(sym) = operand {
            if self.program.has_label(*sym) {
                return Ok(*sym);
            }
        }
        Err(ExecError::UndefinedLabel {
            label: self.describe(operand),
            line,
        })
    }

    // ==================== Operand resolution ====================

    /// Reads an operand as a value. Bare integers are immediates here;
    /// everything else reads through registers or memory.
    pub(super) fn read(&self, operand: &Operand, line: u32) -> Result<i64, ExecError> {
        match operand {
            Operand::Word(reg) => Ok(self.registers.get(*reg)),
            Operand::Int(value) => Ok(*value),
            Operand::PointerInt(address) => Ok(self.memory.get(*address)),
            Operand::PointerWord(reg) => Ok(self.memory.get(self.registers.get(*reg))),
            Operand::Str(_) | Operand::Symbol(_) => Err(ExecError::UnaddressableOperand {
                kind: operand.kind_name(),
                line,
            }),
        }
    }

    /// Reads an operand as the current value of the location it names.
    /// Identical to [`Process::read`] except that a bare integer reads the
    /// memory cell it addresses, which is what makes in-place updates like
    /// `add 5, 1` act on cell 5 rather than on the number 5.
    fn read_cell(&self, operand: &Operand, line: u32) -> Result<i64, ExecError> {
        match operand {
            Operand::Int(address) => Ok(self.memory.get(*address)),
            other => self.read(other, line),
        }
    }

    /// Writes a value to the location an operand names.
    fn write(&mut self, operand: &Operand, value: i64, line: u32) -> Result<(), ExecError> {
        match operand {
            Operand::Word(reg) => self.registers.set(*reg, value),
            Operand::Int(address) | Operand::PointerInt(address) => {
                self.memory.set(*address, value)
            }
            Operand::PointerWord(reg) => {
                let address = self.registers.get(*reg);
                self.memory.set(address, value);
            }
            Operand::Str(_) | Operand::Symbol(_) => {
                return Err(ExecError::UnaddressableOperand {
                    kind: operand.kind_name(),
                    line,
                })
            }
        }
        Ok(())
    }

    /// Renders an operand for fault messages.
    fn describe(&self, operand: &Operand) -> String {
        match operand {
            Operand::Word(sym) => self.program.symbols().name(*sym).to_string(),
            Operand::Int(value) => value.to_string(),
            Operand::Str(text) => format!("\"{}\"", text),
            Operand::PointerWord(sym) => format!("[{}]", self.program.symbols().name(*sym)),
            Operand::PointerInt(address) => format!("[{}]", address),
            Operand::Symbol(c) => c.to_string(),
        }
    }
}

/// Division rounding toward negative infinity.
fn div_floor(a: i64, b: i64) -> i64 {
    let quotient = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && (a < 0) != (b < 0) {
        quotient.wrapping_sub(1)
    } else {
        quotient
    }
}

/// Remainder matching floored division: the result takes the divisor's
/// sign, so `mod` with a positive divisor is always non-negative.
fn mod_floor(a: i64, b: i64) -> i64 {
    let remainder = a.wrapping_rem(b);
    if remainder != 0 && (remainder < 0) != (b < 0) {
        remainder.wrapping_add(b)
    } else {
        remainder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::tests::TestConsole;

    fn load(source: &str) -> Process {
        let program = Program::parse(source).expect("parse failed");
        Process::spawn(program, Vec::new())
    }

    fn run(source: &str) -> Process {
        let mut process = load(source);
        let mut fs = MemoryFs::new();
        let mut console = TestConsole::new();
        let status = process.run(&mut fs, &mut console);
        assert!(
            matches!(status, ExitStatus::Exited(_)),
            "unexpected fault: {:?}",
            status
        );
        process
    }

    fn run_code(source: &str) -> i64 {
        let mut process = load(source);
        let mut fs = MemoryFs::new();
        let mut console = TestConsole::new();
        process.run(&mut fs, &mut console).code()
    }

    fn run_fault(source: &str) -> ExecError {
        let mut process = load(source);
        let mut fs = MemoryFs::new();
        let mut console = TestConsole::new();
        match process.run(&mut fs, &mut console) {
            ExitStatus::Faulted(fault) => fault,
            status => panic!("expected a fault, got {:?}", status),
        }
    }

    fn register(process: &Process, name: &str) -> i64 {
        let sym = process
            .program
            .symbols()
            .lookup(name)
            .expect("register was never mentioned");
        process.register(sym)
    }

    // ==================== Data movement ====================

    #[test]
    fn mov_through_registers() {
        let process = run("main:\n    mov first, 7\n    mov second, first");
        assert_eq!(register(&process, "first"), 7);
        assert_eq!(register(&process, "second"), 7);
    }

    #[test]
    fn unset_registers_and_cells_read_zero() {
        let process = run("main:\n    mov a, never_set\n    mov b, [99]");
        assert_eq!(register(&process, "a"), 0);
        assert_eq!(register(&process, "b"), 0);
    }

    #[test]
    fn bare_integer_destination_is_a_memory_cell() {
        let process = run("main:\n    mov 5, 3");
        assert_eq!(process.cell(5), 3);
    }

    #[test]
    fn bare_integer_source_is_immediate() {
        // Asymmetry: `mov a, 5` moves the number 5, not cell 5's content.
        let process = run("main:\n    mov 5, 3\n    mov a, 5");
        assert_eq!(register(&process, "a"), 5);
    }

    #[test]
    fn pointer_source_reads_memory() {
        let process = run("main:\n    mov 4, 9\n    mov a, [4]");
        assert_eq!(register(&process, "a"), 9);
    }

    #[test]
    fn pointer_through_register() {
        let process = run(
            "main:\n    mov eax, 6\n    mov [eax], 11\n    mov a, [eax]",
        );
        assert_eq!(process.cell(6), 11);
        assert_eq!(register(&process, "a"), 11);
    }

    #[test]
    fn negative_addresses_work() {
        let process = run("main:\n    mov eax, 0\n    dec eax\n    mov [eax], 4\n    mov a, [eax]");
        assert_eq!(process.cell(-1), 4);
        assert_eq!(register(&process, "a"), 4);
    }

    // ==================== str ====================

    #[test]
    fn str_writes_nul_terminated_text() {
        let process = run("main:\n    str 3, \"ab\", 'c', 10");
        assert_eq!(process.cell(3), 'a' as i64);
        assert_eq!(process.cell(4), 'b' as i64);
        assert_eq!(process.cell(5), 'c' as i64);
        assert_eq!(process.cell(6), 10);
        assert_eq!(process.cell(7), 0);
    }

    #[test]
    fn str_address_comes_from_the_value_of_dst() {
        // The destination is read like a source: a register's value is the
        // address, not the register itself.
        let process = run("main:\n    mov eax, 20\n    str eax, \"x\"");
        assert_eq!(process.cell(20), 'x' as i64);
        assert_eq!(process.cell(21), 0);
        assert_eq!(register(&process, "eax"), 20);
    }

    #[test]
    fn str_parts_may_come_from_registers() {
        let process = run("main:\n    mov eax, 65\n    str 0, eax, [1]");
        assert_eq!(process.cell(0), 65);
        // Cell 1 reads 0, ending the string there.
        assert_eq!(process.cell(1), 0);
    }

    // ==================== Arithmetic ====================

    #[test]
    fn add_updates_a_register_in_place() {
        let process = run("main:\n    mov eax, 3\n    add eax, 4");
        assert_eq!(register(&process, "eax"), 7);
    }

    #[test]
    fn add_updates_a_memory_cell_in_place() {
        // In-place destinations read the cell a bare integer names.
        let process = run("main:\n    mov 5, 3\n    add 5, 4");
        assert_eq!(process.cell(5), 7);
    }

    #[test]
    fn sub_and_mul() {
        let process = run("main:\n    mov a, 10\n    sub a, 4\n    mov b, 3\n    mul b, 5");
        assert_eq!(register(&process, "a"), 6);
        assert_eq!(register(&process, "b"), 15);
    }

    #[test]
    fn div_floors_toward_negative_infinity() {
        let process = run(
            "main:\n    mov a, 7\n    div a, 2\n    mov b, 0\n    sub b, 7\n    div b, 2",
        );
        assert_eq!(register(&process, "a"), 3);
        assert_eq!(register(&process, "b"), -4);
    }

    #[test]
    fn mod_result_takes_the_divisor_sign() {
        let process = run(
            "main:\n    mov a, 0\n    sub a, 7\n    mod a, 2\n\
             \n    mov b, 7\n    mov negative, 0\n    sub negative, 2\n    mod b, negative",
        );
        assert_eq!(register(&process, "a"), 1);
        assert_eq!(register(&process, "b"), -1);
    }

    #[test]
    fn division_by_zero_faults() {
        assert!(matches!(
            run_fault("main:\n    div eax, 0"),
            ExecError::DivisionByZero { line: 1 }
        ));
        assert!(matches!(
            run_fault("main:\n    mod eax, zero"),
            ExecError::DivisionByZero { line: 1 }
        ));
    }

    #[test]
    fn bitwise_operations() {
        let process = run(
            "main:\n    mov a, 12\n    or a, 3\n    mov b, 12\n    and b, 10\n\
             \n    mov c, 12\n    xor c, 10\n    not d",
        );
        assert_eq!(register(&process, "a"), 15);
        assert_eq!(register(&process, "b"), 8);
        assert_eq!(register(&process, "c"), 6);
        assert_eq!(register(&process, "d"), -1);
    }

    #[test]
    fn inc_and_dec() {
        let process = run("main:\n    inc a\n    inc a\n    dec b");
        assert_eq!(register(&process, "a"), 2);
        assert_eq!(register(&process, "b"), -1);
    }

    #[test]
    fn arithmetic_wraps() {
        let process = run(&format!("main:\n    mov a, {}\n    inc a", i64::MAX));
        assert_eq!(register(&process, "a"), i64::MIN);
    }

    // ==================== Control flow ====================

    #[test]
    fn jmp_never_returns() {
        let process = run(
            "main:\n    mov a, 1\n    jmp over\n    mov a, 2\nover:\n    mov b, 5",
        );
        assert_eq!(register(&process, "a"), 1);
        assert_eq!(register(&process, "b"), 5);
    }

    #[test]
    fn call_resumes_after_the_call_site() {
        let process = run("main:\n    call helper\n    mov b, 2\nhelper:\n    mov a, 1");
        assert_eq!(register(&process, "a"), 1);
        assert_eq!(register(&process, "b"), 2);
    }

    #[test]
    fn blocks_never_fall_through_to_the_next_label() {
        let process = run("main:\n    mov a, 1\nafter:\n    mov a, 99");
        assert_eq!(register(&process, "a"), 1);
    }

    #[test]
    fn je_taken_and_not_taken() {
        let process = run(
            "main:\n    je 1, 1, set\nset:\n    mov a, 1",
        );
        assert_eq!(register(&process, "a"), 1);

        let process = run(
            "main:\n    je 1, 2, set\n    mov b, 3\nset:\n    mov a, 1",
        );
        assert_eq!(register(&process, "a"), 0);
        assert_eq!(register(&process, "b"), 3);
    }

    #[test]
    fn jg_and_jl_compare_signed_values() {
        let process = run(
            "main:\n    mov low, 0\n    sub low, 5\n    jl low, 0, was_less\nwas_less:\n    mov a, 1",
        );
        assert_eq!(register(&process, "a"), 1);

        let process = run("main:\n    jg 3, 2, bigger\nbigger:\n    mov a, 1");
        assert_eq!(register(&process, "a"), 1);
    }

    #[test]
    fn branch_target_is_validated_even_when_not_taken() {
        let fault = run_fault("main:\n    je 1, 2, nowhere");
        assert!(matches!(
            fault,
            ExecError::UndefinedLabel { line: 1, .. }
        ));
    }

    #[test]
    fn undefined_label_faults_at_the_originating_line() {
        let fault = run_fault("main:\n    mov eax, 1\n    jmp nowhere");
        match fault {
            ExecError::UndefinedLabel { label, line } => {
                assert_eq!(label, "nowhere");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected fault: {:?}", other),
        }
    }

    #[test]
    fn transfer_target_must_be_a_word() {
        assert!(matches!(
            run_fault("main:\n    jmp 5"),
            ExecError::UndefinedLabel { line: 1, .. }
        ));
    }

    #[test]
    fn call_depth_is_capped() {
        let fault = run_fault("main:\n    call main");
        assert!(matches!(fault, ExecError::CallDepthExceeded { line: 1 }));
    }

    #[test]
    fn falling_off_main_exits_zero() {
        assert_eq!(run_code("main:\n    mov a, 1"), 0);
    }

    #[test]
    fn missing_main_exits_minus_one() {
        assert_eq!(run_code("other:\n    mov a, 1"), NO_MAIN_EXIT_CODE);
        assert_eq!(run_code(""), NO_MAIN_EXIT_CODE);
    }

    // ==================== Stepping ====================

    fn step_sequence(source: &str) -> Vec<Step> {
        let mut process = load(source);
        let mut fs = MemoryFs::new();
        let mut console = TestConsole::new();
        let mut steps = Vec::new();
        loop {
            let step = process.step(&mut fs, &mut console).expect("unexpected fault");
            steps.push(step);
            if matches!(step, Step::Exited(_)) {
                return steps;
            }
        }
    }

    #[test]
    fn each_block_entry_yields_once() {
        let steps = step_sequence("main:\n    jmp a\na:\n    jmp b\nb:\n    mov x, 1");
        assert_eq!(steps, vec![Step::Running, Step::Running, Step::Exited(0)]);
    }

    #[test]
    fn returning_from_a_call_does_not_yield() {
        // One yield entering `helper`; the resumed `main` runs to its end
        // within the same step.
        let steps = step_sequence("main:\n    call helper\n    mov b, 2\nhelper:\n    mov a, 1");
        assert_eq!(steps, vec![Step::Running, Step::Exited(0)]);
    }

    #[test]
    fn stepping_a_finished_process_repeats_the_exit() {
        let mut process = load("main:\n    mov eax, 9\n    syscall 0");
        let mut fs = MemoryFs::new();
        let mut console = TestConsole::new();
        assert_eq!(process.step(&mut fs, &mut console).ok(), Some(Step::Exited(9)));
        assert_eq!(process.step(&mut fs, &mut console).ok(), Some(Step::Exited(9)));
    }

    // ==================== Faults ====================

    #[test]
    fn unknown_mnemonic_faults_only_when_reached() {
        let fault = run_fault("main:\n    frobnicate eax");
        match fault {
            ExecError::UnknownMnemonic { mnemonic, line } => {
                assert_eq!(mnemonic, "frobnicate");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected fault: {:?}", other),
        }

        // The same junk in a block nobody enters is harmless.
        assert_eq!(run_code("main:\n    mov a, 1\njunk:\n    frobnicate eax"), 0);
    }

    #[test]
    fn non_word_mnemonic_faults() {
        assert!(matches!(
            run_fault("main:\n    5 eax"),
            ExecError::ExpectedMnemonic { found: "integer", line: 1 }
        ));
    }

    #[test]
    fn arity_mismatch_faults() {
        let fault = run_fault("main:\n    mov eax");
        match fault {
            ExecError::ArityMismatch { mnemonic, expected, got, line } => {
                assert_eq!(mnemonic, "mov");
                assert_eq!(expected, "2");
                assert_eq!(got, 1);
                assert_eq!(line, 1);
            }
            other => panic!("unexpected fault: {:?}", other),
        }
        assert!(matches!(
            run_fault("main:\n    str 0"),
            ExecError::ArityMismatch { line: 1, .. }
        ));
    }

    #[test]
    fn string_literals_are_not_addressable() {
        assert!(matches!(
            run_fault("main:\n    mov eax, \"hi\""),
            ExecError::UnaddressableOperand { kind: "string literal", line: 1 }
        ));
        assert!(matches!(
            run_fault("main:\n    mov \"hi\", 5"),
            ExecError::UnaddressableOperand { kind: "string literal", line: 1 }
        ));
    }

    #[test]
    fn stray_symbols_are_not_addressable() {
        assert!(matches!(
            run_fault("main:\n    mov eax, +"),
            ExecError::UnaddressableOperand { kind: "symbol", line: 1 }
        ));
    }

    #[test]
    fn fault_exit_codes_are_the_negated_line() {
        let mut process = load("main:\n    mov eax, 1\n    div eax, 0");
        let mut fs = MemoryFs::new();
        let mut console = TestConsole::new();
        let status = process.run(&mut fs, &mut console);
        assert!(matches!(status, ExitStatus::Faulted(_)));
        assert_eq!(status.code(), -2);
    }

    #[test]
    fn faults_are_terminal() {
        let mut process = load("main:\n    div eax, 0");
        let mut fs = MemoryFs::new();
        let mut console = TestConsole::new();
        assert!(process.step(&mut fs, &mut console).is_err());
        // The fault's code is sticky.
        assert_eq!(process.step(&mut fs, &mut console).ok(), Some(Step::Exited(-1)));
    }

    // ==================== Division helpers ====================

    #[test]
    fn div_floor_cases() {
        assert_eq!(div_floor(7, 2), 3);
        assert_eq!(div_floor(-7, 2), -4);
        assert_eq!(div_floor(7, -2), -4);
        assert_eq!(div_floor(-7, -2), 3);
        assert_eq!(div_floor(6, 3), 2);
        assert_eq!(div_floor(-6, 3), -2);
        assert_eq!(div_floor(i64::MIN, -1), i64::MIN); // wraps, no panic
    }

    #[test]
    fn mod_floor_cases() {
        assert_eq!(mod_floor(7, 2), 1);
        assert_eq!(mod_floor(-7, 2), 1);
        assert_eq!(mod_floor(7, -2), -1);
        assert_eq!(mod_floor(-7, -2), -1);
        assert_eq!(mod_floor(6, 3), 0);
        assert_eq!(mod_floor(i64::MIN, -1), 0);
    }
}
