use microshell_derive::Error;

/// Faults raised while loading or executing a binary.
///
/// Every fault is terminal for its process and carries the 0-based source
/// line it is tied to; hosts report it as the negated line number.
#[derive(Debug, Error)]
pub enum ExecError {
    /// String literal with no closing quote before the end of the line.
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: u32 },
    /// Character literal cut off by the end of the line.
    #[error("line {line}: unterminated character literal")]
    UnterminatedChar { line: u32 },
    /// Pointer operand with no closing `]`.
    #[error("line {line}: missing closing `]`")]
    UnclosedPointer { line: u32 },
    /// Non-empty line before the first label.
    #[error("line {line}: instruction before any label")]
    InstructionBeforeLabel { line: u32 },
    /// Instruction whose first token is not a word.
    #[error("line {line}: expected a mnemonic, got a {found}")]
    ExpectedMnemonic { found: &'static str, line: u32 },
    /// Word mnemonic that names no operation.
    #[error("line {line}: unknown mnemonic `{mnemonic}`")]
    UnknownMnemonic { mnemonic: String, line: u32 },
    /// Wrong operand count for a mnemonic.
    #[error("line {line}: `{mnemonic}` expects {expected} operands, got {got}")]
    ArityMismatch {
        mnemonic: &'static str,
        expected: &'static str,
        got: usize,
        line: u32,
    },
    /// String literal or stray symbol used where a value or location is
    /// required.
    #[error("line {line}: {kind} operand is not addressable")]
    UnaddressableOperand { kind: &'static str, line: u32 },
    /// Control transfer to a label that does not exist.
    #[error("line {line}: undefined label `{label}`")]
    UndefinedLabel { label: String, line: u32 },
    /// Call nesting exceeded the frame stack limit.
    #[error("line {line}: call depth limit exceeded")]
    CallDepthExceeded { line: u32 },
    /// Division or modulo by zero.
    #[error("line {line}: division by zero")]
    DivisionByZero { line: u32 },
    /// Syscall number outside the fixed table.
    #[error("line {line}: unknown syscall {number}")]
    UnknownSyscall { number: i64, line: u32 },
    /// Iteration syscall against a handle id that was never issued.
    #[error("line {line}: unknown iteration handle {handle}")]
    UnknownHandle { handle: i64, line: u32 },
}

impl ExecError {
    /// The 0-based source line the fault is tied to.
    pub fn line(&self) -> u32 {
        match self {
            Self::UnterminatedString { line }
            | Self::UnterminatedChar { line }
            | Self::UnclosedPointer { line }
            | Self::InstructionBeforeLabel { line }
            | Self::ExpectedMnemonic { line, .. }
            | Self::UnknownMnemonic { line, .. }
            | Self::ArityMismatch { line, .. }
            | Self::UnaddressableOperand { line, .. }
            | Self::UndefinedLabel { line, .. }
            | Self::CallDepthExceeded { line }
            | Self::DivisionByZero { line }
            | Self::UnknownSyscall { line, .. }
            | Self::UnknownHandle { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_line() {
        let fault = ExecError::UnknownMnemonic {
            mnemonic: "frobnicate".to_string(),
            line: 4,
        };
        assert_eq!(format!("{}", fault), "line 4: unknown mnemonic `frobnicate`");
        assert_eq!(fault.line(), 4);
    }

    #[test]
    fn arity_message_names_the_mnemonic() {
        let fault = ExecError::ArityMismatch {
            mnemonic: "mov",
            expected: "2",
            got: 1,
            line: 0,
        };
        assert_eq!(format!("{}", fault), "line 0: `mov` expects 2 operands, got 1");
    }

    #[test]
    fn every_variant_reports_its_line() {
        let faults = [
            ExecError::UnterminatedString { line: 1 },
            ExecError::UnterminatedChar { line: 2 },
            ExecError::UnclosedPointer { line: 3 },
            ExecError::InstructionBeforeLabel { line: 4 },
            ExecError::DivisionByZero { line: 5 },
            ExecError::CallDepthExceeded { line: 6 },
        ];
        for (index, fault) in faults.iter().enumerate() {
            assert_eq!(fault.line() as usize, index + 1);
        }
    }
}
