//! The syscall table, the only bridge between a running binary and the
//! host.
//!
//! The calling convention is uniform. Inputs are the *values* of `eax`,
//! `ebx` and `ecx`, with string inputs read from memory at the address a
//! register holds. Every output lands in memory at the address held in the
//! named register; no syscall ever writes a register. Flag outputs are 1
//! for success and 0 for failure, and handle outputs use 0 as the failure
//! sentinel, which real handle ids never collide with.

use crate::console::Console;
use crate::engine::errors::ExecError;
use crate::engine::operand::Operand;
use crate::engine::process::{Flow, Process};
use crate::engine::program::{Sym, EAX, EBX, ECX};
use crate::fs::MemoryFs;

/// Numbered host services.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Syscall {
    /// 0: terminate with the value of `eax` as exit code.
    Exit,
    /// 1: print the string at the address in `eax`.
    Print,
    /// 2: read the file named by `eax` into memory at the address in
    /// `ebx`; success flag to `[ecx]`. The content is written only on
    /// success.
    ReadFile,
    /// 3: write the string at `ebx` to the file named by `eax`; flag to
    /// `[ecx]`.
    WriteFile,
    /// 4: create the directory named by `eax`, ancestors included; flag to
    /// `[ebx]`.
    Mkdir,
    /// 5: remove the empty directory named by `eax`; flag to `[ebx]`.
    Rmdir,
    /// 6: remove the file named by `eax`; flag to `[ebx]`.
    RmFile,
    /// 7: existence flag for the path in `eax`, to `[ebx]`.
    Exists,
    /// 8: entry type for the path in `eax` (0 absent, 1 file, 2
    /// directory), to `[ebx]`.
    FileType,
    /// 9: last-edit timestamp of the path in `eax` (0 when absent), to
    /// `[eax]`.
    EditedAt,
    /// 10: creation timestamp of the path in `eax` (0 when absent), to
    /// `[eax]`.
    CreatedAt,
    /// 11: open a directory-listing handle over the path in `eax`; handle
    /// id (or 0) to `[eax]`.
    StartReaddir,
    /// 12: pop from the handle in `eax`: name to memory at the address in
    /// `ebx` and its length to `[ecx]`, or 0 to `[ebx]` once drained.
    IterReaddir,
    /// 13: open a handle over this process's argv; handle id to `[eax]`.
    StartArgv,
    /// 14: pop from the handle in `eax`: argument to the address in `ebx`
    /// and its length to `[ecx]`, or 0 to both `[ebx]` and `[ecx]` once
    /// drained.
    IterArgv,
    /// 15: change the current directory to the path in `eax` when it
    /// exists; flag to `[ebx]`.
    Chdir,
}

impl Syscall {
    /// Maps a syscall number to its service, if the table defines one.
    pub fn from_number(number: i64) -> Option<Syscall> {
        match number {
            0 => Some(Syscall::Exit),
            1 => Some(Syscall::Print),
            2 => Some(Syscall::ReadFile),
            3 => Some(Syscall::WriteFile),
            4 => Some(Syscall::Mkdir),
            5 => Some(Syscall::Rmdir),
            6 => Some(Syscall::RmFile),
            7 => Some(Syscall::Exists),
            8 => Some(Syscall::FileType),
            9 => Some(Syscall::EditedAt),
            10 => Some(Syscall::CreatedAt),
            11 => Some(Syscall::StartReaddir),
            12 => Some(Syscall::IterReaddir),
            13 => Some(Syscall::StartArgv),
            14 => Some(Syscall::IterArgv),
            15 => Some(Syscall::Chdir),
            _ => None,
        }
    }
}

impl Process {
    /// Executes one syscall instruction.
    pub(super) fn syscall(
        &mut self,
        number: &Operand,
        fs: &mut MemoryFs,
        console: &mut dyn Console,
        line: u32,
    ) -> Result<Flow, ExecError> {
        let number = self.read(number, line)?;
        let Some(service) = Syscall::from_number(number) else {
            return Err(ExecError::UnknownSyscall { number, line });
        };

        match service {
            Syscall::Exit => return Ok(Flow::Exit(self.registers.get(EAX))),
            Syscall::Print => {
                let text = self.input_string(EAX);
                console.write(&text);
            }
            Syscall::ReadFile => {
                let path = self.input_string(EAX);
                let content = fs.read_file(&path);
                if let Some(content) = &content {
                    self.memory.write_string(self.registers.get(EBX), content);
                }
                self.output(ECX, content.is_some() as i64);
            }
            Syscall::WriteFile => {
                let path = self.input_string(EAX);
                let content = self.input_string(EBX);
                let ok = fs.write_file(&path, &content);
                self.output(ECX, ok as i64);
            }
            Syscall::Mkdir => {
                let ok = fs.mkdir(&self.input_string(EAX));
                self.output(EBX, ok as i64);
            }
            Syscall::Rmdir => {
                let ok = fs.rmdir(&self.input_string(EAX));
                self.output(EBX, ok as i64);
            }
            Syscall::RmFile => {
                let ok = fs.rm_file(&self.input_string(EAX));
                self.output(EBX, ok as i64);
            }
            Syscall::Exists => {
                let exists = fs.exists(&self.input_string(EAX));
                self.output(EBX, exists as i64);
            }
            Syscall::FileType => {
                let kind = fs.file_type(&self.input_string(EAX));
                self.output(EBX, kind);
            }
            Syscall::EditedAt => {
                let stamp = fs.edited_at(&self.input_string(EAX)).unwrap_or(0);
                self.output(EAX, stamp);
            }
            Syscall::CreatedAt => {
                let stamp = fs.created_at(&self.input_string(EAX)).unwrap_or(0);
                self.output(EAX, stamp);
            }
            Syscall::StartReaddir => {
                let path = self.input_string(EAX);
                let handle = if fs.exists(&path) {
                    // Files get a handle too; their listing is just empty.
                    let entries = fs.read_dir(&path).unwrap_or_default();
                    self.dir_handles.open(entries)
                } else {
                    0
                };
                self.output(EAX, handle);
            }
            Syscall::IterReaddir => {
                let handle = self.registers.get(EAX);
                match self.dir_handles.pop(handle) {
                    None => return Err(ExecError::UnknownHandle { handle, line }),
                    Some(None) => self.output(EBX, 0),
                    Some(Some(name)) => {
                        let length = name.chars().count() as i64;
                        self.memory.write_string(self.registers.get(EBX), &name);
                        self.output(ECX, length);
                    }
                }
            }
            Syscall::StartArgv => {
                let handle = self.argv_handles.open(self.argv.clone());
                self.output(EAX, handle);
            }
            Syscall::IterArgv => {
                let handle = self.registers.get(EAX);
                match self.argv_handles.pop(handle) {
                    None => return Err(ExecError::UnknownHandle { handle, line }),
                    Some(None) => {
                        self.output(EBX, 0);
                        self.output(ECX, 0);
                    }
                    Some(Some(argument)) => {
                        let length = argument.chars().count() as i64;
                        self.memory.write_string(self.registers.get(EBX), &argument);
                        self.output(ECX, length);
                    }
                }
            }
            Syscall::Chdir => {
                let ok = fs.change_dir(&self.input_string(EAX));
                self.output(EBX, ok as i64);
            }
        }
        Ok(Flow::Next)
    }

    /// Reads the NUL-terminated string at the address held in `register`.
    fn input_string(&self, register: Sym) -> String {
        self.memory.read_string(self.registers.get(register))
    }

    /// Writes `value` into memory at the address held in `register`.
    fn output(&mut self, register: Sym, value: i64) {
        let address = self.registers.get(register);
        self.memory.set(address, value);
    }
}
