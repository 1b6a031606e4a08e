//! The interactive shell.
//!
//! A shell session owns one disk and one console. Each input line names a
//! binary to run: the command name is looked up in the directories listed
//! by the search-path file, the binary's source is read off the disk,
//! parsed, and run to completion with the rest of the line as argv.
//!
//! The shell itself has no built-in commands. Everything, even clearing
//! the screen and changing directory, is a binary talking through
//! syscalls.

use std::collections::HashMap;

use crate::console::Console;
use crate::engine::process::{ExitStatus, Process};
use crate::engine::program::Program;
use crate::fs::{MemoryFs, TYPE_FILE};
use crate::{error, info};

/// Search-path file: one directory per line, later lines win.
const PATH_FILE: &str = "/.path";

/// Binary directory seeded on the default image.
const BIN_DIR: &str = "/.bin";

/// Binaries shipped on the default image.
const IMAGE: &[(&str, &str)] = &[
    ("echo", include_str!("programs/echo.asm")),
    ("clear", include_str!("programs/clear.asm")),
    ("cat", include_str!("programs/cat.asm")),
    ("test", include_str!("programs/test.asm")),
];

/// A console-attached session over one filesystem.
pub struct Shell<C: Console> {
    fs: MemoryFs,
    console: C,
}

impl<C: Console> Shell<C> {
    /// Creates a shell over an existing disk.
    pub fn new(fs: MemoryFs, console: C) -> Shell<C> {
        Shell { fs, console }
    }

    /// Creates a shell over a freshly seeded image: [`BIN_DIR`] holding the
    /// sample binaries, and [`PATH_FILE`] pointing at it.
    pub fn with_default_image(console: C) -> Shell<C> {
        let mut fs = MemoryFs::new();
        fs.mkdir(BIN_DIR);
        for (name, source) in IMAGE {
            fs.write_file(&format!("{}/{}", BIN_DIR, name), source);
        }
        fs.write_file(PATH_FILE, &format!("{}\n", BIN_DIR));
        Shell::new(fs, console)
    }

    /// The prompt for the current directory, `/home/user> ` style.
    pub fn prompt(&self) -> String {
        format!("/{}> ", self.fs.cwd().join("/"))
    }

    /// Writes the prompt to the console.
    pub fn show_prompt(&mut self) {
        let prompt = self.prompt();
        self.console.write(&prompt);
    }

    /// Runs one command line to completion and returns its exit code.
    ///
    /// `None` means nothing ran: blank input, or a command name the search
    /// path does not know (which prints a message). The line splits on
    /// single spaces and everything after the command name becomes argv,
    /// empty fields included.
    pub fn execute(&mut self, input: &str) -> Option<i64> {
        let input = input.trim();
        let mut fields = input.split(' ');
        let name = fields.next().unwrap_or_default();
        if name.is_empty() {
            return None;
        }
        let argv: Vec<String> = fields.map(str::to_string).collect();

        let Some(path) = self.binaries().remove(name) else {
            self.console.write(&format!("Command \"{}\" not found.\n", name));
            return None;
        };
        Some(self.run_binary(&path, argv))
    }

    /// Loads, parses and runs one binary.
    fn run_binary(&mut self, path: &str, argv: Vec<String>) -> i64 {
        let Some(source) = self.fs.read_file(path) else {
            error!("cannot read binary at {}", path);
            return -1;
        };
        let status = match Program::parse(&source) {
            Ok(program) => {
                let mut process = Process::spawn(program, argv);
                process.run(&mut self.fs, &mut self.console)
            }
            Err(fault) => ExitStatus::Faulted(fault),
        };
        let code = status.code();
        match &status {
            ExitStatus::Faulted(fault) => error!("{} faulted: {}", path, fault),
            ExitStatus::Exited(0) => {}
            ExitStatus::Exited(code) => info!("{} exited with code {}", path, code),
        }
        code
    }

    /// Maps command names to binary paths by scanning the search path.
    ///
    /// Each listed directory contributes its extensionless files; a name
    /// appearing in several directories resolves to the last one.
    fn binaries(&self) -> HashMap<String, String> {
        let mut binaries = HashMap::new();
        let Some(path_file) = self.fs.read_file(PATH_FILE) else {
            return binaries;
        };
        for dir in path_file.lines() {
            let dir = dir.trim();
            if dir.is_empty() {
                continue;
            }
            let Some(names) = self.fs.read_dir(dir) else {
                continue;
            };
            for name in names {
                if name.contains('.') {
                    continue;
                }
                let full = format!("{}/{}", dir, name);
                if self.fs.file_type(&full) != TYPE_FILE {
                    continue;
                }
                binaries.insert(name, full);
            }
        }
        binaries
    }
}
