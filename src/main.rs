//! A toy shell over an in-memory disk.
//!
//! Boots a freshly seeded disk image and attaches a shell to stdin and
//! stdout. Binaries on the image are small text-assembly programs; typing
//! a name runs one to completion.
//!
//! # Usage
//! ```text
//! microshell [OPTIONS]
//! ```
//!
//! # Options
//! - `-c <line>`: run one command line and exit with its code
//! - `--no-timestamps`: omit timestamps from log lines

use microshell::console::StdoutConsole;
use microshell::shell::Shell;
use microshell::utils::log::SHOW_TIMESTAMP;
use microshell::{error, info};
use std::env;
use std::io::{self, BufRead};
use std::process;
use std::sync::atomic::Ordering;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut command: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("-c requires an argument");
                    process::exit(1);
                }
                command = Some(args[i].clone());
                i += 1;
            }
            "--no-timestamps" => {
                SHOW_TIMESTAMP.store(false, Ordering::Relaxed);
                i += 1;
            }
            other => {
                eprintln!("Unexpected argument: {}\n", other);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    let mut shell = Shell::with_default_image(StdoutConsole);

    if let Some(line) = command {
        let code = shell.execute(&line).unwrap_or(0);
        process::exit(host_exit_code(code));
    }

    info!("session started; leave with Ctrl+D");
    let stdin = io::stdin();
    loop {
        shell.show_prompt();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                shell.execute(&line);
            }
            Err(e) => {
                error!("stdin: {}", e);
                break;
            }
        }
    }
    info!("session ended");
}

/// Clamps an engine exit code into the host's range.
fn host_exit_code(code: i64) -> i32 {
    code.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

const USAGE: &str = "\
Microshell

USAGE:
    {program} [OPTIONS]

OPTIONS:
    -c, --command <line>    Run one command line and exit with its code
    --no-timestamps         Omit timestamps from log lines
    -h, --help              Print this help message

The shell boots a fresh in-memory disk image: /.bin holds the sample
binaries (echo, clear, cat, test) and /.path lists the directories
searched for commands. Type a binary's name to run it; binaries talk to
the shell through syscalls, so even `clear` and directory changes are
ordinary programs.

EXAMPLES:
    # Interactive session
    {program}

    # One-shot command
    {program} -c \"echo hello world\"

    # Pipe a script through the shell
    printf 'test\\necho done\\n' | {program}
";

fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}
