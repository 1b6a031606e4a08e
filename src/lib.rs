//! Microshell library.
//!
//! A toy shell whose commands are tiny text-assembly "binaries" executed
//! against an in-memory filesystem and a console device.

pub mod console;
pub mod engine;
pub mod fs;
pub mod shell;
pub mod utils;
