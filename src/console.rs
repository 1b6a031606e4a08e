//! The console device.
//!
//! Binaries print through the print syscall and the shell prints prompts
//! and messages through the same surface, so both land on one device. The
//! stream is plain text with one in-band control: [`CLEAR`] wipes the
//! display.

use std::io::Write;

/// Control character that clears the display.
pub const CLEAR: char = '\u{1}';

/// Output surface shared by the shell and every process it runs.
pub trait Console {
    /// Appends raw text to the display, interpreting [`CLEAR`].
    fn write(&mut self, text: &str);
}

/// Console backed by the real stdout. [`CLEAR`] becomes an ANSI erase plus
/// cursor home, and every write is flushed so prompts without a trailing
/// newline appear immediately.
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn write(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        for (index, part) in text.split(CLEAR).enumerate() {
            if index > 0 {
                let _ = write!(stdout, "\x1b[2J\x1b[H");
            }
            let _ = write!(stdout, "{}", part);
        }
        let _ = stdout.flush();
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Console double that records what the display would show.
    pub struct TestConsole {
        transcript: String,
    }

    impl TestConsole {
        pub fn new() -> TestConsole {
            TestConsole { transcript: String::new() }
        }

        /// Everything currently on the display.
        pub fn transcript(&self) -> &str {
            &self.transcript
        }
    }

    impl Console for TestConsole {
        fn write(&mut self, text: &str) {
            for c in text.chars() {
                if c == CLEAR {
                    self.transcript.clear();
                } else {
                    self.transcript.push(c);
                }
            }
        }
    }

    #[test]
    fn writes_accumulate() {
        let mut console = TestConsole::new();
        console.write("a");
        console.write("bc");
        assert_eq!(console.transcript(), "abc");
    }

    #[test]
    fn clear_resets_the_display() {
        let mut console = TestConsole::new();
        console.write("before");
        console.write(&format!("{}after", CLEAR));
        assert_eq!(console.transcript(), "after");
    }

    #[test]
    fn clear_mid_text_keeps_the_tail() {
        let mut console = TestConsole::new();
        console.write(&format!("gone{}kept", CLEAR));
        assert_eq!(console.transcript(), "kept");
    }
}
