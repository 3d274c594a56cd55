use std::io::{self, BufRead, StdinLock, Write};

/// Supplies one line of text per request. Blocks until a line is available.
pub trait Input {
    /// Returns `None` once the input is closed
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// The interactive surface, plus a separate stream for diagnostics
pub trait Output {
    /// Writes a full line
    fn line(&mut self, text: &str);
    /// Writes text the user answers on the same line
    fn prompt(&mut self, text: &str);
    /// Writes to the diagnostic stream
    fn error(&mut self, text: &str);
}

/// Reads lines from the process' standard input
pub struct StdinInput {
    stdin: StdinLock<'static>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin().lock(),
        }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Input for StdinInput {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();

        if self.stdin.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);

        Ok(Some(line))
    }
}

/// Writes to standard output, and errors to standard error
pub struct StdoutOutput;

impl Output for StdoutOutput {
    fn line(&mut self, text: &str) {
        println!("{}", text);
    }

    fn prompt(&mut self, text: &str) {
        print!("{}", text);
        let _ = io::stdout().flush();
    }

    fn error(&mut self, text: &str) {
        eprintln!("{}", text);
    }
}
