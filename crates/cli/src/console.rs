//! Line-oriented terminal I/O shared by every screen.
//!
//! Screens write with [`Console::line`] and read with the `prompt*` helpers. End of input
//! surfaces as `None` so a screen can leave cleanly when stdin closes or a scripted test runs
//! out of lines.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// Transient notification shown after an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toast {
    Success,
    Info,
    Error,
}

impl Toast {
    fn tag(self) -> &'static str {
        match self {
            Toast::Success => "[ok]",
            Toast::Info => "[info]",
            Toast::Error => "[error]",
        }
    }
}

pub struct Console {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl Console {
    pub fn new(input: impl BufRead + 'static, output: impl Write + 'static) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }

    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.output)
    }

    pub fn notify(&mut self, kind: Toast, message: impl Display) -> io::Result<()> {
        writeln!(self.output, "{} {message}", kind.tag())
    }

    /// Prints `label`, then reads one line without its line ending.
    pub fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        let trimmed = buf.trim_end_matches(['\r', '\n']).len();
        buf.truncate(trimmed);
        Ok(Some(buf))
    }

    /// Prompts with the current value in brackets. Enter keeps it and `-` clears it.
    pub fn prompt_field(&mut self, label: &str, current: &str) -> io::Result<Option<String>> {
        let shown = if current.is_empty() {
            format!("{label}: ")
        } else {
            format!("{label} [{current}]: ")
        };
        Ok(self.prompt(&shown)?.map(|typed| match typed.trim() {
            "" => current.to_string(),
            "-" => String::new(),
            other => other.to_string(),
        }))
    }

    /// Yes/no question; anything but `y`/`yes` counts as no.
    pub fn confirm(&mut self, question: &str) -> io::Result<Option<bool>> {
        Ok(self
            .prompt(&format!("{question} [y/N] "))?
            .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")))
    }
}
