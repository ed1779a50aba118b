//! Line-based terminal prompts

use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Source of interactive answers
pub trait Prompter {
    /// Ask the user to pick one of `choices`; returns its index
    fn select(&mut self, message: &str, choices: &[String]) -> io::Result<usize>;

    /// Ask for free text; an empty answer yields `default` when given
    fn input(&mut self, message: &str, default: Option<&str>) -> io::Result<String>;

    /// Show a line of feedback
    fn message(&mut self, text: &str) -> io::Result<()>;
}

/// Numbered-menu prompter over any line reader and writer
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<StdinLock<'static>, Stdout> {
    /// Prompter bound to the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the writer, e.g. to inspect what was shown
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn select(&mut self, message: &str, choices: &[String]) -> io::Result<usize> {
        if choices.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no choices available for '{message}'"),
            ));
        }

        writeln!(self.output, "{message}")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {:>2}) {}", i + 1, choice)?;
        }

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let answer = self.read_line()?;
            match answer.trim().parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(
                    self.output,
                    "Please enter a number between 1 and {}.",
                    choices.len()
                )?,
            }
        }
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> io::Result<String> {
        match default {
            Some(d) => write!(self.output, "{message} ({d}): ")?,
            None => write!(self.output, "{message}: ")?,
        }
        self.output.flush()?;

        let answer = self.read_line()?;
        let answer = answer.trim();
        Ok(match default {
            Some(d) if answer.is_empty() => d.to_string(),
            _ => answer.to_string(),
        })
    }

    fn message(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }
}
