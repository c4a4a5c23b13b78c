//! Interactive input used while adding bulbs and composing scenes.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::net::Ipv4Addr;

/// Why the previous answer to a prompt was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    DuplicateBulbName(String),
    UnknownPreset(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::DuplicateBulbName(name) => {
                write!(f, "Bulb with this name already exists: {name}")
            }
            Rejection::UnknownPreset(name) => write!(f, "Invalid input: {name}"),
        }
    }
}

/// Source of user answers.
///
/// Answers are returned verbatim minus surrounding whitespace; an empty
/// answer means "skip". When `rejected` is set the same question is being
/// asked again.
pub trait Prompter {
    /// Name for the freshly discovered bulb at `ip`.
    fn bulb_name(&mut self, ip: Ipv4Addr, rejected: Option<&Rejection>) -> io::Result<String>;

    /// Preset to use for `bulb` in the scene being composed.
    fn preset_choice(
        &mut self,
        bulb: &str,
        presets: &[&str],
        rejected: Option<&Rejection>,
    ) -> io::Result<String>;
}

/// [`Prompter`] reading lines from a terminal.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        LinePrompter::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        LinePrompter { input, output }
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question}\n: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    fn report(&mut self, rejected: Option<&Rejection>) -> io::Result<()> {
        match rejected {
            Some(reason) => writeln!(self.output, "{reason}"),
            None => Ok(()),
        }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn bulb_name(&mut self, ip: Ipv4Addr, rejected: Option<&Rejection>) -> io::Result<String> {
        self.report(rejected)?;
        self.ask(&format!(
            "Bulb found at IP: {ip}\nEnter bulb name (press Enter to skip)"
        ))
    }

    fn preset_choice(
        &mut self,
        bulb: &str,
        presets: &[&str],
        rejected: Option<&Rejection>,
    ) -> io::Result<String> {
        self.report(rejected)?;
        self.ask(&format!(
            "{bulb}: choose a preset for the bulb. Press Enter to skip.\nPresets: {}",
            presets.join(", ")
        ))
    }
}
