//! Lersp shell
//!
//! [`Session`] drives one runtime from text that arrives in pieces: lines
//! from a line editor, or a whole file at once. It prints each result as
//! `;=> value`, reports recoverable errors and keeps going, and hands fatal
//! ones back to the caller.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use lersp::{Config, ErrorKind, Runtime, Value};
use log::{debug, info};

pub const PROMPT: &str = "#=> ";
pub const CONTINUATION_PROMPT: &str = "... ";
pub const RESULT_PREFIX: &str = ";=> ";

pub const USAGE: &str = "\
usage: lersp [--heap-cells N] [--max-symbols N] [--max-token-length N] [FILE]

Without FILE, starts an interactive session.

options:
  --heap-cells N        number of cells in the heap
  --max-symbols N       maximum number of distinct symbols
  --max-token-length N  symbols longer than this are truncated
  -h, --help            print this message";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ShellError {
    Io(io::Error),
    /// The runtime cannot continue
    Fatal(lersp::Error),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Io(e) => write!(f, "I/O error: {e}"),
            ShellError::Fatal(e) => write!(f, "fatal: {e}"),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::Io(e) => Some(e),
            ShellError::Fatal(e) => Some(e),
        }
    }
}

impl From<io::Error> for ShellError {
    fn from(e: io::Error) -> Self {
        ShellError::Io(e)
    }
}

impl From<lersp::Error> for ShellError {
    fn from(e: lersp::Error) -> Self {
        ShellError::Fatal(e)
    }
}

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Repl(Config),
    File(Config, PathBuf),
    Help,
}

/// Parse arguments, program name excluded.
pub fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut config = Config::default();
    let mut file = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--heap-cells" => config = config.with_heap_cells(number_arg(&arg, args.next())?),
            "--max-symbols" => config = config.with_max_symbols(number_arg(&arg, args.next())?),
            "--max-token-length" => {
                config = config.with_max_token_length(number_arg(&arg, args.next())?)
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("unknown option: {flag}"));
            }
            _ if file.is_some() => return Err(format!("unexpected argument: {arg}")),
            _ => file = Some(PathBuf::from(&arg)),
        }
    }

    Ok(match file {
        Some(path) => Command::File(config, path),
        None => Command::Repl(config),
    })
}

fn number_arg(flag: &str, value: Option<String>) -> Result<usize, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a value"))?;
    match value.parse() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("{flag}: expected a positive number, got {value}")),
    }
}

// ============================================================================
// Session
// ============================================================================

/// Outcome of feeding text to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fed {
    /// Every complete form was evaluated; nothing is buffered.
    Ready,
    /// The text ended inside a form, which stays buffered.
    NeedMore,
}

pub struct Session {
    runtime: Runtime,
    pending: String,
    failures: usize,
}

impl Session {
    pub fn new(config: Config) -> Result<Self, ShellError> {
        let session = Session {
            runtime: Runtime::new(config)?,
            pending: String::new(),
            failures: 0,
        };
        let heap = session.runtime.heap();
        debug!(
            "session ready: {} of {} cells in use, {:?}",
            heap.live_count(),
            heap.capacity(),
            session.runtime.config()
        );
        Ok(session)
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Whether an incomplete form is buffered.
    pub fn is_pending(&self) -> bool {
        !self.pending.trim().is_empty()
    }

    pub fn prompt(&self) -> &'static str {
        if self.is_pending() { CONTINUATION_PROMPT } else { PROMPT }
    }

    /// Forms that failed with a recoverable error so far.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Drop a buffered incomplete form.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }

    /// Append `text` to the buffer and evaluate every complete form in it,
    /// printing each result to `out` and each recoverable error to `err`.
    ///
    /// A syntax error discards the rest of the buffer.
    pub fn feed<O, E>(
        &mut self,
        text: &str,
        out: &mut O,
        err: &mut E,
    ) -> Result<Fed, ShellError>
    where
        O: Write,
        E: Write,
    {
        let source = std::mem::take(&mut self.pending) + text;
        let mut reader = self.runtime.reader(&source);
        let mut consumed = 0;

        loop {
            match reader.read_one(&mut self.runtime) {
                Ok(Some(form)) => {
                    consumed = reader.offset();
                    if let Some(value) = self.evaluate(form, err)? {
                        writeln!(out, "{RESULT_PREFIX}{}", self.runtime.display(value))?;
                    }
                }
                Ok(None) => return Ok(Fed::Ready),
                Err(e) if e.kind == ErrorKind::UnexpectedEnd => {
                    self.pending = source.chars().skip(consumed).collect();
                    debug!("incomplete form, {} chars buffered", self.pending.len());
                    return Ok(Fed::NeedMore);
                }
                Err(e) => {
                    self.report(e, err)?;
                    return Ok(Fed::Ready);
                }
            }
        }
    }

    /// Evaluate every form of `source`, returning the printed value of the
    /// last one that succeeded. Errors are reported and skipped; a form that
    /// fails to read is skipped whole.
    pub fn run_source<E: Write>(
        &mut self,
        source: &str,
        err: &mut E,
    ) -> Result<Option<String>, ShellError> {
        let mut reader = self.runtime.reader(source);
        let mut last = None;

        loop {
            match reader.read_one(&mut self.runtime) {
                Ok(Some(form)) => {
                    // Rendered now: the value is unrooted once the next form runs
                    if let Some(value) = self.evaluate(form, err)? {
                        last = Some(self.runtime.display(value).to_string());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let at_end = e.kind == ErrorKind::UnexpectedEnd;
                    self.report(e, err)?;
                    if at_end {
                        break;
                    }
                }
            }
        }

        Ok(last)
    }

    fn evaluate<E: Write>(
        &mut self,
        form: Value,
        err: &mut E,
    ) -> Result<Option<Value>, ShellError> {
        match self.runtime.eval_global(form) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                self.report(e, err)?;
                Ok(None)
            }
        }
    }

    fn report<E: Write>(&mut self, e: lersp::Error, err: &mut E) -> Result<(), ShellError> {
        if e.is_fatal() {
            return Err(ShellError::Fatal(e));
        }
        self.failures += 1;
        writeln!(err, "error: {e}")?;
        Ok(())
    }
}

// ============================================================================
// File mode
// ============================================================================

/// Run a program file, printing the last result to `out`.
///
/// Returns the number of forms that failed.
pub fn run_file<O, E>(
    path: &Path,
    config: Config,
    out: &mut O,
    err: &mut E,
) -> Result<usize, ShellError>
where
    O: Write,
    E: Write,
{
    let source = fs::read_to_string(path)?;
    info!("running {}", path.display());

    let mut session = Session::new(config)?;
    if let Some(text) = session.run_source(&source, err)? {
        writeln!(out, "{RESULT_PREFIX}{text}")?;
    }
    Ok(session.failures())
}
