use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use lersp::Config;
use lersp_repl::{Command, Session, ShellError, USAGE, parse_args, run_file};
use log::warn;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Exit status when the runtime runs out of heap or symbol space.
const EXIT_FATAL: i32 = 2;

fn history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("lersp_history"))
}

fn repl(config: Config) -> Result<(), ShellError> {
    let mut session = Session::new(config)?;
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => return Err(ShellError::Io(io::Error::other(e))),
    };

    let history = history_path();
    if let Some(path) = &history {
        // No history yet on first run
        let _ = rl.load_history(path);
    }

    let stdout = io::stdout();
    let stderr = io::stderr();

    loop {
        match rl.readline(session.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                let text = line + "\n";
                session.feed(&text, &mut stdout.lock(), &mut stderr.lock())?;
            }
            Err(ReadlineError::Interrupted) => {
                session.discard_pending();
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                warn!("line editor failed: {e}");
                break;
            }
        }
    }

    if let Some(path) = &history
        && let Err(e) = rl.save_history(path)
    {
        warn!("could not save history to {}: {e}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let command = match parse_args(env::args().skip(1)) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("lersp: {msg}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let result = match command {
        Command::Help => {
            println!("{USAGE}");
            return;
        }
        Command::Repl(config) => repl(config).map(|()| 0),
        Command::File(config, path) => {
            run_file(&path, config, &mut io::stdout(), &mut io::stderr()).map(|failures| {
                if failures > 0 { 1 } else { 0 }
            })
        }
    };

    match result {
        Ok(status) => process::exit(status),
        Err(ShellError::Fatal(e)) => {
            eprintln!("lersp: fatal: {e}");
            process::exit(EXIT_FATAL);
        }
        Err(ShellError::Io(e)) => {
            eprintln!("lersp: {e}");
            process::exit(1);
        }
    }
}
