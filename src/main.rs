// SPDX-License-Identifier: MIT
//
// kview — a small terminal text viewer.
//
// The binary wires the two crates together:
//
//   kv-term   → raw mode, window size, key decoding, output buffering
//   kv-editor → rows, cursor, scrolling, frame composition
//
// Each keypress flows through one turn of the loop in `view`:
//
//   refresh → scroll → render_frame → one write to stdout
//   stdin → KeyReader → Key → Editor::process_key → Action
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← rows - 2 (View)
//   ├──────────────────────────────┤
//   │ status bar (INVERSE)         │  ← 1 row
//   ├──────────────────────────────┤
//   │ message bar                  │  ← 1 row
//   └──────────────────────────────┘

mod error;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use kv_editor::editor::{Action, Editor, HELP_MESSAGE};
use kv_editor::options::Options;
use kv_editor::screen;
use kv_term::ansi;
use kv_term::input::{KeyReader, Stdin};
use kv_term::output::OutputBuffer;
use kv_term::terminal::{self, RawMode};

use crate::error::{Error, Result};

#[derive(Debug, Parser)]
#[command(name = "kview", version, about = "A small terminal text viewer")]
struct Args {
    /// File to view; an empty buffer is shown when omitted
    file: Option<PathBuf>,

    /// Render columns per tab stop (1 to 64)
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u16).range(1..=64))]
    tab_stop: u16,

    /// Seconds the status message stays visible
    #[arg(long, default_value_t = 5)]
    message_timeout: u64,

    /// Write a debug log to this file
    #[arg(long, env = "KVIEW_LOG")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn options(&self) -> Options {
        Options::default()
            .with_tab_stop(usize::from(self.tab_stop))
            .with_message_timeout(Duration::from_secs(self.message_timeout))
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Install a file logger. The terminal is the UI, so there is no stderr
/// logging; without a path nothing is installed.
fn init_logging(path: Option<&PathBuf>) {
    let Some(path) = path else {
        return;
    };

    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    match File::create(path) {
        Ok(file) => {
            let _ = WriteLogger::init(LevelFilter::Debug, config, file);
        }
        Err(e) => eprintln!("kview: {}: {e}", path.display()),
    }
}

// ─── Session ────────────────────────────────────────────────────────────────

/// Enter raw mode, run the viewer, and leave raw mode on every path out.
///
/// The terminal is cleared before the session drops, both on quit and on
/// error, so the shell prompt comes back on a clean screen.
fn run(args: &Args) -> Result<()> {
    session(RawMode::enter, &mut io::stdout(), || view(args))
}

/// Clear-and-restore wrapper around `body`, with the raw-mode entry and
/// the terminal passed in.
///
/// Every way out, including a failed `enter`, clears the screen first.
fn session(
    enter: impl FnOnce() -> io::Result<RawMode>,
    term: &mut impl Write,
    body: impl FnOnce() -> Result<()>,
) -> Result<()> {
    let mut raw = match enter() {
        Ok(raw) => raw,
        Err(e) => {
            let _ = clear_screen(term);
            return Err(Error::RawMode(e));
        }
    };

    let result = body();

    let _ = clear_screen(term);
    let left = raw.leave().map_err(Error::RawMode);
    result.and(left)
}

fn view(args: &Args) -> Result<()> {
    let mut stdout = io::stdout();
    let mut keys = KeyReader::new(Stdin);

    let window =
        terminal::window_size(&mut stdout, keys.source_mut()).map_err(Error::WindowSize)?;

    let mut editor = Editor::new(window, args.options());
    if let Some(path) = &args.file {
        editor.open(path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
    }
    editor.set_status_message(HELP_MESSAGE);

    let mut out = OutputBuffer::new();
    loop {
        screen::refresh(&mut editor, &mut out, &mut stdout, Instant::now())
            .map_err(Error::Output)?;

        let key = keys.next_key().map_err(Error::Read)?;
        if editor.process_key(key) == Action::Quit {
            log::info!("quit");
            return Ok(());
        }
    }
}

fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    ansi::clear_screen(w)?;
    ansi::cursor_home(w)?;
    w.flush()
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let args = Args::parse();
    init_logging(args.log_file.as_ref());

    log::info!("kview {} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        log::error!("{e}");
        eprintln!("kview: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_arguments() {
        let args = Args::try_parse_from(["kview"]).unwrap();
        assert_eq!(args.file, None);
        assert_eq!(args.tab_stop, 8);
        assert_eq!(args.message_timeout, 5);
        assert_eq!(args.options(), Options::default());
    }

    #[test]
    fn file_and_options() {
        let args = Args::try_parse_from([
            "kview",
            "--tab-stop",
            "4",
            "--message-timeout",
            "2",
            "notes.txt",
        ])
        .unwrap();
        assert_eq!(args.file, Some(PathBuf::from("notes.txt")));

        let opts = args.options();
        assert_eq!(opts.tab_stop, 4);
        assert_eq!(opts.message_timeout, Duration::from_secs(2));
    }

    #[test]
    fn tab_stop_outside_range_is_rejected() {
        for bad in ["0", "65", "1099511627776"] {
            assert!(
                Args::try_parse_from(["kview", "--tab-stop", bad]).is_err(),
                "accepted --tab-stop {bad}"
            );
        }
        let args = Args::try_parse_from(["kview", "--tab-stop", "64"]).unwrap();
        assert_eq!(args.options().tab_stop, kv_editor::row::MAX_TAB_STOP);
    }

    #[test]
    fn failed_raw_mode_still_clears_screen() {
        let mut term = Vec::new();
        let mut ran = false;

        let err = session(
            || Err(io::Error::other("not a tty")),
            &mut term,
            || {
                ran = true;
                Ok(())
            },
        )
        .unwrap_err();

        assert!(matches!(err, Error::RawMode(_)));
        assert!(!ran);
        assert_eq!(term, b"\x1b[2J\x1b[H");
    }

    #[test]
    fn rejects_non_numeric_tab_stop() {
        assert!(Args::try_parse_from(["kview", "--tab-stop", "wide"]).is_err());
    }

    #[test]
    fn clear_screen_homes_the_cursor() {
        let mut buf = Vec::new();
        clear_screen(&mut buf).unwrap();
        assert_eq!(buf, b"\x1b[2J\x1b[H");
    }
}
