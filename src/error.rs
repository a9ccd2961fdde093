// SPDX-License-Identifier: MIT
//
// Fatal errors.
//
// Every variant ends the program: `main` clears the screen, restores the
// terminal, prints the error, and exits with status 1. Malformed escape
// sequences never get here; the key decoder turns them into Escape.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Anything that stops the viewer.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or installing terminal attributes failed.
    #[error("raw mode: {0}")]
    RawMode(#[source] io::Error),

    /// The file named on the command line couldn't be loaded.
    #[error("{}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading stdin failed with something other than a timeout.
    #[error("read: {0}")]
    Read(#[source] io::Error),

    /// Neither `TIOCGWINSZ` nor the cursor probe produced a window size.
    #[error("window size: {0}")]
    WindowSize(#[source] io::Error),

    /// Writing a frame to the terminal failed.
    #[error("write: {0}")]
    Output(#[source] io::Error),
}

/// Result alias for the binary.
pub type Result<T, E = Error> = std::result::Result<T, E>;
