//! Row buffer — the file as an ordered list of byte rows.
//!
//! Each [`Row`] keeps the line's raw bytes and a derived `render` form with
//! every tab expanded to spaces up to the next tab stop. Rendering and
//! horizontal scrolling work in render columns; the cursor works in raw
//! columns. [`Row::cx_to_rx`] converts between them.
//!
//! # Design choices
//!
//! - **Bytes, not chars.** Rows are `Vec<u8>` so any file can be viewed,
//!   valid UTF-8 or not, and a raw column is a byte offset.
//!
//! - **Render is derived.** `render` is computed once when the row is built
//!   and there is no API to edit either form, so the two can't drift apart.
//!
//! - **Append-only.** A viewer never inserts or deletes rows; [`Rows`] only
//!   grows, one row per line, in file order.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Default tab stop width, in render columns.
pub const TAB_STOP: usize = 8;

/// Widest tab stop accepted. Wider values are clamped to it.
pub const MAX_TAB_STOP: usize = 64;

/// Clamp a requested tab stop into `1..=MAX_TAB_STOP`.
#[inline]
#[must_use]
pub const fn clamp_tab_stop(tab_stop: usize) -> usize {
    if tab_stop == 0 {
        1
    } else if tab_stop > MAX_TAB_STOP {
        MAX_TAB_STOP
    } else {
        tab_stop
    }
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    raw: Vec<u8>,
    render: Vec<u8>,
}

impl Row {
    /// Build a row from a line, trimming any trailing `\n` / `\r` bytes.
    #[must_use]
    pub fn new(line: &[u8], tab_stop: usize) -> Self {
        let end = line
            .iter()
            .rposition(|&b| b != b'\n' && b != b'\r')
            .map_or(0, |i| i + 1);
        let raw = line[..end].to_vec();
        let render = expand_tabs(&raw, tab_stop);
        Self { raw, render }
    }

    /// The line's bytes as stored in the file.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The line with tabs expanded, as drawn on screen.
    #[inline]
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// Length in raw columns (bytes).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the line is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Convert a raw column to a render column.
    ///
    /// Walks `raw[..cx]`: a tab jumps to the next multiple of `tab_stop`,
    /// any other byte moves one column. `cx` past the end is clamped, and
    /// so is `tab_stop` (see [`clamp_tab_stop`]).
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let tab_stop = clamp_tab_stop(tab_stop);
        self.raw[..cx.min(self.raw.len())]
            .iter()
            .fold(0, |rx, &b| {
                if b == b'\t' {
                    (rx / tab_stop + 1) * tab_stop
                } else {
                    rx + 1
                }
            })
    }
}

/// Expand tabs in `raw` to spaces, stopping each at a multiple of `tab_stop`.
fn expand_tabs(raw: &[u8], tab_stop: usize) -> Vec<u8> {
    let tab_stop = clamp_tab_stop(tab_stop);
    let tabs = raw.iter().filter(|&&b| b == b'\t').count();
    let mut render = Vec::with_capacity(raw.len() + tabs * (tab_stop - 1));

    for &b in raw {
        if b == b'\t' {
            render.push(b' ');
            while render.len() % tab_stop != 0 {
                render.push(b' ');
            }
        } else {
            render.push(b);
        }
    }

    render
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// All rows of the file, in order, plus the tab stop they were rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rows {
    rows: Vec<Row>,
    tab_stop: usize,
}

impl Default for Rows {
    fn default() -> Self {
        Self::new(TAB_STOP)
    }
}

impl Rows {
    /// An empty buffer.
    #[must_use]
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            tab_stop: clamp_tab_stop(tab_stop),
        }
    }

    /// Load every line of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be opened or read.
    pub fn open(path: &Path, tab_stop: usize) -> io::Result<Self> {
        let file = File::open(path)?;
        let rows = Self::from_reader(BufReader::new(file), tab_stop)?;
        log::debug!("loaded {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    /// Load every line from a reader, splitting on `\n`.
    ///
    /// A final newline ends the last line; it doesn't start an empty one.
    ///
    /// # Errors
    ///
    /// Returns any read error.
    pub fn from_reader(reader: impl BufRead, tab_stop: usize) -> io::Result<Self> {
        let mut rows = Self::new(tab_stop);
        for line in reader.split(b'\n') {
            rows.append(&line?);
        }
        Ok(rows)
    }

    /// Append one line as a new row.
    pub fn append(&mut self, line: &[u8]) {
        self.rows.push(Row::new(line, self.tab_stop));
    }

    /// The row at `index`, if it exists.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the buffer has no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tab stop width used for every row's render form.
    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Render column for raw column `cx` on row `cy`, or 0 past the end.
    #[must_use]
    pub fn cx_to_rx(&self, cy: usize, cx: usize) -> usize {
        self.get(cy).map_or(0, |row| row.cx_to_rx(cx, self.tab_stop))
    }

    /// Raw length of row `cy`, or 0 past the end.
    #[must_use]
    pub fn row_len(&self, cy: usize) -> usize {
        self.get(cy).map_or(0, Row::len)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
