//! Editor — the viewer's whole mutable state.
//!
//! One `Editor` holds the loaded [`Rows`], the cursor, the [`View`], and the
//! display-only bits the bars show (file name, status message). The main
//! loop owns it and passes it by reference; there is no global state, so
//! everything here can be driven from tests without a terminal.
//!
//! # Cursor coordinates
//!
//! `(cx, cy)` is in raw coordinates: `cy` is a row index in `0..=len`
//! (`len` being one past the last row), `cx` a byte offset in
//! `0..=row_len(cy)`. Every movement ends by clamping `cx` to the row it
//! landed on, so moving onto a shorter row pulls the cursor left.
//!
//! # Keys
//!
//! | Key               | Effect                                           |
//! |-------------------|--------------------------------------------------|
//! | `Ctrl-Q`          | quit                                             |
//! | arrows            | move one cell; Left/Right wrap across row ends   |
//! | `Home` / `End`    | start / end of the row                           |
//! | `PgUp` / `PgDn`   | one screen up / down                             |
//! | anything else     | ignored (the viewer is read-only)                |

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use kv_term::input::Key;
use kv_term::terminal::Size;

use crate::options::Options;
use crate::row::Rows;
use crate::view::View;

/// Message shown when the viewer starts.
pub const HELP_MESSAGE: &str = "HELP: Ctrl-Q = quit";

/// What the main loop should do after a key has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep running.
    Continue,
    /// Leave the main loop.
    Quit,
}

/// A status bar message and the moment it was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    text: String,
    set_at: Instant,
}

impl StatusMessage {
    /// The message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the message is still inside its display window at `now`.
    #[must_use]
    pub fn is_visible(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.set_at) < timeout
    }
}

/// The viewer's state.
#[derive(Debug, Clone)]
pub struct Editor {
    rows: Rows,
    options: Options,
    cx: usize,
    cy: usize,
    view: View,
    filename: Option<String>,
    status: Option<StatusMessage>,
}

impl Editor {
    // -- Construction -------------------------------------------------------

    /// An editor with an empty buffer for a window of the given size.
    #[must_use]
    pub fn new(window: Size, options: Options) -> Self {
        Self::from_rows(Rows::new(options.tab_stop), window, options)
    }

    /// An editor showing already-loaded rows.
    #[must_use]
    pub fn from_rows(rows: Rows, window: Size, options: Options) -> Self {
        Self {
            rows,
            options,
            cx: 0,
            cy: 0,
            view: View::new(window),
            filename: None,
            status: None,
        }
    }

    /// Replace the buffer with the contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be opened or read. The editor is
    /// unchanged in that case.
    pub fn open(&mut self, path: &Path) -> io::Result<()> {
        self.rows = Rows::open(path, self.options.tab_stop)?;
        self.filename = Some(path.display().to_string());
        self.cx = 0;
        self.cy = 0;
        Ok(())
    }

    // -- Accessors ----------------------------------------------------------

    /// The loaded rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> &Rows {
        &self.rows
    }

    /// The options this editor was created with.
    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Scroll state.
    #[inline]
    #[must_use]
    pub const fn view(&self) -> &View {
        &self.view
    }

    /// Cursor column (raw).
    #[inline]
    #[must_use]
    pub const fn cx(&self) -> usize {
        self.cx
    }

    /// Cursor row.
    #[inline]
    #[must_use]
    pub const fn cy(&self) -> usize {
        self.cy
    }

    /// Name of the open file, if any.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// The status message, if one is set and still visible at `now`.
    #[must_use]
    pub fn status_message(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|msg| msg.is_visible(now, self.options.message_timeout))
            .map(StatusMessage::text)
    }

    // -- Mutation -----------------------------------------------------------

    /// Show `text` in the message bar, starting now.
    pub fn set_status_message(&mut self, text: impl Into<String>) {
        self.set_status_message_at(text, Instant::now());
    }

    /// Show `text` in the message bar as if it had been set at `at`.
    pub fn set_status_message_at(&mut self, text: impl Into<String>, at: Instant) {
        self.status = Some(StatusMessage {
            text: text.into(),
            set_at: at,
        });
    }

    /// Put the cursor at `(cx, cy)`, clamped to the buffer.
    pub fn set_cursor(&mut self, cx: usize, cy: usize) {
        self.cy = cy.min(self.rows.len());
        self.cx = cx;
        self.clamp_cx();
    }

    /// Bring the view's offsets up to date with the cursor.
    ///
    /// Runs before every frame.
    pub fn scroll(&mut self) {
        self.view.scroll(&self.rows, self.cx, self.cy);
    }

    // -- Keys ---------------------------------------------------------------

    /// Apply one key press.
    pub fn process_key(&mut self, key: Key) -> Action {
        if key.is_ctrl(b'q') {
            log::info!("quit requested");
            return Action::Quit;
        }

        match key {
            Key::Up | Key::Down | Key::Left | Key::Right => self.move_cursor(key),
            Key::Home => self.cx = 0,
            Key::End => self.cx = self.rows.row_len(self.cy),
            Key::PageUp | Key::PageDown => self.page(key),
            Key::Delete | Key::Escape | Key::Char(_) => {}
        }

        Action::Continue
    }

    /// Move one cell in the direction of an arrow key.
    fn move_cursor(&mut self, key: Key) {
        let at_row = self.cy < self.rows.len();

        match key {
            Key::Left => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    self.cy -= 1;
                    self.cx = self.rows.row_len(self.cy);
                }
            }
            Key::Right if at_row => {
                if self.cx < self.rows.row_len(self.cy) {
                    self.cx += 1;
                } else {
                    self.cy += 1;
                    self.cx = 0;
                }
            }
            Key::Up => self.cy = self.cy.saturating_sub(1),
            Key::Down if at_row => self.cy += 1,
            _ => {}
        }

        self.clamp_cx();
    }

    /// Jump a screen up or down.
    ///
    /// The cursor first goes to the top (or bottom) row of the window, then
    /// moves a full screen from there, so repeated presses page evenly.
    fn page(&mut self, key: Key) {
        let screen_rows = self.view.screen_rows();

        let (step, target) = if key == Key::PageUp {
            (Key::Up, self.view.row_off())
        } else {
            let bottom = (self.view.row_off() + screen_rows).saturating_sub(1);
            (Key::Down, bottom.min(self.rows.len()))
        };

        self.cy = target;
        self.clamp_cx();
        for _ in 0..screen_rows {
            self.move_cursor(step);
        }
    }

    /// Pull `cx` back inside the current row.
    fn clamp_cx(&mut self) {
        self.cx = self.cx.min(self.rows.row_len(self.cy));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
