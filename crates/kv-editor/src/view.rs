//! View — which part of the file is on screen.
//!
//! A `View` holds the scroll offsets and the size of the text area, and
//! moves the offsets so the cursor is always inside the visible window.
//! It doesn't own the rows or the cursor; those are passed to
//! [`scroll`](View::scroll).
//!
//! ```text
//!            col_off
//!               │◀──── screen_cols ────▶│
//!   row_off ──▶ ┌───────────────────────┐
//!               │ visible text area     │  screen_rows
//!               │          █ (cy, rx)   │
//!               └───────────────────────┘
//! ```
//!
//! Vertical offsets are row indices. Horizontal offsets are *render*
//! columns, so the cursor's raw column is converted with
//! [`Row::cx_to_rx`](crate::row::Row::cx_to_rx) before comparing.

use kv_term::terminal::Size;

use crate::row::Rows;

/// Screen rows reserved below the text area: status bar and message bar.
pub const BAR_ROWS: usize = 2;

/// Scroll state and text-area size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    /// First visible row.
    row_off: usize,

    /// First visible render column.
    col_off: usize,

    /// Cursor column in render coordinates, refreshed by every scroll.
    rx: usize,

    /// Height of the text area.
    screen_rows: usize,

    /// Width of the text area.
    screen_cols: usize,
}

impl View {
    /// A view at the top-left of a window of the given size.
    ///
    /// The bottom [`BAR_ROWS`] rows of the window are left for the bars.
    #[must_use]
    pub fn new(window: Size) -> Self {
        Self::with_text_area(
            usize::from(window.rows).saturating_sub(BAR_ROWS),
            usize::from(window.cols),
        )
    }

    /// A view whose text area is exactly `rows × cols`.
    #[must_use]
    pub const fn with_text_area(rows: usize, cols: usize) -> Self {
        Self {
            row_off: 0,
            col_off: 0,
            rx: 0,
            screen_rows: rows,
            screen_cols: cols,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// First visible row.
    #[inline]
    #[must_use]
    pub const fn row_off(&self) -> usize {
        self.row_off
    }

    /// First visible render column.
    #[inline]
    #[must_use]
    pub const fn col_off(&self) -> usize {
        self.col_off
    }

    /// Cursor column in render coordinates as of the last scroll.
    #[inline]
    #[must_use]
    pub const fn rx(&self) -> usize {
        self.rx
    }

    /// Height of the text area in rows.
    #[inline]
    #[must_use]
    pub const fn screen_rows(&self) -> usize {
        self.screen_rows
    }

    /// Width of the text area in columns.
    #[inline]
    #[must_use]
    pub const fn screen_cols(&self) -> usize {
        self.screen_cols
    }

    // -- Scrolling ----------------------------------------------------------

    /// Move the offsets so `(cx, cy)` is inside the text area.
    ///
    /// Recomputes `rx` from the cursor's row first (0 past the last row),
    /// then jumps each offset just far enough. Calling it again without
    /// moving the cursor changes nothing.
    pub fn scroll(&mut self, rows: &Rows, cx: usize, cy: usize) {
        self.rx = rows.cx_to_rx(cy, cx);

        if self.screen_rows > 0 {
            if cy < self.row_off {
                self.row_off = cy;
            }
            if cy >= self.row_off + self.screen_rows {
                self.row_off = cy - self.screen_rows + 1;
            }
        }

        if self.screen_cols > 0 {
            if self.rx < self.col_off {
                self.col_off = self.rx;
            }
            if self.rx >= self.col_off + self.screen_cols {
                self.col_off = self.rx - self.screen_cols + 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
