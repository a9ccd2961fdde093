// SPDX-License-Identifier: MIT
//
// VT100 escape sequences used by the viewer.
//
// One function per sequence, each writing to any `impl Write`. Which
// sequences go into a frame, and in what order, is decided by the
// compositor in kv-editor.
//
// Positions passed to `cursor_to` are 0-based and sent 1-based.

use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Put the cursor at column `x`, row `y` (CUP).
#[inline]
pub fn cursor_to(w: &mut impl Write, x: usize, y: usize) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Move the cursor to the top-left corner (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor while a frame is drawn.
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor again.
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Push the cursor as far right and down as the terminal allows.
///
/// `C` and `B` stop at the screen edge, so 999 lands on the bottom-right
/// cell of any realistic window. Used before [`request_cursor_position`]
/// to learn the window size when `TIOCGWINSZ` is unavailable.
#[inline]
pub fn cursor_to_bottom_right(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[999C\x1b[999B")
}

/// Ask the terminal for the cursor position (DSR 6).
///
/// The terminal answers on stdin with `ESC [ rows ; cols R`.
#[inline]
pub fn request_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Erase the whole screen (ED 2). Used on quit and on fatal errors.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Erase from the cursor to the end of the current line (EL 0).
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// Swap foreground and background (SGR 7).
#[inline]
pub fn inverse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[7m")
}

/// Reset all SGR attributes to terminal defaults.
///
/// Uses the parameterless form `ESC [ m`, which every VT100 descendant
/// treats as SGR 0.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[m")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
