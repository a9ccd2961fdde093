// SPDX-License-Identifier: MIT
//
// kv-term — Terminal layer for kview.
//
// Everything that touches the tty lives here: switching it into raw mode
// and back, measuring the window, decoding key presses out of raw stdin
// bytes, and the VT100 escape sequences the viewer draws with. The
// escape sequences are written into an `OutputBuffer` so a whole frame
// goes out in one write.
//
// Built directly on termios through libc; there is no TUI framework
// underneath.

pub mod ansi;
pub mod input;
pub mod output;
pub mod terminal;
