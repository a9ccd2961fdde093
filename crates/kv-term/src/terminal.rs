// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, window size, and RAII cleanup.
//
// Safety: tcgetattr, tcsetattr, ioctl(TIOCGWINSZ) and the panic hook's
// write(2) are FFI calls. Each unsafe block wraps exactly one of them.
#![allow(unsafe_code)]
//
// `RawMode` owns the terminal's original attributes. Entering raw mode
// turns off everything the tty driver would otherwise do on our behalf
// (echo, line buffering, signal keys, CR→NL translation, output
// post-processing) and sets a 100ms read timeout. Dropping the handle puts
// the attributes back.
//
// Drop doesn't run on panic-abort or when a panic unwinds through code
// holding the stdout lock, so a panic hook restores the attributes from a
// global backup too. The hook writes straight to fd 1 to avoid deadlocking
// on that lock.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::input::ByteSource;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Window size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Width.
    pub cols: u16,
    /// Height, including the two bar rows.
    pub rows: u16,
}

// ─── Window Size ────────────────────────────────────────────────────────────

/// Ask the tty driver for the window size (`TIOCGWINSZ` on stdout).
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// terminal reports zero columns.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Longest cursor position report we're willing to read.
///
/// `ESC [ 65535 ; 65535 R` is 14 bytes; anything longer is garbage.
const CURSOR_REPORT_MAX: usize = 32;

/// Parse a cursor position report: `ESC [ rows ; cols R`.
///
/// The trailing `R` may be present or already stripped. Returns `None`
/// for anything else, including numbers that don't fit in a `u16`.
#[must_use]
pub fn parse_cursor_report(report: &[u8]) -> Option<Size> {
    let body = report.strip_prefix(b"\x1b[")?;
    let body = body.strip_suffix(b"R").unwrap_or(body);
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;

    Some(Size {
        rows: rows.parse().ok()?,
        cols: cols.parse().ok()?,
    })
}

/// Measure the window by parking the cursor bottom-right and asking where
/// it ended up.
///
/// Writes the probe to `out` (flushed immediately) and reads the reply
/// from `input` up to the closing `R`. Needs raw mode so the reply isn't
/// echoed or line-buffered.
///
/// # Errors
///
/// Returns an error if the probe can't be written, the reply can't be
/// read, or the reply doesn't parse.
pub fn probe_size(out: &mut impl Write, input: &mut impl ByteSource) -> io::Result<Size> {
    ansi::cursor_to_bottom_right(out)?;
    ansi::request_cursor_position(out)?;
    out.flush()?;

    let mut reply = Vec::with_capacity(CURSOR_REPORT_MAX);
    while reply.len() < CURSOR_REPORT_MAX {
        match input.read_byte()? {
            Some(b'R') | None => break,
            Some(byte) => reply.push(byte),
        }
    }

    parse_cursor_report(&reply).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            "terminal did not answer the cursor position request",
        )
    })
}

/// Determine the window size: `TIOCGWINSZ` first, the cursor probe if that
/// is unavailable.
///
/// # Errors
///
/// Returns an error only if both methods fail.
pub fn window_size(out: &mut impl Write, input: &mut impl ByteSource) -> io::Result<Size> {
    if let Some(size) = get_size() {
        log::debug!("window size {}x{} from ioctl", size.cols, size.rows);
        return Ok(size);
    }

    log::warn!("TIOCGWINSZ unavailable, probing cursor position");
    let size = probe_size(out, input)?;
    log::debug!("window size {}x{} from cursor probe", size.cols, size.rows);
    Ok(size)
}

// ─── Panic Recovery ─────────────────────────────────────────────────────────

/// Copy of the attributes [`RawMode`] replaced, for the panic hook.
///
/// Set by [`RawMode::enter`], cleared by [`RawMode::leave`].
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Put back the attributes saved in [`TERMIOS_BACKUP`], if any.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Reset attributes, clear, home, show cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[m\x1b[2J\x1b[H\x1b[?25h";

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Chain a hook in front of the current panic hook that wipes the frame
/// and leaves raw mode, so the panic message lands on a usable terminal.
/// Installed once per process.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write [`EMERGENCY_RESTORE`] to fd 1 without taking the stdout lock.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// Derive raw-mode attributes from the terminal's current ones.
///
/// - input: no break-to-SIGINT, no CR→NL, no parity check, no 8th-bit
///   strip, no XON/XOFF flow control (frees Ctrl-S and Ctrl-Q)
/// - output: no post-processing, so `\n` is not rewritten to `\r\n`
/// - control: 8-bit characters
/// - local: no echo, no canonical line buffering, no Ctrl-V, no
///   Ctrl-C/Ctrl-Z signals
/// - `read()` returns as soon as a byte is available, or after 100ms
#[cfg(unix)]
#[must_use]
pub fn make_raw(mut termios: libc::termios) -> libc::termios {
    termios.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    termios.c_oflag &= !libc::OPOST;
    termios.c_cflag |= libc::CS8;
    termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = 1;

    termios
}

/// Raw-mode session with RAII cleanup.
///
/// [`enter`](Self::enter) switches stdin's terminal to raw mode and
/// returns the handle. The original attributes come back on
/// [`leave`](Self::leave), on drop, or from the panic hook.
///
/// # Example
///
/// ```no_run
/// use kv_term::terminal::RawMode;
///
/// let mut raw = RawMode::enter()?;
/// // ... draw frames, read keys ...
/// raw.leave()?; // or just drop it
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct RawMode {
    /// Original termios saved before entering raw mode. `None` once restored.
    #[cfg(unix)]
    original: Option<libc::termios>,

    #[cfg(not(unix))]
    active: bool,
}

impl RawMode {
    /// Capture the current attributes and install raw ones.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin is not a terminal or either attribute
    /// call fails. Nothing is changed in that case.
    #[cfg(unix)]
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();

        let original = unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }
            termios
        };

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(original);
        }

        let raw = make_raw(original);
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const raw) } != 0 {
            let err = io::Error::last_os_error();
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            return Err(err);
        }

        log::debug!("terminal entered raw mode");
        Ok(Self {
            original: Some(original),
        })
    }

    #[cfg(not(unix))]
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();
        Ok(Self { active: true })
    }

    /// Whether raw mode is still in effect.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        #[cfg(unix)]
        {
            self.original.is_some()
        }
        #[cfg(not(unix))]
        {
            self.active
        }
    }

    /// Put the original attributes back.
    ///
    /// Idempotent: calling `leave()` again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if `tcsetattr` fails. The handle stays active so
    /// the drop can retry.
    #[cfg(unix)]
    pub fn leave(&mut self) -> io::Result<()> {
        let Some(ref original) = self.original else {
            return Ok(());
        };

        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original) } != 0 {
            return Err(io::Error::last_os_error());
        }

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }
        self.original = None;

        log::debug!("terminal attributes restored");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn leave(&mut self) -> io::Result<()> {
        self.active = false;
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
