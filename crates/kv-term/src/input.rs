// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal key decoder.
//
// Turns raw stdin bytes into key events. A byte that isn't ESC is a key
// on its own. ESC starts one of a handful of VT100/xterm sequences:
//
//   ESC [ <digit> ~    editing keys (Home, Delete, End, PageUp, PageDown)
//   ESC [ <letter>     arrows, Home, End
//   ESC O <letter>     Home / End in application cursor mode
//
// # Design
//
// Bytes come from a [`ByteSource`], one per call, so the decoder never
// buffers more than the three bytes following an ESC. Raw mode sets a
// 100ms read timeout; a continuation byte that doesn't arrive in time
// means the user pressed Escape by itself.
//
// Bytes consumed while trying to match a sequence are gone for good. An
// unrecognized sequence (or a truncated one) comes back as a single
// Escape and its tail is dropped. The decoder never re-reads.

use std::io;

/// The escape byte (`0x1B`) that introduces every multi-byte sequence.
pub const ESC: u8 = 0x1B;

// ─── Key ─────────────────────────────────────────────────────────────────────

/// A decoded key press.
///
/// Named keys have dedicated variants. Everything else, printable or
/// control, arrives as [`Char`](Key::Char) with the raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A single raw byte (letters, digits, control characters).
    Char(u8),
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    /// Whether this is Ctrl plus the given letter.
    ///
    /// ```
    /// use kv_term::input::Key;
    ///
    /// assert!(Key::Char(0x11).is_ctrl(b'q'));
    /// assert!(!Key::Char(b'q').is_ctrl(b'q'));
    /// ```
    #[must_use]
    pub const fn is_ctrl(self, letter: u8) -> bool {
        matches!(self, Self::Char(b) if b == ctrl(letter))
    }
}

/// The byte a terminal sends for Ctrl plus `letter`.
///
/// Ctrl strips bits 5 and 6, so `ctrl(b'q') == ctrl(b'Q') == 0x11`.
#[inline]
#[must_use]
pub const fn ctrl(letter: u8) -> u8 {
    letter & 0x1F
}

// ─── Byte Sources ────────────────────────────────────────────────────────────

/// Something that yields terminal input one byte at a time.
///
/// `Ok(None)` means the read timed out with nothing available. Real
/// failures come back as `Err`.
pub trait ByteSource {
    /// Read the next byte, or `None` if none arrived before the timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails for any reason other
    /// than "no data yet".
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Whether no byte will ever arrive again.
    ///
    /// A terminal never runs dry, it only goes quiet, so the default is
    /// `false`. Finite sources such as byte slices override it.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Reads from the process's stdin file descriptor.
///
/// Under raw mode (`VMIN = 0`, `VTIME = 1`) each read returns after at
/// most 100ms. `EAGAIN` and `EINTR` are treated as a timeout, never as an
/// error.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdin;

#[cfg(unix)]
impl ByteSource for Stdin {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };

        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }
}

#[cfg(not(unix))]
impl ByteSource for Stdin {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// A byte slice as input. Once drained, every read "times out".
impl ByteSource for &[u8] {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self.split_first() {
            Some((&byte, rest)) => {
                *self = rest;
                Ok(Some(byte))
            }
            None => Ok(None),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.is_empty()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

// ─── KeyReader ───────────────────────────────────────────────────────────────

/// Decodes key presses from a [`ByteSource`].
///
/// [`next_key`](Self::next_key) blocks until a key arrives, and so does
/// iterating. The iterator ends only once the source
/// [is exhausted](ByteSource::is_exhausted), so on [`Stdin`] it runs for
/// as long as the terminal is open and on a `&[u8]` it ends with the slice.
///
/// # Example
///
/// ```
/// use kv_term::input::{Key, KeyReader};
///
/// let keys: Vec<Key> = KeyReader::new(&b"a\x1b[B"[..])
///     .collect::<std::io::Result<_>>()
///     .unwrap();
/// assert_eq!(keys, [Key::Char(b'a'), Key::Down]);
/// ```
pub struct KeyReader<S> {
    source: S,
}

impl<S: ByteSource> KeyReader<S> {
    /// Wrap a byte source.
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Access the underlying source (e.g. to read a cursor report).
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Block until one full key has been decoded.
    ///
    /// Timeouts while waiting for the first byte are retried. Timeouts
    /// inside an escape sequence end it as a bare Escape.
    ///
    /// # Errors
    ///
    /// Returns any read error from the source.
    pub fn next_key(&mut self) -> io::Result<Key> {
        loop {
            if let Some(key) = self.try_next_key()? {
                return Ok(key);
            }
        }
    }

    /// Decode one key if input is available, or `None` after one idle read.
    ///
    /// # Errors
    ///
    /// Returns any read error from the source.
    pub fn try_next_key(&mut self) -> io::Result<Option<Key>> {
        let Some(byte) = self.source.read_byte()? else {
            return Ok(None);
        };

        let key = if byte == ESC {
            self.decode_escape()?
        } else {
            Key::Char(byte)
        };

        log::trace!("key {key:?}");
        Ok(Some(key))
    }

    /// Resolve the bytes after an ESC into a key.
    fn decode_escape(&mut self) -> io::Result<Key> {
        let Some(first) = self.source.read_byte()? else {
            return Ok(Key::Escape);
        };
        let Some(second) = self.source.read_byte()? else {
            return Ok(Key::Escape);
        };

        if first == b'[' && second.is_ascii_digit() {
            return Ok(match self.source.read_byte()? {
                Some(b'~') => tilde_key(second),
                _ => Key::Escape,
            });
        }

        Ok(match (first, second) {
            (b'[', b'A') => Key::Up,
            (b'[', b'B') => Key::Down,
            (b'[', b'C') => Key::Right,
            (b'[', b'D') => Key::Left,
            (b'[' | b'O', b'H') => Key::Home,
            (b'[' | b'O', b'F') => Key::End,
            _ => Key::Escape,
        })
    }
}

impl<S: ByteSource> Iterator for KeyReader<S> {
    type Item = io::Result<Key>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.try_next_key() {
                Ok(Some(key)) => return Some(Ok(key)),
                Ok(None) if self.source.is_exhausted() => return None,
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Map the digit of an `ESC [ <digit> ~` sequence to its key.
///
/// Terminals disagree on Home and End: xterm sends 1/4, rxvt sends 7/8.
const fn tilde_key(digit: u8) -> Key {
    match digit {
        b'1' | b'7' => Key::Home,
        b'3' => Key::Delete,
        b'4' | b'8' => Key::End,
        b'5' => Key::PageUp,
        b'6' => Key::PageDown,
        _ => Key::Escape,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
