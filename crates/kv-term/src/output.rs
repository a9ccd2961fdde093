// SPDX-License-Identifier: MIT
//
// Frame output buffering.
//
// A frame is built up here byte by byte (escape sequences, row text, bar
// padding) and handed to the terminal with one write, so the terminal
// never shows a half-drawn screen.

use std::io::{self, Write};

/// Bytes reserved up front: a 200×50 screen of text plus escapes.
const FRAME_CAPACITY: usize = 12 * 1024;

/// The bytes of one pending frame.
///
/// Implements [`Write`], so the [`ansi`](crate::ansi) helpers and `write!`
/// append to it directly. Appending never fails.
#[derive(Debug)]
pub struct OutputBuffer {
    frame: Vec<u8>,
}

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame: Vec::with_capacity(FRAME_CAPACITY),
        }
    }

    /// Bytes pending.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// The pending frame.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.frame
    }

    /// Append `bytes` as they are. File text need not be UTF-8.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.frame.extend_from_slice(bytes);
    }

    /// Append `byte` `n` times (padding in the bars and the banner).
    #[inline]
    pub fn push_repeated(&mut self, byte: u8, n: usize) {
        self.frame.resize(self.frame.len() + n, byte);
    }

    /// Drop the pending frame, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.frame.clear();
    }

    /// Send the pending frame to `w` with one `write_all`, flush `w`, and
    /// start a new frame. Nothing is written when the frame is empty.
    ///
    /// On error the frame is kept, so the caller may retry.
    ///
    /// # Errors
    ///
    /// Returns the writer's error.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.frame.is_empty() {
            return Ok(());
        }
        w.write_all(&self.frame)?;
        w.flush()?;
        self.frame.clear();
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.push_bytes(bytes);
        Ok(bytes.len())
    }

    // Frames leave only through `flush_to`.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Records every `write` call separately.
    #[derive(Default)]
    struct Tty {
        writes: Vec<Vec<u8>>,
        flushes: usize,
    }

    impl Write for Tty {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.writes.push(bytes.to_vec());
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn starts_empty() {
        let out = OutputBuffer::default();
        assert!(out.is_empty());
        assert_eq!(out.len(), 0);
    }

    #[test]
    fn formatted_writes_append() {
        let mut out = OutputBuffer::new();
        write!(out, "\x1b[{};{}H", 3, 7).unwrap();
        out.push_bytes(b"~");
        assert_eq!(out.as_bytes(), b"\x1b[3;7H~");
    }

    #[test]
    fn row_bytes_pass_through_unchanged() {
        let mut out = OutputBuffer::new();
        out.push_bytes(b"caf\xE9\x00end");
        assert_eq!(out.as_bytes(), b"caf\xE9\x00end");
    }

    #[test]
    fn padding() {
        let mut out = OutputBuffer::new();
        out.push_bytes(b"~");
        out.push_repeated(b' ', 4);
        out.push_repeated(b' ', 0);
        out.push_bytes(b"kview");
        assert_eq!(out.as_bytes(), b"~    kview");
    }

    #[test]
    fn whole_frame_is_one_write() {
        let mut out = OutputBuffer::new();
        out.push_bytes(b"\x1b[?25l\x1b[H");
        for row in ["first", "second", "third"] {
            out.push_bytes(row.as_bytes());
            out.push_bytes(b"\x1b[K\r\n");
        }
        out.push_bytes(b"\x1b[1;1H\x1b[?25h");

        let mut tty = Tty::default();
        out.flush_to(&mut tty).unwrap();

        assert_eq!(tty.writes.len(), 1);
        assert_eq!(tty.flushes, 1);
        assert_eq!(
            tty.writes[0],
            b"\x1b[?25l\x1b[Hfirst\x1b[K\r\nsecond\x1b[K\r\nthird\x1b[K\r\n\x1b[1;1H\x1b[?25h"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn consecutive_frames_do_not_mix() {
        let mut out = OutputBuffer::new();
        let mut tty = Tty::default();

        out.push_bytes(b"one");
        out.flush_to(&mut tty).unwrap();
        out.push_bytes(b"two");
        out.flush_to(&mut tty).unwrap();

        assert_eq!(tty.writes, vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn empty_frame_writes_nothing() {
        let mut out = OutputBuffer::new();
        let mut tty = Tty::default();
        out.flush_to(&mut tty).unwrap();
        assert!(tty.writes.is_empty());
        assert_eq!(tty.flushes, 0);
    }

    #[test]
    fn failed_flush_keeps_frame() {
        let mut out = OutputBuffer::new();
        out.push_bytes(b"frame");
        let err = out.flush_to(&mut Closed).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(out.as_bytes(), b"frame");
    }

    #[test]
    fn clear_discards_frame() {
        let mut out = OutputBuffer::new();
        out.push_bytes(b"stale");
        out.clear();
        assert!(out.is_empty());
    }
}
