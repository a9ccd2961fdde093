//! Screen compositor — one frame, one write.
//!
//! [`render_frame`] appends a complete frame to an [`OutputBuffer`]:
//!
//! ```text
//! ESC[?25l  ESC[H                 hide cursor, go home
//! text rows  ... ESC[K \r\n       file rows, `~` past the end
//! ESC[7m  status bar  ESC[m \r\n  file name, line count, position
//! ESC[K  message                  status message while it's fresh
//! ESC[r;cH  ESC[?25h              place and show the cursor
//! ```
//!
//! Nothing is written to the terminal until [`refresh`] flushes the buffer,
//! so the terminal never shows half a frame. Every line erases to its end
//! instead of clearing the screen up front, so rows that got shorter since
//! the last frame lose their stale tail without a full-screen flash.

use std::io::{self, Write};
use std::time::Instant;

use kv_term::ansi;
use kv_term::output::OutputBuffer;

use crate::editor::Editor;

/// Banner shown a third of the way down an empty buffer.
pub const WELCOME: &str = concat!("kview -- version ", env!("CARGO_PKG_VERSION"));

/// Status bar placeholder when no file is open.
pub const NO_NAME: &str = "[No Name]";

/// Longest file name prefix shown in the status bar, in chars.
const FILENAME_WIDTH: usize = 20;

/// Scroll, draw, and flush one frame to `w` in a single write.
///
/// # Errors
///
/// Returns an error if writing to `w` fails.
pub fn refresh(
    editor: &mut Editor,
    out: &mut OutputBuffer,
    w: &mut impl Write,
    now: Instant,
) -> io::Result<()> {
    editor.scroll();
    render_frame(editor, out, now)?;
    out.flush_to(w)
}

/// Append one complete frame for `editor` to `out`.
///
/// Expects [`Editor::scroll`] to have run since the cursor last moved.
///
/// # Errors
///
/// Only propagates writer errors, which `OutputBuffer` never produces.
pub fn render_frame(editor: &Editor, out: &mut OutputBuffer, now: Instant) -> io::Result<()> {
    ansi::cursor_hide(out)?;
    ansi::cursor_home(out)?;

    draw_rows(editor, out)?;
    draw_status_bar(editor, out)?;
    draw_message_bar(editor, out, now)?;

    let view = editor.view();
    ansi::cursor_to(
        out,
        view.rx().saturating_sub(view.col_off()),
        editor.cy().saturating_sub(view.row_off()),
    )?;
    ansi::cursor_show(out)
}

/// Draw every text-area row: file content, or `~` past the end.
fn draw_rows(editor: &Editor, out: &mut OutputBuffer) -> io::Result<()> {
    let view = editor.view();
    let rows = editor.rows();
    let cols = view.screen_cols();

    for y in 0..view.screen_rows() {
        let file_row = y + view.row_off();

        if let Some(row) = rows.get(file_row) {
            let render = row.render();
            let start = view.col_off().min(render.len());
            let end = (start + cols).min(render.len());
            out.push_bytes(&render[start..end]);
        } else if rows.is_empty() && y == view.screen_rows() / 3 {
            draw_welcome(out, cols);
        } else {
            out.push_bytes(b"~");
        }

        ansi::clear_line(out)?;
        out.push_bytes(b"\r\n");
    }

    Ok(())
}

/// Centre the welcome banner, keeping the `~` in the first column.
fn draw_welcome(out: &mut OutputBuffer, cols: usize) {
    let banner = &WELCOME.as_bytes()[..WELCOME.len().min(cols)];
    let padding = (cols - banner.len()) / 2;

    if padding > 0 {
        out.push_bytes(b"~");
        out.push_repeated(b' ', padding - 1);
    }
    out.push_bytes(banner);
}

/// Draw the inverted status bar: name and line count left, position right.
fn draw_status_bar(editor: &Editor, out: &mut OutputBuffer) -> io::Result<()> {
    let cols = editor.view().screen_cols();
    let line_count = editor.rows().len();

    let name: String = editor
        .filename()
        .unwrap_or(NO_NAME)
        .chars()
        .take(FILENAME_WIDTH)
        .collect();
    let left = format!("{name} - {line_count} lines");
    let right = format!("{}/{line_count}", editor.cy() + 1);

    let left = truncate(&left, cols);
    let gap = cols - left.len();

    ansi::inverse(out)?;
    out.push_bytes(left.as_bytes());
    if right.len() <= gap {
        out.push_repeated(b' ', gap - right.len());
        out.push_bytes(right.as_bytes());
    } else {
        out.push_repeated(b' ', gap);
    }
    ansi::reset(out)?;
    out.push_bytes(b"\r\n");

    Ok(())
}

/// Draw the message bar: the status message while it's still fresh.
fn draw_message_bar(editor: &Editor, out: &mut OutputBuffer, now: Instant) -> io::Result<()> {
    ansi::clear_line(out)?;
    if let Some(msg) = editor.status_message(now) {
        out.push_bytes(truncate(msg, editor.view().screen_cols()).as_bytes());
    }
    Ok(())
}

/// The longest prefix of `text` that fits in `max` bytes without
/// splitting a character.
fn truncate(text: &str, max: usize) -> &str {
    let mut end = text.len().min(max);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::HELP_MESSAGE;
    use crate::options::Options;
    use crate::row::Rows;
    use kv_term::input::Key;
    use kv_term::terminal::Size;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn editor(text: &str, cols: u16, rows: u16) -> Editor {
        let buf = Rows::from_reader(text.as_bytes(), 8).unwrap();
        Editor::from_rows(buf, Size { cols, rows }, Options::default())
    }

    /// Render a frame (after scrolling) and return it as a string.
    fn frame(ed: &mut Editor, now: Instant) -> String {
        ed.scroll();
        let mut out = OutputBuffer::new();
        render_frame(ed, &mut out, now).unwrap();
        String::from_utf8(out.as_bytes().to_vec()).unwrap()
    }

    /// The text-area and status lines of a frame, escapes left in place.
    fn lines(frame: &str) -> Vec<&str> {
        frame.split("\r\n").collect()
    }

    // ── Frame structure ───────────────────────────────────────────────────

    #[test]
    fn frame_starts_hidden_at_home_and_ends_shown() {
        let mut ed = editor("abc\n", 20, 5);
        let s = frame(&mut ed, Instant::now());
        assert!(s.starts_with("\x1b[?25l\x1b[H"));
        assert!(s.ends_with("\x1b[1;1H\x1b[?25h"));
    }

    #[test]
    fn frame_has_one_line_per_row_plus_bars() {
        let mut ed = editor("a\nb\n", 20, 6); // 4 text rows
        let s = frame(&mut ed, Instant::now());
        // 4 text rows + status bar each end in \r\n, message bar doesn't.
        assert_eq!(s.matches("\r\n").count(), 5);
    }

    #[test]
    fn every_text_row_erases_to_end_of_line() {
        let mut ed = editor("a\nb\n", 20, 6);
        let s = frame(&mut ed, Instant::now());
        for line in &lines(&s)[..4] {
            assert!(line.ends_with("\x1b[K"), "{line:?}");
        }
    }

    #[test]
    fn rows_and_tildes() {
        let mut ed = editor("first\n\tx\n", 20, 6);
        let s = frame(&mut ed, Instant::now());
        let l = lines(&s);
        assert_eq!(l[0], "\x1b[?25l\x1b[Hfirst\x1b[K");
        assert_eq!(l[1], "        x\x1b[K");
        assert_eq!(l[2], "~\x1b[K");
        assert_eq!(l[3], "~\x1b[K");
    }

    #[test]
    fn long_rows_are_clipped_to_width() {
        let mut ed = editor("0123456789abcdef\n", 10, 4);
        let s = frame(&mut ed, Instant::now());
        assert!(lines(&s)[0].ends_with("0123456789\x1b[K"));
    }

    #[test]
    fn horizontal_scroll_slices_render() {
        let mut ed = editor("0123456789abcdef\n", 10, 4);
        ed.set_cursor(14, 0);
        let s = frame(&mut ed, Instant::now());
        // rx 14 → col_off 5.
        assert!(lines(&s)[0].ends_with("56789abcde\x1b[K"));
        assert!(s.ends_with("\x1b[1;10H\x1b[?25h"));
    }

    #[test]
    fn rows_shorter_than_col_off_draw_empty() {
        let mut ed = editor("0123456789abcdef\nab\n", 10, 5);
        ed.set_cursor(16, 0);
        let s = frame(&mut ed, Instant::now());
        assert_eq!(lines(&s)[1], "\x1b[K");
    }

    #[test]
    fn vertical_scroll_starts_at_row_off() {
        let text: String = (0..20).map(|i| format!("r{i}\n")).collect();
        let mut ed = editor(&text, 20, 5); // 3 text rows
        ed.set_cursor(0, 10);
        let s = frame(&mut ed, Instant::now());
        let l = lines(&s);
        assert!(l[0].ends_with("r8\x1b[K"));
        assert_eq!(l[2], "r10\x1b[K");
        assert!(s.ends_with("\x1b[3;1H\x1b[?25h"));
    }

    // ── Welcome banner ────────────────────────────────────────────────────

    #[test]
    fn empty_buffer_shows_centered_welcome() {
        let mut ed = editor("", 80, 11); // 9 text rows, banner on row 3
        let s = frame(&mut ed, Instant::now());
        let l = lines(&s);
        let padding = (80 - WELCOME.len()) / 2;
        let expected = format!("~{}{WELCOME}\x1b[K", " ".repeat(padding - 1));
        assert_eq!(l[3], expected);
        assert_eq!(l[2], "~\x1b[K");
        assert_eq!(l[4], "~\x1b[K");
    }

    #[test]
    fn welcome_truncated_to_narrow_window() {
        let mut ed = editor("", 10, 5); // 3 text rows, banner on row 1
        let s = frame(&mut ed, Instant::now());
        assert_eq!(lines(&s)[1], format!("{}\x1b[K", &WELCOME[..10]));
    }

    #[test]
    fn no_welcome_when_file_has_rows() {
        let mut ed = editor("x\n", 80, 11);
        let s = frame(&mut ed, Instant::now());
        assert!(!s.contains(WELCOME));
    }

    // ── Status bar ────────────────────────────────────────────────────────

    #[test]
    fn status_bar_layout() {
        let mut ed = editor("a\nb\nc\n", 30, 5);
        ed.process_key(Key::Down);
        let s = frame(&mut ed, Instant::now());
        let status = lines(&s)[3];

        let left = "[No Name] - 3 lines";
        let right = "2/3";
        let fill = " ".repeat(30 - left.len() - right.len());
        assert_eq!(status, format!("\x1b[7m{left}{fill}{right}\x1b[m"));
    }

    #[test]
    fn status_bar_shows_truncated_filename() {
        let path = std::env::temp_dir().join("a-rather-long-file-name-for-the-bar.txt");
        std::fs::write(&path, "x\n").unwrap();
        let mut ed = editor("", 120, 5);
        ed.open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let s = frame(&mut ed, Instant::now());
        let shown: String = path.display().to_string().chars().take(20).collect();
        assert!(lines(&s)[3].starts_with(&format!("\x1b[7m{shown} - 1 lines")));
    }

    #[test]
    fn status_bar_narrow_drops_right_part() {
        let mut ed = editor("a\n", 12, 5);
        let s = frame(&mut ed, Instant::now());
        assert_eq!(lines(&s)[3], "\x1b[7m[No Name] - \x1b[m");
    }

    #[test]
    fn status_bar_fills_full_width() {
        let mut ed = editor("a\n", 40, 5);
        let s = frame(&mut ed, Instant::now());
        let body = lines(&s)[3]
            .trim_start_matches("\x1b[7m")
            .trim_end_matches("\x1b[m");
        assert_eq!(body.len(), 40);
    }

    // ── Message bar ───────────────────────────────────────────────────────

    #[test]
    fn fresh_message_is_drawn() {
        let mut ed = editor("a\n", 40, 5);
        let t0 = Instant::now();
        ed.set_status_message_at(HELP_MESSAGE, t0);
        let s = frame(&mut ed, t0 + Duration::from_secs(1));
        assert!(lines(&s)[4].starts_with(&format!("\x1b[K{HELP_MESSAGE}")));
    }

    #[test]
    fn stale_message_is_suppressed() {
        let mut ed = editor("a\n", 40, 5);
        let t0 = Instant::now();
        ed.set_status_message_at(HELP_MESSAGE, t0);
        let s = frame(&mut ed, t0 + Duration::from_secs(6));
        assert!(!s.contains(HELP_MESSAGE));
        assert!(lines(&s)[4].starts_with("\x1b[K\x1b["));
    }

    #[test]
    fn message_truncated_to_width() {
        let mut ed = editor("a\n", 8, 5);
        let t0 = Instant::now();
        ed.set_status_message_at("0123456789", t0);
        let s = frame(&mut ed, t0);
        assert!(lines(&s)[4].starts_with("\x1b[K01234567\x1b["));
    }

    #[test]
    fn message_cut_keeps_whole_characters() {
        let mut ed = editor("a\n", 8, 5);
        let t0 = Instant::now();
        // "é" occupies bytes 7..9, straddling the 8-byte width.
        ed.set_status_message_at("abcdefgé!", t0);
        let s = frame(&mut ed, t0);
        assert!(lines(&s)[4].starts_with("\x1b[Kabcdefg\x1b["));
    }

    #[test]
    fn status_bar_cut_keeps_whole_characters() {
        let path = std::env::temp_dir().join("ñandú.txt");
        let name = path.display().to_string();
        // Only meaningful when "ñ" is within the 20 chars the bar shows.
        let Some(at) = name.find('ñ').filter(|&i| name[..i].chars().count() < 20) else {
            return;
        };

        // Cut the bar one byte into the two-byte "ñ".
        std::fs::write(&path, "x\n").unwrap();
        let mut ed = editor("", u16::try_from(at + 1).unwrap(), 5);
        let opened = ed.open(&path);
        std::fs::remove_file(&path).unwrap();
        opened.unwrap();

        let s = frame(&mut ed, Instant::now());
        assert_eq!(lines(&s)[3], format!("\x1b[7m{} \x1b[m", &name[..at]));
    }

    #[test]
    fn truncate_backs_off_to_char_boundary() {
        assert_eq!(truncate("héllo", 1), "h");
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("héllo", 3), "hé");
        assert_eq!(truncate("héllo", 99), "héllo");
        assert_eq!(truncate("日本", 2), "");
    }

    // ── Cursor placement ──────────────────────────────────────────────────

    #[test]
    fn cursor_placed_at_render_column() {
        let mut ed = editor("\tx\n", 40, 5);
        ed.set_cursor(1, 0);
        let s = frame(&mut ed, Instant::now());
        assert!(s.ends_with("\x1b[1;9H\x1b[?25h"));
    }

    // ── refresh ───────────────────────────────────────────────────────────

    #[test]
    fn refresh_scrolls_and_flushes_once() {
        let text: String = (0..50).map(|i| format!("{i}\n")).collect();
        let mut ed = editor(&text, 20, 12);
        ed.set_cursor(0, 30);

        let mut out = OutputBuffer::new();
        let mut dest = Vec::new();
        refresh(&mut ed, &mut out, &mut dest, Instant::now()).unwrap();

        assert_eq!(ed.view().row_off(), 21);
        assert!(out.is_empty());
        assert!(dest.starts_with(b"\x1b[?25l\x1b[H21\x1b[K"));
    }
}
