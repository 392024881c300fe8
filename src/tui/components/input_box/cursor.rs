//! Cursor position tracking and horizontal scrolling for the InputBox.
//!
//! `CursorState` owns the cursor byte offset. All methods accept
//! `buffer: &str` explicitly; the text itself is owned by `InputBox`.

use std::ops::Range;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub(super) struct CursorState {
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    pub pos: usize,
}

impl CursorState {
    pub fn new() -> Self {
        Self { pos: 0 }
    }

    /// Reset cursor to start (used after Submit clears the buffer).
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Returns `true` if the cursor moved.
    pub fn move_left(&mut self, buffer: &str) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos = prev_char_boundary(buffer, self.pos);
        true
    }

    pub fn move_right(&mut self, buffer: &str) -> bool {
        if self.pos >= buffer.len() {
            return false;
        }
        self.pos = next_char_boundary(buffer, self.pos);
        true
    }

    pub fn move_home(&mut self) -> bool {
        std::mem::replace(&mut self.pos, 0) != 0
    }

    pub fn move_end(&mut self, buffer: &str) -> bool {
        std::mem::replace(&mut self.pos, buffer.len()) != buffer.len()
    }

    /// Byte range of `buffer` shown in a field `width` columns wide, and the
    /// cursor's column within it. Leading chars are dropped until the cursor
    /// fits with its own cell free.
    pub fn window(&self, buffer: &str, width: u16) -> (Range<usize>, u16) {
        let width = usize::from(width.max(1));
        let before = &buffer[..self.pos];
        let mut start = 0;
        while before[start..].width() >= width {
            match before[start..].chars().next() {
                Some(c) => start += c.len_utf8(),
                None => break,
            }
        }
        let mut end = start;
        let mut used = 0;
        for c in buffer[start..].chars() {
            let w = c.width().unwrap_or(0);
            if used + w > width {
                break;
            }
            used += w;
            end += c.len_utf8();
        }
        let col = u16::try_from(before[start..].width()).unwrap_or(u16::MAX);
        (start..end, col)
    }
}

/// Byte offset of the char boundary before `pos`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte offset of the char boundary after `pos`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}
