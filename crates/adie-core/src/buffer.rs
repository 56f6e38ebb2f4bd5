//! Styled text storage.
//!
//! [`StyledBuffer`] keeps UTF-8 text together with one style byte per text byte. Every byte of
//! a multi-byte character carries the same style; writers are expected to keep it that way.

use crate::delta::TextEdit;
use crate::runs::StyleRuns;
use std::ops::Range;
use thiserror::Error;

/// Style index stored per byte of text.
///
/// Style `0` is the default (unstyled) style; every other value is assigned by a highlighter.
pub type Style = u8;

/// The style given to freshly inserted text.
pub const DEFAULT_STYLE: Style = 0;

/// Errors produced by [`StyledBuffer`] modifications.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// A position or range end lies past the end of the buffer.
    #[error("offset {offset} is out of range (buffer length {len})")]
    OutOfRange {
        /// The offending byte offset.
        offset: usize,
        /// Current buffer length in bytes.
        len: usize,
    },

    /// A position splits a UTF-8 encoded character.
    #[error("offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// Text plus a parallel style buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledBuffer {
    text: String,
    styles: Vec<Style>,
}

impl StyledBuffer {
    /// Create a buffer holding `text`, entirely in the default style.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let styles = vec![DEFAULT_STYLE; text.len()];
        Self { text, styles }
    }

    /// The buffer text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The style buffer, one entry per byte of [`text`](Self::text).
    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Style at `pos`, or the default style past the end.
    pub fn style_at(&self, pos: usize) -> Style {
        self.styles.get(pos).copied().unwrap_or(DEFAULT_STYLE)
    }

    /// Returns `true` if `pos` is a valid place to split the text.
    pub fn is_char_boundary(&self, pos: usize) -> bool {
        self.text.is_char_boundary(pos)
    }

    /// Largest character boundary `<= pos` (clamped to the buffer length).
    pub fn floor_char_boundary(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.len());
        while !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    /// Smallest character boundary `>= pos` (clamped to the buffer length).
    pub fn ceil_char_boundary(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.len());
        while !self.text.is_char_boundary(pos) {
            pos += 1;
        }
        pos
    }

    /// Start of the line containing `pos`.
    pub fn line_start(&self, pos: usize) -> usize {
        let pos = pos.min(self.len());
        self.text.as_bytes()[..pos]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |nl| nl + 1)
    }

    /// End of the line containing `pos` (the offset of its `\n`, or the buffer length).
    pub fn line_end(&self, pos: usize) -> usize {
        let pos = pos.min(self.len());
        self.text.as_bytes()[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.len(), |nl| pos + nl)
    }

    /// Start of the line `n` lines below the line containing `pos`.
    ///
    /// Clamped to the buffer length; `n == 0` is the start of the current line.
    pub fn next_line(&self, pos: usize, n: usize) -> usize {
        let mut start = self.line_start(pos);
        for _ in 0..n {
            let end = self.line_end(start);
            if end >= self.len() {
                return self.len();
            }
            start = end + 1;
        }
        start
    }

    /// Start of the line `n` lines above the line containing `pos`.
    ///
    /// Clamped to zero; `n == 0` is the start of the current line.
    pub fn prev_line(&self, pos: usize, n: usize) -> usize {
        let mut start = self.line_start(pos);
        for _ in 0..n {
            if start == 0 {
                return 0;
            }
            start = self.line_start(start - 1);
        }
        start
    }

    /// Overwrite the styles starting at `pos` with `styles`.
    pub fn change_style(&mut self, pos: usize, styles: &[Style]) -> Result<(), BufferError> {
        let end = pos.saturating_add(styles.len());
        self.check_offset(end)?;
        self.styles[pos..end].copy_from_slice(styles);
        Ok(())
    }

    /// Set every byte in `range` to `style`.
    pub fn fill_style(&mut self, range: Range<usize>, style: Style) -> Result<(), BufferError> {
        self.check_offset(range.end)?;
        if range.start > range.end {
            return Err(BufferError::OutOfRange {
                offset: range.start,
                len: self.len(),
            });
        }
        self.styles[range].fill(style);
        Ok(())
    }

    /// Reset the whole buffer to the default style.
    pub fn clear_styles(&mut self) {
        self.styles.fill(DEFAULT_STYLE);
    }

    /// Replace `deleted` bytes at `pos` with `inserted`.
    ///
    /// Styles of the removed text are dropped; the inserted text gets [`DEFAULT_STYLE`] until a
    /// highlighter restyles it. The returned [`TextEdit`] is what the highlighter needs to do so.
    pub fn replace(
        &mut self,
        pos: usize,
        deleted: usize,
        inserted: &str,
    ) -> Result<TextEdit, BufferError> {
        let end = pos.saturating_add(deleted);
        self.check_offset(end)?;
        self.check_boundary(pos)?;
        self.check_boundary(end)?;

        self.text.replace_range(pos..end, inserted);
        self.styles.splice(
            pos..end,
            std::iter::repeat_n(DEFAULT_STYLE, inserted.len()),
        );
        debug_assert_eq!(self.text.len(), self.styles.len());

        Ok(TextEdit::new(pos, deleted, inserted.len()))
    }

    /// Insert `text` at `pos`.
    pub fn insert(&mut self, pos: usize, text: &str) -> Result<TextEdit, BufferError> {
        self.replace(pos, 0, text)
    }

    /// Remove `len` bytes at `pos`.
    pub fn delete(&mut self, pos: usize, len: usize) -> Result<TextEdit, BufferError> {
        self.replace(pos, len, "")
    }

    /// Replace the whole text, resetting all styles.
    pub fn set_text(&mut self, text: impl Into<String>) -> TextEdit {
        let deleted = self.len();
        *self = Self::new(text);
        TextEdit::new(0, deleted, self.len())
    }

    /// Iterate over maximal runs of equal style.
    pub fn runs(&self) -> StyleRuns<'_> {
        StyleRuns::new(&self.styles)
    }

    fn check_offset(&self, offset: usize) -> Result<(), BufferError> {
        if offset > self.len() {
            return Err(BufferError::OutOfRange {
                offset,
                len: self.len(),
            });
        }
        Ok(())
    }

    fn check_boundary(&self, offset: usize) -> Result<(), BufferError> {
        if !self.text.is_char_boundary(offset) {
            return Err(BufferError::NotCharBoundary(offset));
        }
        Ok(())
    }
}
