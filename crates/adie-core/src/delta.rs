//! Edit notifications.
//!
//! A highlighter never diffs old and new text. Every modification of a
//! [`StyledBuffer`](crate::StyledBuffer) is described by a single [`TextEdit`], expressed in
//! **byte offsets** of the buffer *after* the edit was applied.

use std::ops::Range;

/// A single replacement: `deleted` bytes were removed at `pos` and `inserted` bytes put in
/// their place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextEdit {
    /// Byte offset of the edit.
    pub pos: usize,
    /// Number of bytes removed at `pos`.
    pub deleted: usize,
    /// Number of bytes inserted at `pos`.
    pub inserted: usize,
}

impl TextEdit {
    /// Create an edit notification.
    pub const fn new(pos: usize, deleted: usize, inserted: usize) -> Self {
        Self {
            pos,
            deleted,
            inserted,
        }
    }

    /// An edit that changes nothing at `pos`.
    ///
    /// Handy to ask a highlighter to re-check its work around a position.
    pub const fn touch(pos: usize) -> Self {
        Self::new(pos, 0, 0)
    }

    /// Exclusive end of the inserted text in the post-edit buffer.
    pub fn changed_end(&self) -> usize {
        self.pos.saturating_add(self.inserted)
    }

    /// Exclusive end of the removed text in the pre-edit buffer.
    pub fn deleted_end(&self) -> usize {
        self.pos.saturating_add(self.deleted)
    }

    /// The inserted range in the post-edit buffer.
    pub fn changed_range(&self) -> Range<usize> {
        self.pos..self.changed_end()
    }

    /// Returns `true` if nothing was removed or inserted.
    pub fn is_empty(&self) -> bool {
        self.deleted == 0 && self.inserted == 0
    }

    /// Signed change in buffer length caused by this edit.
    pub fn len_delta(&self) -> isize {
        self.inserted as isize - self.deleted as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_extents() {
        let edit = TextEdit::new(4, 2, 5);
        assert_eq!(edit.changed_end(), 9);
        assert_eq!(edit.deleted_end(), 6);
        assert_eq!(edit.changed_range(), 4..9);
        assert_eq!(edit.len_delta(), 3);
        assert!(!edit.is_empty());
        assert!(TextEdit::touch(7).is_empty());
    }
}
