//! Style runs.
//!
//! Renderers rarely want the style buffer byte by byte. [`StyleRuns`] walks it and yields
//! maximal half-open ranges that share a single style.

use crate::buffer::Style;
use std::ops::Range;

/// A maximal run of bytes sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRun {
    /// Start offset (bytes).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Style of every byte in the run.
    pub style: Style,
}

impl StyleRun {
    /// Create a new run with `[start, end)` offsets and a style.
    pub fn new(start: usize, end: usize, style: Style) -> Self {
        Self { start, end, style }
    }

    /// Check if the run contains a specific position.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Length of the run in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` for a zero-length run.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// The run as a byte range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Iterator over the runs of a style buffer.
#[derive(Debug, Clone)]
pub struct StyleRuns<'a> {
    styles: &'a [Style],
    pos: usize,
}

impl<'a> StyleRuns<'a> {
    /// Iterate over the runs of `styles`.
    pub fn new(styles: &'a [Style]) -> Self {
        Self { styles, pos: 0 }
    }
}

impl Iterator for StyleRuns<'_> {
    type Item = StyleRun;

    fn next(&mut self) -> Option<StyleRun> {
        let start = self.pos;
        let style = *self.styles.get(start)?;
        let len = self.styles[start..]
            .iter()
            .position(|&s| s != style)
            .unwrap_or(self.styles.len() - start);
        self.pos = start + len;
        Some(StyleRun::new(start, self.pos, style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_are_maximal() {
        let styles = [0, 0, 1, 1, 1, 0, 2];
        let runs: Vec<_> = StyleRuns::new(&styles).collect();
        assert_eq!(
            runs,
            vec![
                StyleRun::new(0, 2, 0),
                StyleRun::new(2, 5, 1),
                StyleRun::new(5, 6, 0),
                StyleRun::new(6, 7, 2),
            ]
        );
        assert!(runs[1].contains(4));
        assert!(!runs[1].contains(5));
    }

    #[test]
    fn test_runs_of_empty_buffer() {
        assert_eq!(StyleRuns::new(&[]).count(), 0);
    }
}
