//! Incremental restyling.
//!
//! After an edit only the text around the edit is re-lexed. The restyler
//!
//! 1. walks back from the edit to a position whose rule is known from the style buffer alone
//!    (a run boundary, resolved through the ancestor relation between the two rules that meet
//!    there),
//! 2. styles forward with that rule's body up to a little past the edit,
//! 3. continues in the parent rule whenever the resumed rule closes early, and
//! 4. keeps widening the window (80 bytes, doubling) until the fresh styles agree with the old
//!    ones past the edit.
//!
//! The work done is proportional to the region whose styling actually changed.

use crate::stx::definition::Syntax;
use crate::stx::error::SyntaxError;
use crate::stx::rule::{Match, ROOT_RULE, StyleContext};
use adie_core::{Style, StyledBuffer, TextEdit};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Initial widening step, in bytes.
pub const RESTYLE_JUMP: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Tuning knobs for [`Restyler`].
pub struct RestyleOptions {
    /// Initial widening step when fresh styles keep differing past the edit; doubles on every
    /// retry.
    pub jump: usize,
}

impl Default for RestyleOptions {
    fn default() -> Self {
        Self { jump: RESTYLE_JUMP }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// What a restyle call did.
pub struct RestyleReport {
    /// Where re-lexing started.
    pub start: usize,
    /// Where re-lexing stopped.
    pub end: usize,
    /// Bytes whose style was actually rewritten (empty if none).
    pub rewritten: Range<usize>,
    /// Number of range passes, counting parent escalations and widenings.
    pub passes: usize,
}

impl RestyleReport {
    fn record(&mut self, changed: &Range<usize>) {
        if self.rewritten.is_empty() {
            self.rewritten = changed.clone();
        } else {
            self.rewritten.start = self.rewritten.start.min(changed.start);
            self.rewritten.end = self.rewritten.end.max(changed.end);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of restyling one range with one rule.
pub struct RangeOutcome {
    /// Where the rule stopped: the end of the range, or earlier if it closed.
    pub stop: usize,
    /// Bytes whose style differed from the previous styling, if any.
    pub changed: Option<Range<usize>>,
}

/// Restyles [`StyledBuffer`]s with one syntax.
#[derive(Debug, Clone, Copy)]
pub struct Restyler<'a> {
    syntax: &'a Syntax,
    options: RestyleOptions,
}

impl<'a> Restyler<'a> {
    /// Create a restyler with default options.
    pub fn new(syntax: &'a Syntax) -> Self {
        Self::with_options(syntax, RestyleOptions::default())
    }

    /// Create a restyler with explicit options.
    pub fn with_options(syntax: &'a Syntax, options: RestyleOptions) -> Self {
        Self { syntax, options }
    }

    /// The syntax driving this restyler.
    pub fn syntax(&self) -> &'a Syntax {
        self.syntax
    }

    /// Style the whole buffer from scratch.
    pub fn restyle_all(&self, buffer: &mut StyledBuffer) -> Result<RestyleReport, SyntaxError> {
        let len = buffer.len();
        let outcome = self.restyle_range(buffer, 0, len, ROOT_RULE)?;
        let mut report = RestyleReport {
            start: 0,
            end: len,
            rewritten: 0..0,
            passes: 1,
        };
        if let Some(changed) = &outcome.changed {
            report.record(changed);
        }
        if outcome.stop < len {
            return Err(self.coverage_defect(ROOT_RULE, outcome.stop, len));
        }
        tracing::debug!(
            language = self.syntax.language(),
            len,
            rewritten = ?report.rewritten,
            "restyle.all"
        );
        Ok(report)
    }

    /// Restyle after `edit` was applied to `buffer`.
    ///
    /// On [`SyntaxError::IncompleteCoverage`] the styles computed so far are kept.
    pub fn restyle(
        &self,
        buffer: &mut StyledBuffer,
        edit: &TextEdit,
    ) -> Result<RestyleReport, SyntaxError> {
        let len = buffer.len();
        let changed = buffer.ceil_char_boundary(edit.changed_end());
        let (mut beg, mut rule) = self.find_restyle_point(buffer, edit.pos.min(len));
        let mut end = self.forward_by_context(buffer, changed);
        let mut settled = changed;
        let mut jump = self.options.jump.max(1);

        let mut report = RestyleReport {
            start: beg,
            end,
            rewritten: beg..beg,
            passes: 0,
        };

        loop {
            let outcome = self.restyle_range(buffer, beg, end, rule)?;
            report.passes += 1;
            if let Some(range) = &outcome.changed {
                report.record(range);
            }
            tracing::trace!(
                beg,
                end,
                rule,
                stop = outcome.stop,
                changed = ?outcome.changed,
                "restyle.pass"
            );

            if outcome.stop < end {
                // The resumed rule closed inside the window; carry on in its parent.
                let Some(parent) = self.syntax.parent_of(rule) else {
                    return Err(self.coverage_defect(rule, outcome.stop, end));
                };
                beg = outcome.stop;
                rule = parent;
                end = end.max(self.forward_by_context(buffer, beg));
                continue;
            }

            let converged = outcome.changed.as_ref().is_none_or(|r| r.end <= settled);
            if converged || end >= len {
                break;
            }
            settled = end;
            end = buffer.ceil_char_boundary(end.saturating_add(jump));
            jump = jump.saturating_mul(2);
        }

        report.end = end;
        tracing::debug!(
            language = self.syntax.language(),
            pos = edit.pos,
            deleted = edit.deleted,
            inserted = edit.inserted,
            start = report.start,
            end = report.end,
            rewritten = ?report.rewritten,
            passes = report.passes,
            "restyle.edit"
        );
        Ok(report)
    }

    /// Find where styling can resume before `pos`, and in which rule.
    pub fn find_restyle_point(&self, buffer: &StyledBuffer, pos: usize) -> (usize, Style) {
        let probe = self.backward_by_context(buffer, pos);
        if probe == 0 {
            return (0, ROOT_RULE);
        }

        let running = buffer.style_at(probe);
        if running == ROOT_RULE {
            return (probe, ROOT_RULE);
        }

        // Look for the run boundary, but never further back than one more context step.
        let window = self.backward_by_context(buffer, probe);
        let styles = buffer.styles();
        let mut at = probe;
        while at > 0 {
            let before = styles[at - 1];
            if before != running {
                return (at, self.resume_rule(before, running));
            }
            if at == window {
                // Assume the run continues; two adjacent spans of one rule look the same here.
                return (at, self.syntax.container_of(running));
            }
            at -= 1;
        }
        (0, ROOT_RULE)
    }

    /// Step back from `pos` by the language's context lines and characters.
    pub fn backward_by_context(&self, buffer: &StyledBuffer, pos: usize) -> usize {
        let by_lines = buffer.prev_line(pos, self.syntax.context_lines());
        let by_chars = pos.saturating_sub(self.syntax.context_chars().max(1));
        buffer.floor_char_boundary(by_lines.min(by_chars))
    }

    /// Step forward from `pos` by the language's context lines and characters.
    pub fn forward_by_context(&self, buffer: &StyledBuffer, pos: usize) -> usize {
        let by_lines = buffer.next_line(pos, self.syntax.context_lines());
        let by_chars = pos.saturating_add(self.syntax.context_chars());
        buffer.ceil_char_boundary(by_lines.max(by_chars))
    }

    /// Style `beg..end` with the body of `rule` and write back whatever changed.
    ///
    /// Bytes past the point where the rule closes are left alone.
    pub fn restyle_range(
        &self,
        buffer: &mut StyledBuffer,
        beg: usize,
        end: usize,
        rule: Style,
    ) -> Result<RangeOutcome, SyntaxError> {
        let Some(resumed) = self.syntax.rule(rule) else {
            return Err(SyntaxError::InvalidParent {
                parent: usize::from(rule),
            });
        };

        let mut fresh = buffer.styles()[beg..end].to_vec();
        let matched = {
            let mut cx = StyleContext {
                rules: self.syntax.rules(),
                text: buffer.text(),
                styles: &mut fresh,
                base: beg,
            };
            resumed.stylize_body(&mut cx, beg, end)
        };
        let stop = match matched {
            Match::Closed(range) | Match::Open(range) => range.end,
            Match::NoMatch => beg,
        };

        let old = &buffer.styles()[beg..stop];
        let new = &fresh[..stop - beg];
        let head = old.iter().zip(new).position(|(a, b)| a != b);
        let changed = head.map(|head| {
            let tail = old
                .iter()
                .zip(new)
                .rposition(|(a, b)| a != b)
                .map_or(head + 1, |t| t + 1);
            beg + head..beg + tail
        });

        if let Some(range) = &changed {
            buffer.change_style(range.start, &fresh[range.start - beg..range.end - beg])?;
        }
        Ok(RangeOutcome { stop, changed })
    }

    fn resume_rule(&self, before: Style, after: Style) -> Style {
        let rule = if self.syntax.is_ancestor(before, after) {
            before
        } else if self.syntax.is_ancestor(after, before) {
            after
        } else {
            self.syntax.common_ancestor(before, after)
        };
        self.syntax.container_of(rule)
    }

    fn coverage_defect(&self, rule: Style, at: usize, end: usize) -> SyntaxError {
        tracing::warn!(
            language = self.syntax.language(),
            rule,
            at,
            end,
            "top-level rule does not cover the text; styling left incomplete"
        );
        SyntaxError::IncompleteCoverage { rule, at, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stx::parser::parse_grammar;
    use pretty_assertions::assert_eq;

    const GRAMMAR: &str = r#"
language "Test"
  rule "Comment" pattern "//.*" end
  rule "Block" openpattern "/\*" closepattern "\*/"
    rule "Todo" pattern "TODO" end
  end
  rule "String" openpattern "\"" closepattern "\"" stoppattern "\n" end
end
"#;

    fn syntax() -> Syntax {
        parse_grammar(GRAMMAR).unwrap().remove(0)
    }

    fn styled(syntax: &Syntax, text: &str) -> StyledBuffer {
        let mut buffer = StyledBuffer::new(text);
        Restyler::new(syntax).restyle_all(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_restyle_point_at_default_style() {
        let syntax = syntax();
        let buffer = styled(&syntax, "one\ntwo\nthree\nfour");
        let restyler = Restyler::new(&syntax);
        // One line above the edited line.
        assert_eq!(restyler.find_restyle_point(&buffer, 15), (8, ROOT_RULE));
        assert_eq!(restyler.find_restyle_point(&buffer, 14), (8, ROOT_RULE));
        assert_eq!(restyler.find_restyle_point(&buffer, 2), (0, ROOT_RULE));
    }

    #[test]
    fn test_restyle_point_inside_bracket_stops_at_window_edge() {
        let syntax = syntax();
        let text = "x\n/* a\nb\nc\nd */";
        let buffer = styled(&syntax, text);
        // Editing "d" (offset 11): probe lands at the start of "c", inside the block. The block
        // run reaches past one more context step, so the walk stops at the start of "b" and
        // resumes in the block.
        assert_eq!(
            Restyler::new(&syntax).find_restyle_point(&buffer, 11),
            (7, 2)
        );
        assert_eq!(
            Restyler::new(&syntax).find_restyle_point(&buffer, 9),
            (2, ROOT_RULE)
        );
    }

    #[test]
    fn test_restyle_point_after_nested_child() {
        let syntax = syntax();
        let text = "/*\nTODO\nx\ny\n*/";
        let buffer = styled(&syntax, text);
        let restyler = Restyler::new(&syntax);
        // The run boundary after "TODO" resumes in the enclosing block.
        assert_eq!(restyler.find_restyle_point(&buffer, 10), (7, 2));
        // Probing at "TODO" itself resumes in the block, where the leaf rule can match again.
        assert_eq!(restyler.find_restyle_point(&buffer, 8), (3, 2));
    }

    #[test]
    fn test_restyle_range_reports_changes() {
        let syntax = syntax();
        let mut buffer = StyledBuffer::new("a /* b */ c");
        let restyler = Restyler::new(&syntax);

        let outcome = restyler.restyle_range(&mut buffer, 0, 11, ROOT_RULE).unwrap();
        assert_eq!(outcome, RangeOutcome { stop: 11, changed: Some(2..9) });

        let outcome = restyler.restyle_range(&mut buffer, 0, 11, ROOT_RULE).unwrap();
        assert_eq!(outcome, RangeOutcome { stop: 11, changed: None });

        // Resuming inside the block closes it at 9 and touches nothing past that.
        let outcome = restyler.restyle_range(&mut buffer, 4, 11, 2).unwrap();
        assert_eq!(outcome, RangeOutcome { stop: 9, changed: None });
    }

    #[test]
    fn test_opening_a_comment_restyles_to_the_end() {
        let syntax = syntax();
        let mut text = String::from("a\n");
        for i in 0..100 {
            text.push_str(&format!("line {i}\n"));
        }
        let mut buffer = styled(&syntax, &text);
        let edit = buffer.insert(0, "/*").unwrap();
        let report = Restyler::new(&syntax).restyle(&mut buffer, &edit).unwrap();

        assert_eq!(report.end, buffer.len());
        assert!(report.passes > 1);
        assert!(buffer.styles().iter().all(|&s| s == 2));
    }

    #[test]
    fn test_closing_a_string_early() {
        let syntax = syntax();
        let mut buffer = styled(&syntax, "\"abc\nx = 1\n");
        // The stop pattern ends the string and takes its style.
        assert_eq!(buffer.style_at(4), 4);
        assert_eq!(buffer.style_at(5), 0);

        let edit = buffer.insert(2, "\"").unwrap();
        let report = Restyler::new(&syntax).restyle(&mut buffer, &edit).unwrap();

        assert_eq!(buffer.text(), "\"a\"bc\nx = 1\n");
        assert_eq!(&buffer.styles()[..6], &[4, 4, 4, 0, 0, 0]);
        assert_eq!(report.rewritten, 2..6);
    }

    #[test]
    fn test_closing_bracket_escalates_to_parent() {
        let syntax = syntax();
        let mut buffer = styled(&syntax, "/*\na\nb\nc */ d\n");
        let edit = buffer.insert(7, "x").unwrap();
        let report = Restyler::new(&syntax).restyle(&mut buffer, &edit).unwrap();

        // Resumed inside the block, which closed before the window end, then the root went on.
        assert_eq!(report.start, 3);
        assert_eq!(report.passes, 2);
        assert_eq!(report.rewritten, 7..8);

        let expected = styled(&syntax, buffer.text());
        assert_eq!(buffer.styles(), expected.styles());
    }

    #[test]
    fn test_noop_edit_is_idempotent() {
        let syntax = syntax();
        let mut buffer = styled(&syntax, "a // b\n/* c\n d */ \"e\"\n");
        let before = buffer.clone();
        let restyler = Restyler::new(&syntax);

        for pos in 0..buffer.len() {
            let report = restyler.restyle(&mut buffer, &TextEdit::touch(pos)).unwrap();
            assert!(report.rewritten.is_empty(), "pos {pos}: {report:?}");
        }
        assert_eq!(buffer, before);
    }
}
