use crate::stx::pattern::Pattern;
use adie_core::Style;
use std::ops::Range;

/// Index of the root rule of every syntax.
pub const ROOT_RULE: Style = 0;

#[derive(Debug, Clone)]
/// The matching behaviour of a [`Rule`].
pub enum RuleKind {
    /// Matches unconditionally and colors every span no child claims.
    Default,
    /// Matches a single non-empty regex. Leaf only.
    Simple {
        /// The token pattern.
        pattern: Pattern,
    },
    /// Matches `open`, then children (or its own fallback style) until `close`.
    Bracket {
        /// Opening delimiter.
        open: Pattern,
        /// Closing delimiter.
        close: Pattern,
    },
    /// Like [`RuleKind::Bracket`], but gives up as soon as `stop` matches.
    SafeBracket {
        /// Opening delimiter.
        open: Pattern,
        /// Closing delimiter.
        close: Pattern,
        /// Escape hatch, tested before children and `close` at every position.
        stop: Pattern,
    },
}

impl RuleKind {
    /// Returns `true` for kinds that may own child rules.
    pub fn is_container(&self) -> bool {
        !matches!(self, Self::Simple { .. })
    }

    /// Short human-readable name of the kind.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Simple { .. } => "simple",
            Self::Bracket { .. } => "bracket",
            Self::SafeBracket { .. } => "safe-bracket",
        }
    }

    fn close(&self) -> Option<&Pattern> {
        match self {
            Self::Bracket { close, .. } | Self::SafeBracket { close, .. } => Some(close),
            _ => None,
        }
    }

    fn stop(&self) -> Option<&Pattern> {
        match self {
            Self::SafeBracket { stop, .. } => Some(stop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of trying a rule at a position.
///
/// Ranges always start at the probe position.
pub enum Match {
    /// The rule does not apply here.
    NoMatch,
    /// The rule matched and finished inside the range.
    Closed(Range<usize>),
    /// The rule matched and was still running when the range ran out; whoever continues
    /// styling past the range must continue inside this rule.
    Open(Range<usize>),
}

impl Match {
    /// Exclusive end of the matched text, if anything matched.
    pub fn end(&self) -> Option<usize> {
        match self {
            Self::NoMatch => None,
            Self::Closed(range) | Self::Open(range) => Some(range.end),
        }
    }

    /// Returns `true` unless this is [`Match::NoMatch`].
    pub fn is_match(&self) -> bool {
        !matches!(self, Self::NoMatch)
    }

    /// Returns `true` for [`Match::Open`].
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }
}

#[derive(Debug, Clone)]
/// A node of a syntax's rule tree.
///
/// Rules live in a flat arena owned by [`Syntax`](crate::Syntax); `parent` and `children` are
/// indices into it, and a rule's index doubles as its style.
pub struct Rule {
    pub(crate) name: String,
    pub(crate) style: Style,
    pub(crate) parent: Style,
    pub(crate) children: Vec<Style>,
    pub(crate) kind: RuleKind,
}

impl Rule {
    pub(crate) fn new(name: impl Into<String>, style: Style, parent: Style, kind: RuleKind) -> Self {
        Self {
            name: name.into(),
            style,
            parent,
            children: Vec::new(),
            kind,
        }
    }

    /// Display name; rules sharing a name share display attributes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Style index (equal to the rule's index in its syntax).
    pub fn style(&self) -> Style {
        self.style
    }

    /// Index of the enclosing rule. The root is its own parent.
    pub fn parent(&self) -> Style {
        self.parent
    }

    /// Child rules in match priority order.
    pub fn children(&self) -> &[Style] {
        &self.children
    }

    /// The matching behaviour.
    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Try this rule at exactly `from`, never styling past `to`.
    pub(crate) fn stylize(&self, cx: &mut StyleContext<'_, '_>, from: usize, to: usize) -> Match {
        match &self.kind {
            RuleKind::Default => self.stylize_body(cx, from, to),
            RuleKind::Simple { pattern } => match pattern.match_at(cx.text, from, to) {
                Some(end) => {
                    cx.fill(from..end, self.style);
                    Match::Closed(from..end)
                }
                None => Match::NoMatch,
            },
            RuleKind::Bracket { open, .. } | RuleKind::SafeBracket { open, .. } => {
                let Some(open_end) = open.match_at(cx.text, from, to) else {
                    return Match::NoMatch;
                };
                cx.fill(from..open_end, self.style);
                match self.stylize_body(cx, open_end, to) {
                    Match::Closed(body) => Match::Closed(from..body.end),
                    _ => Match::Open(from..to),
                }
            }
        }
    }

    /// Style the inside of this rule from `from` until it closes or `to` is reached.
    ///
    /// Never returns [`Match::NoMatch`]: a body always starts where it is asked to.
    pub(crate) fn stylize_body(
        &self,
        cx: &mut StyleContext<'_, '_>,
        from: usize,
        to: usize,
    ) -> Match {
        let rules = cx.rules;
        let close = self.kind.close();
        let stop = self.kind.stop();

        let mut pos = from;
        'scan: while pos < to {
            if let Some(end) = stop.and_then(|p| p.match_at(cx.text, pos, to)) {
                cx.fill(pos..end, self.style);
                return Match::Closed(from..end);
            }

            for &child in &self.children {
                match rules[usize::from(child)].stylize(cx, pos, to) {
                    Match::NoMatch => {}
                    Match::Closed(range) => {
                        pos = range.end;
                        continue 'scan;
                    }
                    Match::Open(_) => return Match::Open(from..to),
                }
            }

            if let Some(end) = close.and_then(|p| p.match_at(cx.text, pos, to)) {
                cx.fill(pos..end, self.style);
                return Match::Closed(from..end);
            }

            let next = next_char_boundary(cx.text, pos).min(to);
            cx.fill(pos..next, self.style);
            pos = next;
        }
        Match::Open(from..to)
    }
}

/// Destination of a stylize pass: the text being matched and a style slice that starts at
/// text offset `base`.
pub(crate) struct StyleContext<'t, 'o> {
    pub(crate) rules: &'t [Rule],
    pub(crate) text: &'t str,
    pub(crate) styles: &'o mut [Style],
    pub(crate) base: usize,
}

impl StyleContext<'_, '_> {
    fn fill(&mut self, range: Range<usize>, style: Style) {
        self.styles[range.start - self.base..range.end - self.base].fill(style);
    }
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(pos + 1, |c| pos + c.len_utf8())
}
