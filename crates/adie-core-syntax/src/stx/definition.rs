use crate::stx::error::SyntaxError;
use crate::stx::rule::{Match, ROOT_RULE, Rule, RuleKind, StyleContext};
use adie_core::Style;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::path::Path;

/// Word delimiters used when a language does not declare its own.
pub const DEFAULT_DELIMITERS: &str = "~.,/\\`'!@#$%^&*()-=+{}|[]\":;<>? \t\n";

/// Default number of lines the restyler looks around an edit.
pub const DEFAULT_CONTEXT_LINES: usize = 1;

/// Default number of characters the restyler looks around an edit.
pub const DEFAULT_CONTEXT_CHARS: usize = 1;

/// Most rules a single language can hold (style indices are bytes).
pub const MAX_RULES: usize = Style::MAX as usize + 1;

#[derive(Debug, Clone)]
/// One language: file association data plus its rule tree.
///
/// Rule 0 is always the root. Rules are appended bottom-up, so a parent always exists before
/// its children and style indices are dense in append order.
pub struct Syntax {
    language: String,
    extensions: String,
    contents: String,
    delimiters: String,
    context_lines: usize,
    context_chars: usize,
    rules: Vec<Rule>,
    file_matcher: Option<GlobSet>,
    contents_matcher: Option<Regex>,
}

impl Syntax {
    /// Create a language whose root is a [`RuleKind::Default`] rule named `"Default"`.
    pub fn new(language: impl Into<String>) -> Self {
        Self::with_root(language, "Default", RuleKind::Default)
    }

    /// Create a language with an arbitrary root rule.
    ///
    /// Grammar files always produce a default root; other roots exist for hosts that build
    /// rule trees by hand. A root that can close (e.g. a bracket) does not tile arbitrary text,
    /// and the restyler reports it as [`SyntaxError::IncompleteCoverage`].
    pub fn with_root(language: impl Into<String>, name: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            language: language.into(),
            extensions: String::new(),
            contents: String::new(),
            delimiters: DEFAULT_DELIMITERS.to_string(),
            context_lines: DEFAULT_CONTEXT_LINES,
            context_chars: DEFAULT_CONTEXT_CHARS,
            rules: vec![Rule::new(name, ROOT_RULE, ROOT_RULE, kind)],
            file_matcher: None,
            contents_matcher: None,
        }
    }

    /// Language name.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Wildcard list used to associate file names with this language.
    pub fn extensions(&self) -> &str {
        &self.extensions
    }

    /// Set the wildcard list (`*.c,*.h` or `*.c|*.h`).
    pub fn set_extensions(&mut self, patterns: &str) -> Result<(), globset::Error> {
        let mut builder = GlobSetBuilder::new();
        let mut any = false;
        for pattern in patterns
            .split([',', '|'])
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            builder.add(Glob::new(pattern)?);
            any = true;
        }
        self.file_matcher = if any { Some(builder.build()?) } else { None };
        self.extensions = patterns.to_string();
        Ok(())
    }

    /// Regex used to recognize this language by content.
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Set the content-sniffing regex.
    pub fn set_contents(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.contents_matcher = if pattern.is_empty() {
            None
        } else {
            Some(Regex::new(pattern)?)
        };
        self.contents = pattern.to_string();
        Ok(())
    }

    /// Characters that separate words in this language.
    pub fn delimiters(&self) -> &str {
        &self.delimiters
    }

    /// Set the word delimiters.
    pub fn set_delimiters(&mut self, delimiters: impl Into<String>) {
        self.delimiters = delimiters.into();
    }

    /// Returns `true` if `c` separates words in this language.
    pub fn is_delimiter(&self, c: char) -> bool {
        self.delimiters.contains(c)
    }

    /// Lines of context the restyler examines around an edit.
    pub fn context_lines(&self) -> usize {
        self.context_lines
    }

    /// Set the lines of context.
    pub fn set_context_lines(&mut self, lines: usize) {
        self.context_lines = lines;
    }

    /// Characters of context the restyler examines around an edit.
    pub fn context_chars(&self) -> usize {
        self.context_chars
    }

    /// Set the characters of context.
    pub fn set_context_chars(&mut self, chars: usize) {
        self.context_chars = chars;
    }

    /// Append a rule under `parent` and return its style index.
    pub fn append_rule(
        &mut self,
        name: impl Into<String>,
        kind: RuleKind,
        parent: Style,
    ) -> Result<Style, SyntaxError> {
        let is_container = self
            .rules
            .get(usize::from(parent))
            .is_some_and(|p| p.kind.is_container());
        if !is_container {
            return Err(SyntaxError::InvalidParent {
                parent: usize::from(parent),
            });
        }
        let Ok(style) = Style::try_from(self.rules.len()) else {
            return Err(SyntaxError::TooManyRules {
                language: self.language.clone(),
            });
        };
        self.rules.push(Rule::new(name, style, parent, kind));
        self.rules[usize::from(parent)].children.push(style);
        Ok(style)
    }

    /// The rule with index `style`.
    pub fn rule(&self, style: Style) -> Option<&Rule> {
        self.rules.get(usize::from(style))
    }

    /// All rules in style order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules, root included.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Style of the first rule called `name`.
    pub fn named_rule(&self, name: &str) -> Option<Style> {
        self.rules.iter().find(|r| r.name == name).map(|r| r.style)
    }

    /// Parent of `style`, or `None` for the root (and for unknown styles).
    pub fn parent_of(&self, style: Style) -> Option<Style> {
        if style == ROOT_RULE {
            return None;
        }
        self.rule(style).map(|r| r.parent)
    }

    /// Returns `true` if `parent` is `child` or encloses it.
    pub fn is_ancestor(&self, parent: Style, child: Style) -> bool {
        let mut current = child;
        loop {
            if current == parent {
                return true;
            }
            match self.parent_of(current) {
                Some(next) => current = next,
                None => return false,
            }
        }
    }

    /// The innermost rule enclosing both `a` and `b`.
    ///
    /// Falls back to the root when either style is unknown.
    pub fn common_ancestor(&self, a: Style, b: Style) -> Style {
        if self.rule(a).is_none() || self.rule(b).is_none() {
            return ROOT_RULE;
        }
        let mut current = a;
        loop {
            if self.is_ancestor(current, b) {
                return current;
            }
            match self.parent_of(current) {
                Some(next) => current = next,
                None => return ROOT_RULE,
            }
        }
    }

    /// The innermost rule at or above `style` that can be resumed in the middle of text.
    ///
    /// Leaf rules only ever match whole tokens, so styling resumes in their parent.
    pub fn container_of(&self, style: Style) -> Style {
        let mut current = style;
        loop {
            match self.rule(current) {
                Some(rule) if rule.kind.is_container() => return current,
                Some(rule) => current = rule.parent,
                None => return ROOT_RULE,
            }
        }
    }

    /// Returns `true` if `path` matches the `filesmatch` wildcards.
    ///
    /// The file name is tried first, then the full path.
    pub fn match_filename(&self, path: impl AsRef<Path>) -> bool {
        let Some(matcher) = &self.file_matcher else {
            return false;
        };
        let path = path.as_ref();
        path.file_name().is_some_and(|name| matcher.is_match(name)) || matcher.is_match(path)
    }

    /// Returns `true` if the `contentsmatch` regex finds a match in `text`.
    pub fn match_contents(&self, text: &str) -> bool {
        self.contents_matcher
            .as_ref()
            .is_some_and(|re| re.is_match(text))
    }

    /// Try rule `style` at exactly `from`, writing into `styles` (one entry per byte of `text`).
    ///
    /// # Panics
    ///
    /// Panics if `style` is unknown, `styles` is shorter than `text`, or `from..to` is not a
    /// character-aligned range of `text`.
    pub fn stylize(
        &self,
        style: Style,
        text: &str,
        styles: &mut [Style],
        from: usize,
        to: usize,
    ) -> Match {
        let mut cx = StyleContext {
            rules: &self.rules,
            text,
            styles,
            base: 0,
        };
        self.rules[usize::from(style)].stylize(&mut cx, from, to)
    }

    /// Style the body of rule `style` over `from..to`, as if the rule were already open.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Syntax::stylize`].
    pub fn stylize_body(
        &self,
        style: Style,
        text: &str,
        styles: &mut [Style],
        from: usize,
        to: usize,
    ) -> Match {
        let mut cx = StyleContext {
            rules: &self.rules,
            text,
            styles,
            base: 0,
        };
        self.rules[usize::from(style)].stylize_body(&mut cx, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stx::pattern::Pattern;

    fn simple(src: &str) -> RuleKind {
        RuleKind::Simple {
            pattern: Pattern::new(src).unwrap(),
        }
    }

    fn bracket(open: &str, close: &str) -> RuleKind {
        RuleKind::Bracket {
            open: Pattern::new(open).unwrap(),
            close: Pattern::new(close).unwrap(),
        }
    }

    fn nested() -> Syntax {
        let mut syntax = Syntax::new("Nested");
        let block = syntax.append_rule("Block", bracket("\\{", "\\}"), 0).unwrap();
        let inner = syntax.append_rule("Inner", bracket("\\(", "\\)"), block).unwrap();
        syntax.append_rule("Number", simple("[0-9]+"), inner).unwrap();
        syntax.append_rule("Word", simple("[a-z]+"), 0).unwrap();
        syntax
    }

    #[test]
    fn test_styles_are_dense_in_append_order() {
        let syntax = nested();
        let styles: Vec<_> = syntax.rules().iter().map(|r| r.style()).collect();
        assert_eq!(styles, vec![0, 1, 2, 3, 4]);
        assert_eq!(syntax.rule(0).unwrap().children(), &[1, 4]);
        assert_eq!(syntax.rule(2).unwrap().parent(), 1);
        assert_eq!(syntax.named_rule("Number"), Some(3));
        assert_eq!(syntax.named_rule("Missing"), None);
    }

    #[test]
    fn test_ancestry() {
        let syntax = nested();
        assert!(syntax.is_ancestor(0, 3));
        assert!(syntax.is_ancestor(1, 3));
        assert!(syntax.is_ancestor(2, 3));
        assert!(syntax.is_ancestor(3, 3));
        assert!(!syntax.is_ancestor(3, 1));
        assert!(!syntax.is_ancestor(4, 3));
        assert!(!syntax.is_ancestor(1, 4));
        assert!(!syntax.is_ancestor(9, 3));

        assert_eq!(syntax.common_ancestor(3, 4), 0);
        assert_eq!(syntax.common_ancestor(3, 2), 2);
        assert_eq!(syntax.common_ancestor(3, 1), 1);
        assert_eq!(syntax.common_ancestor(3, 200), 0);

        assert_eq!(syntax.container_of(3), 2);
        assert_eq!(syntax.container_of(4), 0);
        assert_eq!(syntax.container_of(1), 1);
    }

    #[test]
    fn test_leaf_rules_cannot_have_children() {
        let mut syntax = nested();
        assert!(matches!(
            syntax.append_rule("Bad", simple("x"), 4),
            Err(SyntaxError::InvalidParent { parent: 4 })
        ));
        assert!(matches!(
            syntax.append_rule("Bad", simple("x"), 42),
            Err(SyntaxError::InvalidParent { parent: 42 })
        ));
    }

    #[test]
    fn test_rule_limit() {
        let mut syntax = Syntax::new("Big");
        for i in 1..MAX_RULES {
            syntax.append_rule(format!("R{i}"), simple("x"), 0).unwrap();
        }
        assert!(matches!(
            syntax.append_rule("Overflow", simple("x"), 0),
            Err(SyntaxError::TooManyRules { .. })
        ));
        assert_eq!(syntax.rule_count(), MAX_RULES);
    }

    #[test]
    fn test_default_rule_covers_everything() {
        let syntax = nested();
        let text = "ab {x (12) y} 7 é";
        let mut styles = vec![0xff; text.len()];
        let result = syntax.stylize_body(0, text, &mut styles, 0, text.len());
        assert_eq!(result, Match::Open(0..text.len()));
        assert!(styles.iter().all(|&s| s != 0xff));
    }

    #[test]
    fn test_nested_brackets() {
        let syntax = nested();
        let text = "a{b(1)c}";
        let mut styles = vec![0; text.len()];
        syntax.stylize_body(0, text, &mut styles, 0, text.len());
        assert_eq!(styles, vec![4, 1, 1, 2, 3, 2, 1, 1]);
    }

    #[test]
    fn test_unclosed_bracket_stays_open() {
        let syntax = nested();
        let text = "{ab";
        let mut styles = vec![0; text.len()];
        assert_eq!(
            syntax.stylize(1, text, &mut styles, 0, text.len()),
            Match::Open(0..3)
        );
        assert_eq!(styles, vec![1, 1, 1]);
        assert_eq!(
            syntax.stylize(1, text, &mut styles, 1, text.len()),
            Match::NoMatch
        );
    }

    #[test]
    fn test_file_and_content_matching() {
        let mut syntax = Syntax::new("C");
        syntax.set_extensions("*.c, *.h|Makefile.c*").unwrap();
        syntax.set_contents("^#include").unwrap();

        assert!(syntax.match_filename("main.c"));
        assert!(syntax.match_filename("/usr/include/stdio.h"));
        assert!(syntax.match_filename("Makefile.cfg"));
        assert!(!syntax.match_filename("main.rs"));
        assert!(syntax.match_contents("#include <stdio.h>\n"));
        assert!(!syntax.match_contents("int x;"));

        assert!(syntax.set_extensions("[*.c").is_err());
        assert!(syntax.set_contents("(").is_err());
        assert!(syntax.is_delimiter(';'));
        assert!(!syntax.is_delimiter('_'));
    }
}
