//! Recursive-descent reader for `.stx` grammar files.
//!
//! # Syntax
//!
//! ```text
//! file         := language*
//! language     := "language" STRING languageattr* rule* "end"
//! languageattr := "filesmatch" STRING | "contentsmatch" STRING
//!               | "delimiters" STRING | "contextlines" INT | "contextchars" INT
//! rule         := "rule" STRING ruleattr* rule* "end"
//! ruleattr     := "pattern" STRING | "openpattern" STRING
//!               | "closepattern" STRING | "stoppattern" STRING
//! ```
//!
//! The kind of a rule follows from the patterns it declares:
//!
//! | patterns              | kind         |
//! |-----------------------|--------------|
//! | none                  | default      |
//! | open                  | simple       |
//! | open + close          | bracket      |
//! | open + close + stop   | safe bracket |
//!
//! `pattern` and `openpattern` are synonyms. Any error rejects the whole text.

use crate::stx::definition::Syntax;
use crate::stx::error::SyntaxError;
use crate::stx::lexer::{LineMap, Token, tokenize};
use crate::stx::pattern::Pattern;
use crate::stx::rule::{ROOT_RULE, RuleKind};
use adie_core::Style;
use std::ops::Range;

/// Parse grammar text into one [`Syntax`] per `language` block.
pub fn parse_grammar(src: &str) -> Result<Vec<Syntax>, SyntaxError> {
    let lines = LineMap::new(src);
    let tokens = tokenize(src, &lines)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        lines,
        eof: src.len(),
    };

    let mut syntaxes = Vec::new();
    while !parser.at_eof() {
        syntaxes.push(parser.parse_language()?);
    }
    Ok(syntaxes)
}

/// A pattern string together with where it was written.
struct PatternSource {
    text: String,
    line: usize,
}

impl PatternSource {
    fn compile(&self) -> Result<Pattern, SyntaxError> {
        Pattern::new(&self.text).map_err(|e| SyntaxError::Regex {
            line: self.line,
            pattern: self.text.clone(),
            message: e.to_string(),
        })
    }
}

struct Parser<'src> {
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    lines: LineMap,
    eof: usize,
}

impl<'src> Parser<'src> {
    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn line(&self) -> usize {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.eof, |(_, span)| span.start);
        self.lines.line(offset)
    }

    fn error(&self, expected: &str) -> SyntaxError {
        let found = self
            .peek()
            .map_or_else(|| "end of file".to_string(), Token::describe);
        SyntaxError::Parse {
            line: self.line(),
            message: format!("expected {expected}, found {found}"),
        }
    }

    fn expect(&mut self, expected: Token<'src>) -> Result<(), SyntaxError> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&expected.describe()))
        }
    }

    fn expect_string(&mut self) -> Result<String, SyntaxError> {
        let Some(Token::String(s)) = self.peek() else {
            return Err(self.error("a string"));
        };
        let s = s.to_string();
        self.pos += 1;
        Ok(s)
    }

    fn expect_pattern(&mut self) -> Result<Option<PatternSource>, SyntaxError> {
        let line = self.line();
        let text = self.expect_string()?;
        Ok((!text.is_empty()).then_some(PatternSource { text, line }))
    }

    fn expect_integer(&mut self) -> Result<usize, SyntaxError> {
        match self.peek() {
            Some(&Token::Integer(n)) => {
                self.pos += 1;
                Ok(n)
            }
            _ => Err(self.error("an integer")),
        }
    }

    fn parse_language(&mut self) -> Result<Syntax, SyntaxError> {
        self.expect(Token::Language)?;
        let mut syntax = Syntax::new(self.expect_string()?);

        loop {
            let line = self.line();
            match self.peek() {
                Some(Token::FilesMatch) => {
                    self.pos += 1;
                    let patterns = self.expect_string()?;
                    syntax.set_extensions(&patterns).map_err(|e| {
                        SyntaxError::FilePattern {
                            line,
                            pattern: patterns.clone(),
                            message: e.to_string(),
                        }
                    })?;
                }
                Some(Token::ContentsMatch) => {
                    self.pos += 1;
                    let pattern = self.expect_string()?;
                    syntax
                        .set_contents(&pattern)
                        .map_err(|e| SyntaxError::Regex {
                            line,
                            pattern: pattern.clone(),
                            message: e.to_string(),
                        })?;
                }
                Some(Token::Delimiters) => {
                    self.pos += 1;
                    syntax.set_delimiters(self.expect_string()?);
                }
                Some(Token::ContextLines) => {
                    self.pos += 1;
                    syntax.set_context_lines(self.expect_integer()?);
                }
                Some(Token::ContextChars) => {
                    self.pos += 1;
                    syntax.set_context_chars(self.expect_integer()?);
                }
                _ => break,
            }
        }

        while self.peek() == Some(&Token::Rule) {
            self.parse_rule(&mut syntax, ROOT_RULE)?;
        }
        self.expect(Token::End)?;
        Ok(syntax)
    }

    fn parse_rule(&mut self, syntax: &mut Syntax, parent: Style) -> Result<(), SyntaxError> {
        let rule_line = self.line();
        self.expect(Token::Rule)?;
        let name = self.expect_string()?;

        let mut open = None;
        let mut close = None;
        let mut stop = None;
        loop {
            match self.peek() {
                Some(Token::Pattern | Token::OpenPattern) => {
                    self.pos += 1;
                    open = self.expect_pattern()?;
                }
                Some(Token::ClosePattern) => {
                    self.pos += 1;
                    close = self.expect_pattern()?;
                }
                Some(Token::StopPattern) => {
                    self.pos += 1;
                    stop = self.expect_pattern()?;
                }
                _ => break,
            }
        }

        let kind = match (open, close, stop) {
            (None, None, None) => RuleKind::Default,
            (Some(pattern), None, None) => RuleKind::Simple {
                pattern: pattern.compile()?,
            },
            (Some(open), Some(close), None) => RuleKind::Bracket {
                open: open.compile()?,
                close: close.compile()?,
            },
            (Some(open), Some(close), Some(stop)) => RuleKind::SafeBracket {
                open: open.compile()?,
                close: close.compile()?,
                stop: stop.compile()?,
            },
            (None, _, _) => {
                return Err(SyntaxError::Parse {
                    line: rule_line,
                    message: format!("rule \"{name}\" has a closing pattern but no opening pattern"),
                });
            }
            (Some(_), None, Some(_)) => {
                return Err(SyntaxError::Parse {
                    line: rule_line,
                    message: format!("rule \"{name}\" has a stop pattern but no closing pattern"),
                });
            }
        };

        let is_container = kind.is_container();
        let style = syntax.append_rule(name.as_str(), kind, parent)?;

        while self.peek() == Some(&Token::Rule) {
            if !is_container {
                return Err(SyntaxError::Parse {
                    line: self.line(),
                    message: format!("simple rule \"{name}\" cannot contain nested rules"),
                });
            }
            self.parse_rule(syntax, style)?;
        }
        self.expect(Token::End)
    }
}
