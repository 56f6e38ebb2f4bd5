//! Tokens of the `.stx` grammar format.
//!
//! Keywords are matched as literal tokens, so an identifier can never be mistaken for one.
//! Comments run from `#` to the end of the line. Strings are double-quoted; `\"` is the only
//! escape that is decoded, every other backslash sequence is kept verbatim so regexes stay
//! readable.

use crate::stx::error::SyntaxError;
use logos::Logos;
use std::borrow::Cow;
use std::ops::Range;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip(r"([ \t\r\n\f]+|#[^\n]*)", allow_greedy = true))]
pub(crate) enum Token<'src> {
    #[token("language")]
    Language,

    #[token("rule")]
    Rule,

    #[token("filesmatch")]
    FilesMatch,

    #[token("contentsmatch")]
    ContentsMatch,

    #[token("delimiters")]
    Delimiters,

    #[token("pattern")]
    Pattern,

    #[token("openpattern")]
    OpenPattern,

    #[token("closepattern")]
    ClosePattern,

    #[token("stoppattern")]
    StopPattern,

    #[token("contextlines")]
    ContextLines,

    #[token("contextchars")]
    ContextChars,

    #[token("end")]
    End,

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<usize>().ok())]
    Integer(usize),

    #[regex(r#""([^"\\]|\\[\s\S])*""#, |lex| unescape(lex.slice()))]
    String(Cow<'src, str>),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice())]
    Ident(&'src str),
}

impl Token<'_> {
    /// How the token reads in a diagnostic.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Language => "'language'".to_string(),
            Token::Rule => "'rule'".to_string(),
            Token::FilesMatch => "'filesmatch'".to_string(),
            Token::ContentsMatch => "'contentsmatch'".to_string(),
            Token::Delimiters => "'delimiters'".to_string(),
            Token::Pattern => "'pattern'".to_string(),
            Token::OpenPattern => "'openpattern'".to_string(),
            Token::ClosePattern => "'closepattern'".to_string(),
            Token::StopPattern => "'stoppattern'".to_string(),
            Token::ContextLines => "'contextlines'".to_string(),
            Token::ContextChars => "'contextchars'".to_string(),
            Token::End => "'end'".to_string(),
            Token::Integer(n) => format!("integer {n}"),
            Token::String(s) => format!("string \"{s}\""),
            Token::Ident(id) => format!("identifier '{id}'"),
        }
    }
}

/// Strip the quotes and decode `\"`.
fn unescape(slice: &str) -> Cow<'_, str> {
    let body = &slice[1..slice.len() - 1];
    if body.contains("\\\"") {
        Cow::Owned(body.replace("\\\"", "\""))
    } else {
        Cow::Borrowed(body)
    }
}

/// Maps byte offsets of the grammar source to 1-based line numbers.
pub(crate) struct LineMap {
    newlines: Vec<usize>,
}

impl LineMap {
    pub(crate) fn new(src: &str) -> Self {
        let newlines = src
            .bytes()
            .enumerate()
            .filter(|&(_, b)| b == b'\n')
            .map(|(i, _)| i)
            .collect();
        Self { newlines }
    }

    pub(crate) fn line(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < offset) + 1
    }
}

/// Tokenize `src` completely, failing on the first bad character.
pub(crate) fn tokenize<'src>(
    src: &'src str,
    lines: &LineMap,
) -> Result<Vec<(Token<'src>, Range<usize>)>, SyntaxError> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(src).spanned() {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                let slice = &src[span.clone()];
                let message = if slice.starts_with('"') {
                    "unterminated string".to_string()
                } else if slice.bytes().all(|b| b.is_ascii_digit()) {
                    format!("integer out of range: {slice}")
                } else {
                    format!("unexpected character: {slice:?}")
                };
                return Err(SyntaxError::Lex {
                    line: lines.line(span.start),
                    message,
                });
            }
        }
    }
    Ok(tokens)
}
