use adie_core::{BufferError, Style};
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced by the grammar loader and the restyler.
pub enum SyntaxError {
    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    /// The grammar text contains a character sequence that is not a token.
    Lex {
        /// 1-based line of the offending input.
        line: usize,
        /// What the lexer choked on.
        message: String,
    },

    #[error("line {line}: {message}")]
    /// The token stream does not follow the grammar-file structure.
    Parse {
        /// 1-based line of the offending token.
        line: usize,
        /// What the parser expected.
        message: String,
    },

    #[error("line {line}: bad pattern '{pattern}': {message}")]
    /// A rule pattern or `contentsmatch` regex failed to compile.
    Regex {
        /// 1-based line of the pattern string.
        line: usize,
        /// The regex source.
        pattern: String,
        /// The regex compiler's message.
        message: String,
    },

    #[error("line {line}: bad file pattern '{pattern}': {message}")]
    /// A `filesmatch` wildcard failed to compile.
    FilePattern {
        /// 1-based line of the pattern string.
        line: usize,
        /// The wildcard list.
        pattern: String,
        /// The glob compiler's message.
        message: String,
    },

    #[error("language '{language}' has more than 256 rules")]
    /// Rule indices are style bytes, so a language is limited to 256 rules.
    TooManyRules {
        /// The language being built.
        language: String,
    },

    #[error("rule {parent} does not exist or cannot contain other rules")]
    /// A rule was appended to a missing parent or to a leaf rule.
    InvalidParent {
        /// The requested parent index.
        parent: usize,
    },

    #[error("rule {rule} stopped at {at} without covering the range up to {end}")]
    /// The top-level rule did not tile the text it was given.
    ///
    /// This is a defect in the language definition; whatever styles were computed before the
    /// gap was found stay in the buffer.
    IncompleteCoverage {
        /// The rule that gave up.
        rule: Style,
        /// Where it gave up.
        at: usize,
        /// Where it was supposed to get to.
        end: usize,
    },

    #[error("syntax file not found on the search path: {0}")]
    /// `load_by_name` found no file with that name.
    NotFound(String),

    #[error("style table error: {0}")]
    /// A style table could not be read or written.
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    /// The host buffer rejected a style write.
    Buffer(#[from] BufferError),
}
