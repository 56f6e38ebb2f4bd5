use regex_automata::meta::{BuildError, Regex};
use regex_automata::util::syntax;
use regex_automata::{Anchored, Input};

/// A compiled rule pattern.
///
/// Patterns are always matched *anchored* at the probe position and may not extend past the end
/// of the range being styled. Look-around assertions (`\b`, `^`, `$`) still see the whole text,
/// so a match does not depend on where the caller started scanning. `^` and `$` match at line
/// boundaries.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source`.
    pub fn new(source: &str) -> Result<Self, BuildError> {
        let regex = Regex::builder()
            .syntax(syntax::Config::new().multi_line(true))
            .build(source)?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the grammar.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Match at exactly `from`, ending no later than `to`.
    ///
    /// Returns the end of the match. Empty matches count as no match: a zero-width match would
    /// never advance a consuming loop.
    pub fn match_at(&self, text: &str, from: usize, to: usize) -> Option<usize> {
        if from >= to || to > text.len() {
            return None;
        }
        let input = Input::new(text).range(from..to).anchored(Anchored::Yes);
        self.regex
            .find(input)
            .filter(|m| !m.is_empty())
            .map(|m| m.end())
    }
}
