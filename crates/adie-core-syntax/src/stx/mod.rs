//! `.stx` rule-tree grammars.
//!
//! A grammar file declares languages; each language is a tree of rules whose index doubles as
//! the style written into the buffer. Styling a range means running the root rule's body over
//! it; restyling after an edit means resuming some rule's body near the edit and stopping as
//! soon as the fresh styles agree with the old ones.

mod definition;
mod error;
mod lexer;
mod parser;
mod pattern;
mod restyle;
mod rule;
mod set;
mod style;

pub use definition::{
    DEFAULT_CONTEXT_CHARS, DEFAULT_CONTEXT_LINES, DEFAULT_DELIMITERS, MAX_RULES, Syntax,
};
pub use error::SyntaxError;
pub use parser::parse_grammar;
pub use pattern::Pattern;
pub use restyle::{RESTYLE_JUMP, RangeOutcome, RestyleOptions, RestyleReport, Restyler};
pub use rule::{Match, ROOT_RULE, Rule, RuleKind};
pub use set::{DEFAULT_SNIFF_LEN, SyntaxSet};
pub use style::{Color, StyleAttributes, StyleTable};
