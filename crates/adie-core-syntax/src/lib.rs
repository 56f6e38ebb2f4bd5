#![warn(missing_docs)]
//! `adie-core-syntax` - rule-tree syntax highlighting for `adie-core` buffers.
//!
//! Languages are read from `.stx` grammar files into a [`Syntax`]: a small tree of rules, each
//! either a default span, a single-regex token, or a bracketed region. A [`Restyler`] styles a
//! [`StyledBuffer`](adie_core::StyledBuffer) from scratch or, after an edit, restyles only the
//! part whose styling actually changed. [`Colorizer`] packages that as an
//! [`adie_core::StyleProcessor`].
//!
//! # Quick Start
//!
//! ```rust
//! use adie_core::StyledBuffer;
//! use adie_core_syntax::{Restyler, parse_grammar};
//!
//! let syntax = parse_grammar(
//!     r#"
//! language "Demo"
//!   rule "Comment" pattern "//.*" end
//!   rule "Block" openpattern "/\*" closepattern "\*/" end
//! end
//! "#,
//! )
//! .unwrap()
//! .remove(0);
//!
//! let mut buffer = StyledBuffer::new("a // c\nb /* x */");
//! let restyler = Restyler::new(&syntax);
//! restyler.restyle_all(&mut buffer).unwrap();
//! assert_eq!(buffer.style_at(2), 1);
//! assert_eq!(buffer.style_at(9), 2);
//!
//! let edit = buffer.insert(0, "/*").unwrap();
//! restyler.restyle(&mut buffer, &edit).unwrap();
//! assert!(buffer.styles().iter().all(|&s| s == 2));
//! ```

pub mod config;
pub mod stx;

mod processor;

pub use config::HighlightConfig;
pub use processor::Colorizer;
pub use stx::*;
