#![warn(missing_docs)]
//! `adie-core` - the host side of the Adie syntax-highlighting engine.
//!
//! This crate owns the text a highlighter works on and the per-byte style buffer that
//! sits next to it. It does not know anything about grammars or rules; highlighters plug
//! in through the [`StyleProcessor`] trait and are driven by the [`TextEdit`] notifications
//! the buffer hands out after every modification.
//!
//! # Quick Start
//!
//! ```rust
//! use adie_core::StyledBuffer;
//!
//! let mut buffer = StyledBuffer::new("hello\nworld");
//! let edit = buffer.insert(5, ", there").unwrap();
//!
//! assert_eq!(buffer.text(), "hello, there\nworld");
//! assert_eq!(edit.changed_end(), 12);
//! assert_eq!(buffer.line_start(buffer.len()), 13);
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] - text plus the parallel style bytes, line navigation
//! - [`delta`] - edit notifications (position, deleted length, inserted length)
//! - [`runs`] - maximal runs of equal style, for renderers
//! - [`processing`] - the trait highlighters implement

pub mod buffer;
pub mod delta;
pub mod processing;
pub mod runs;

pub use buffer::{BufferError, DEFAULT_STYLE, Style, StyledBuffer};
pub use delta::TextEdit;
pub use processing::StyleProcessor;
pub use runs::{StyleRun, StyleRuns};
