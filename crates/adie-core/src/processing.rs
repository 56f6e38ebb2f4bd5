//! Highlighter plug-in interface.
//!
//! A [`StyleProcessor`] owns whatever language knowledge it needs and keeps the style buffer of
//! a [`StyledBuffer`] in sync with its text. The host calls it once with no edit to color a
//! freshly loaded buffer, then once per [`TextEdit`].

use crate::buffer::StyledBuffer;
use crate::delta::TextEdit;

/// Something that assigns styles to a buffer.
pub trait StyleProcessor {
    /// The error type returned by [`StyleProcessor::process`].
    type Error;

    /// Bring the styles of `buffer` up to date.
    ///
    /// `edit` is `None` when the whole buffer must be (re)styled, e.g. after loading a file or
    /// switching languages. Otherwise it describes the single modification made since the
    /// previous call.
    ///
    /// Implementations must run to completion: the host never observes a half-restyled
    /// buffer between two calls.
    fn process(
        &mut self,
        buffer: &mut StyledBuffer,
        edit: Option<&TextEdit>,
    ) -> Result<(), Self::Error>;
}

impl StyledBuffer {
    /// Replace text and immediately let `processor` restyle the affected region.
    ///
    /// Buffer errors are reported before the processor runs; processor errors are returned
    /// after the text change has been committed.
    pub fn edit_with<P>(
        &mut self,
        processor: &mut P,
        pos: usize,
        deleted: usize,
        inserted: &str,
    ) -> Result<Result<TextEdit, P::Error>, crate::BufferError>
    where
        P: StyleProcessor,
    {
        let edit = self.replace(pos, deleted, inserted)?;
        Ok(processor.process(self, Some(&edit)).map(|()| edit))
    }
}
