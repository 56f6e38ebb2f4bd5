use crate::stx::{RestyleOptions, RestyleReport, Restyler, Syntax, SyntaxError};
use adie_core::processing::StyleProcessor;
use adie_core::{StyledBuffer, TextEdit};
use std::sync::Arc;

/// A stateful rule-tree highlighter for one buffer.
///
/// With colorizing off the buffer is kept in the default style and edits are ignored.
/// The first edit after creation, a language switch or re-enabling restyles the whole buffer,
/// since the stored styles cannot be trusted at that point.
#[derive(Debug, Clone)]
pub struct Colorizer {
    syntax: Arc<Syntax>,
    options: RestyleOptions,
    enabled: bool,
    needs_full: bool,
    last_report: Option<RestyleReport>,
}

impl Colorizer {
    /// Create a colorizer for a given language.
    pub fn new(syntax: Arc<Syntax>) -> Self {
        Self {
            syntax,
            options: RestyleOptions::default(),
            enabled: true,
            needs_full: true,
            last_report: None,
        }
    }

    /// Use explicit restyle options.
    pub fn with_options(mut self, options: RestyleOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the active language.
    pub fn syntax(&self) -> &Arc<Syntax> {
        &self.syntax
    }

    /// Switch language. The next [`process`](StyleProcessor::process) call restyles the whole
    /// buffer.
    pub fn set_syntax(&mut self, syntax: Arc<Syntax>) {
        self.syntax = syntax;
        self.needs_full = true;
        self.last_report = None;
    }

    /// Returns whether colorizing is on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn colorizing on or off. Turning it on makes the next
    /// [`process`](StyleProcessor::process) call restyle the whole buffer.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.needs_full = true;
        }
        self.enabled = enabled;
    }

    /// What the most recent restyle did, if any.
    pub fn last_report(&self) -> Option<&RestyleReport> {
        self.last_report.as_ref()
    }
}

impl StyleProcessor for Colorizer {
    type Error = SyntaxError;

    fn process(
        &mut self,
        buffer: &mut StyledBuffer,
        edit: Option<&TextEdit>,
    ) -> Result<(), Self::Error> {
        if !self.enabled {
            if edit.is_none() {
                buffer.clear_styles();
            }
            self.last_report = None;
            return Ok(());
        }

        let restyler = Restyler::with_options(&self.syntax, self.options);
        let report = match edit {
            Some(edit) if !self.needs_full => restyler.restyle(buffer, edit)?,
            _ => restyler.restyle_all(buffer)?,
        };
        self.needs_full = false;
        self.last_report = Some(report);
        Ok(())
    }
}
