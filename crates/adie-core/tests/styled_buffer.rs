use adie_core::{StyleProcessor, StyleRun, StyledBuffer, TextEdit};
use pretty_assertions::assert_eq;
use std::convert::Infallible;

/// Styles ASCII digits with style 1, restyling only the lines touched by an edit.
#[derive(Default)]
struct DigitProcessor {
    calls: Vec<Option<TextEdit>>,
}

impl StyleProcessor for DigitProcessor {
    type Error = Infallible;

    fn process(
        &mut self,
        buffer: &mut StyledBuffer,
        edit: Option<&TextEdit>,
    ) -> Result<(), Self::Error> {
        self.calls.push(edit.copied());
        let (start, end) = match edit {
            None => (0, buffer.len()),
            Some(edit) => (
                buffer.line_start(edit.pos),
                buffer.line_end(edit.changed_end()),
            ),
        };
        let styles: Vec<u8> = buffer.text()[start..end]
            .bytes()
            .map(|b| u8::from(b.is_ascii_digit()))
            .collect();
        buffer.change_style(start, &styles).expect("in range");
        Ok(())
    }
}

#[test]
fn test_processor_follows_edits() {
    let mut buffer = StyledBuffer::new("a1\nb22\nc");
    let mut processor = DigitProcessor::default();
    processor.process(&mut buffer, None).unwrap();

    assert_eq!(
        buffer.runs().collect::<Vec<_>>(),
        vec![
            StyleRun::new(0, 1, 0),
            StyleRun::new(1, 2, 1),
            StyleRun::new(2, 4, 0),
            StyleRun::new(4, 6, 1),
            StyleRun::new(6, 8, 0),
        ]
    );

    let edit = buffer
        .edit_with(&mut processor, 7, 1, "9x")
        .expect("valid edit")
        .expect("processor never fails");
    assert_eq!(edit, TextEdit::new(7, 1, 2));
    assert_eq!(buffer.text(), "a1\nb22\n9x");
    assert_eq!(buffer.styles(), &[0, 1, 0, 0, 1, 1, 0, 1, 0]);
    assert_eq!(processor.calls, vec![None, Some(TextEdit::new(7, 1, 2))]);
}

#[test]
fn test_invalid_edit_does_not_reach_processor() {
    let mut buffer = StyledBuffer::new("abc");
    let mut processor = DigitProcessor::default();

    assert!(buffer.edit_with(&mut processor, 5, 0, "x").is_err());
    assert!(processor.calls.is_empty());
    assert_eq!(buffer.text(), "abc");
}

#[test]
fn test_set_text_resets_styles() {
    let mut buffer = StyledBuffer::new("12");
    buffer.fill_style(0..2, 7).unwrap();

    let edit = buffer.set_text("hello");
    assert_eq!(edit, TextEdit::new(0, 2, 5));
    assert_eq!(buffer.styles(), &[0; 5]);
}
