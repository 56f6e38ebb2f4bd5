//! ANSI rendering of styled buffers.

use adie_core::StyledBuffer;
use adie_core_syntax::{Color, StyleAttributes, StyleTable, Syntax};
use crossterm::style::{Attribute, ContentStyle};
use std::io::{self, Write};

/// The table used when no theme file is given.
pub fn default_theme() -> StyleTable {
    let mut table = StyleTable::new();
    let fg = |r, g, b| StyleAttributes {
        normal_fg: Some(Color::rgb(r, g, b)),
        ..Default::default()
    };
    table.set(
        "Comment",
        StyleAttributes {
            italic: true,
            ..fg(0x6a, 0x99, 0x55)
        },
    );
    table.set(
        "Todo",
        StyleAttributes {
            bold: true,
            ..fg(0xd7, 0xba, 0x7d)
        },
    );
    table.set("String", fg(0xce, 0x91, 0x78));
    table.set("Char", fg(0xce, 0x91, 0x78));
    table.set("Escape", fg(0xd7, 0xba, 0x7d));
    table.set("Number", fg(0xb5, 0xce, 0xa8));
    table.set("Constant", fg(0x4f, 0xc1, 0xff));
    table.set(
        "Keyword",
        StyleAttributes {
            bold: true,
            ..fg(0x56, 0x9c, 0xd6)
        },
    );
    table.set("Type", fg(0x4e, 0xc9, 0xb0));
    table.set("Preprocessor", fg(0xc5, 0x86, 0xc0));
    table.set("Attribute", fg(0xc5, 0x86, 0xc0));
    table.set("Decorator", fg(0xc5, 0x86, 0xc0));
    table.set("Macro", fg(0xdc, 0xdc, 0xaa));
    table.set("Lifetime", fg(0x4e, 0xc9, 0xb0));
    table.set("Variable", fg(0x9c, 0xdc, 0xfe));
    table
}

fn terminal_color(color: Color) -> crossterm::style::Color {
    crossterm::style::Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Terminal style for one set of display attributes.
pub fn content_style(attributes: &StyleAttributes) -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = attributes.normal_fg.map(terminal_color);
    style.background_color = attributes.normal_bg.map(terminal_color);
    for (enabled, attribute) in [
        (attributes.bold, Attribute::Bold),
        (attributes.italic, Attribute::Italic),
        (attributes.underline, Attribute::Underlined),
        (attributes.strikeout, Attribute::CrossedOut),
    ] {
        if enabled {
            style.attributes.set(attribute);
        }
    }
    style
}

/// Terminal styles for every style index of `syntax`.
pub fn palette(table: &StyleTable, syntax: &Syntax) -> Vec<ContentStyle> {
    table.resolve(syntax).iter().map(content_style).collect()
}

/// Write `buffer` with each style run wrapped in its terminal style.
///
/// Runs are split at line ends so that a style never bleeds past a newline.
pub fn write_highlighted(
    out: &mut impl Write,
    buffer: &StyledBuffer,
    palette: &[ContentStyle],
) -> io::Result<()> {
    let plain = ContentStyle::new();
    for run in buffer.runs() {
        let style = palette.get(usize::from(run.style)).unwrap_or(&plain);
        for piece in buffer.text()[run.range()].split_inclusive('\n') {
            match piece.strip_suffix('\n') {
                Some(line) => {
                    if !line.is_empty() {
                        write!(out, "{}", style.apply(line))?;
                    }
                    writeln!(out)?;
                }
                None => write!(out, "{}", style.apply(piece))?,
            }
        }
    }
    Ok(())
}
