//! Display attributes for rule names.
//!
//! Styles are positional (a rule's index), but themes are written against rule *names*, so a
//! theme survives edits to the grammar and rules that share a name share a look.

use crate::stx::definition::Syntax;
use crate::stx::error::SyntaxError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
/// A 24-bit color, written `#rrggbb`.
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Build a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| format!("expected #rrggbb, found '{s}'"))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("bad hex digits in '{s}'"))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// How text in one style is drawn. Unset colors fall back to the view's colors.
pub struct StyleAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Foreground of normal text.
    pub normal_fg: Option<Color>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Background of normal text.
    pub normal_bg: Option<Color>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Foreground of selected text.
    pub select_fg: Option<Color>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Background of selected text.
    pub select_bg: Option<Color>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Foreground of highlighted text.
    pub hilite_fg: Option<Color>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Background of highlighted text.
    pub hilite_bg: Option<Color>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Background of the line holding the cursor.
    pub active_bg: Option<Color>,

    /// Bold face.
    pub bold: bool,
    /// Italic face.
    pub italic: bool,
    /// Underlined.
    pub underline: bool,
    /// Struck out.
    pub strikeout: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
/// Rule name → display attributes.
pub struct StyleTable {
    entries: BTreeMap<String, StyleAttributes>,
}

impl StyleTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes for rule name `name`.
    pub fn get(&self, name: &str) -> Option<&StyleAttributes> {
        self.entries.get(name)
    }

    /// Set the attributes for rule name `name`.
    pub fn set(&mut self, name: impl Into<String>, attributes: StyleAttributes) {
        self.entries.insert(name.into(), attributes);
    }

    /// Named entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleAttributes)> {
        self.entries.iter().map(|(name, attrs)| (name.as_str(), attrs))
    }

    /// Attributes for every style of `syntax`, indexed by style.
    pub fn resolve(&self, syntax: &Syntax) -> Vec<StyleAttributes> {
        syntax
            .rules()
            .iter()
            .map(|rule| self.get(rule.name()).cloned().unwrap_or_default())
            .collect()
    }

    /// Read a table from a JSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SyntaxError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the table to a JSON file.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), SyntaxError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
