use crate::stx::definition::Syntax;
use crate::stx::error::SyntaxError;
use crate::stx::parser::parse_grammar;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default number of leading bytes inspected by [`SyntaxSet::find_by_contents`].
pub const DEFAULT_SNIFF_LEN: usize = 1024;

#[derive(Debug, Clone)]
/// A collection of loaded languages, plus the lookups an editor uses to pick one for a file.
pub struct SyntaxSet {
    search_paths: Vec<PathBuf>,
    syntaxes: Vec<Arc<Syntax>>,
    sniff_len: usize,
}

impl Default for SyntaxSet {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            syntaxes: Vec::new(),
            sniff_len: DEFAULT_SNIFF_LEN,
        }
    }
}

impl SyntaxSet {
    /// Create an empty syntax set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory searched by [`SyntaxSet::load_by_name`].
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// Directories searched by [`SyntaxSet::load_by_name`], in order.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// How many leading bytes content sniffing looks at.
    pub fn sniff_len(&self) -> usize {
        self.sniff_len
    }

    /// Change how many leading bytes content sniffing looks at.
    pub fn set_sniff_len(&mut self, len: usize) {
        self.sniff_len = len;
    }

    /// Parses grammar text and adds every language in it.
    ///
    /// Nothing is added if any part of the text fails to load.
    pub fn load_from_str(&mut self, src: &str) -> Result<Vec<Arc<Syntax>>, SyntaxError> {
        let loaded: Vec<Arc<Syntax>> = parse_grammar(src)?.into_iter().map(Arc::new).collect();
        for syntax in &loaded {
            self.insert(syntax.clone());
        }
        tracing::debug!(
            languages = loaded.len(),
            total = self.syntaxes.len(),
            "syntax.load"
        );
        Ok(loaded)
    }

    /// Reads and loads a grammar file.
    pub fn load_from_path(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<Arc<Syntax>>, SyntaxError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "syntax.read");
        self.load_from_str(&src)
    }

    /// Loads the first file called `file_name` found on the search path.
    pub fn load_by_name(&mut self, file_name: &str) -> Result<Vec<Arc<Syntax>>, SyntaxError> {
        let path = self
            .resolve(file_name)
            .ok_or_else(|| SyntaxError::NotFound(file_name.to_string()))?;
        self.load_from_path(path)
    }

    fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        let path = PathBuf::from(file_name);
        if path.is_absolute() {
            return path.is_file().then_some(path);
        }
        self.search_paths
            .iter()
            .map(|base| base.join(file_name))
            .find(|candidate| candidate.is_file())
    }

    /// Adds a language, replacing any loaded language of the same name.
    pub fn insert(&mut self, syntax: Arc<Syntax>) {
        if let Some(slot) = self
            .syntaxes
            .iter_mut()
            .find(|s| s.language() == syntax.language())
        {
            tracing::warn!(language = syntax.language(), "replacing previously loaded language");
            *slot = syntax;
        } else {
            self.syntaxes.push(syntax);
        }
    }

    /// Loaded languages in load order.
    pub fn languages(&self) -> impl Iterator<Item = &Arc<Syntax>> {
        self.syntaxes.iter()
    }

    /// Number of loaded languages.
    pub fn len(&self) -> usize {
        self.syntaxes.len()
    }

    /// Returns `true` if nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.syntaxes.is_empty()
    }

    /// The language called `name`.
    pub fn get(&self, name: &str) -> Option<Arc<Syntax>> {
        self.syntaxes
            .iter()
            .find(|s| s.language() == name)
            .cloned()
    }

    /// The first language whose `filesmatch` wildcards accept `path`.
    pub fn find_by_filename(&self, path: impl AsRef<Path>) -> Option<Arc<Syntax>> {
        let path = path.as_ref();
        self.syntaxes
            .iter()
            .find(|s| s.match_filename(path))
            .cloned()
    }

    /// The first language whose `contentsmatch` regex matches the start of `text`.
    pub fn find_by_contents(&self, text: &str) -> Option<Arc<Syntax>> {
        let mut end = self.sniff_len.min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let head = &text[..end];
        self.syntaxes
            .iter()
            .find(|s| s.match_contents(head))
            .cloned()
    }

    /// Picks a language for a file: an explicit `name` wins, then the file name, then the
    /// content.
    pub fn find_for_file(
        &self,
        name: Option<&str>,
        path: Option<&Path>,
        text: &str,
    ) -> Option<Arc<Syntax>> {
        name.and_then(|n| self.get(n))
            .or_else(|| path.and_then(|p| self.find_by_filename(p)))
            .or_else(|| self.find_by_contents(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAMMAR: &str = r#"
language "C"
  filesmatch "*.c,*.h"
  contentsmatch "^#include"
end
language "Shell"
  filesmatch "*.sh|.bashrc"
  contentsmatch "^#!.*sh"
end
"#;

    #[test]
    fn test_lookup_priority() {
        let mut set = SyntaxSet::new();
        set.load_from_str(GRAMMAR).unwrap();
        assert_eq!(set.len(), 2);

        let pick = |name, path: Option<&str>, text| {
            set.find_for_file(name, path.map(Path::new), text)
                .map(|s| s.language().to_string())
        };
        assert_eq!(pick(Some("Shell"), Some("x.c"), "#include"), Some("Shell".into()));
        assert_eq!(pick(Some("Nope"), Some("x.c"), ""), Some("C".into()));
        assert_eq!(pick(None, Some("/home/me/.bashrc"), ""), Some("Shell".into()));
        assert_eq!(pick(None, Some("x.txt"), "#!/bin/sh\n"), Some("Shell".into()));
        assert_eq!(pick(None, None, "plain"), None);
    }

    #[test]
    fn test_sniffing_is_bounded() {
        let mut set = SyntaxSet::new();
        set.load_from_str(r#"language "Marker" contentsmatch "MARK" end"#)
            .unwrap();
        let mut text = "é".repeat(600);
        text.push_str("MARK");
        assert!(set.find_by_contents(&text).is_none());

        set.set_sniff_len(text.len());
        assert!(set.find_by_contents(&text).is_some());

        // A limit inside a multi-byte character is clipped, not a panic.
        set.set_sniff_len(3);
        assert!(set.find_by_contents(&text).is_none());
    }

    #[test]
    fn test_failed_load_adds_nothing() {
        let mut set = SyntaxSet::new();
        let err = set
            .load_from_str("language \"A\" end language \"B\" rule \"X\" pattern \"(\" end end")
            .unwrap_err();
        assert!(matches!(err, SyntaxError::Regex { .. }), "{err:?}");
        assert!(set.is_empty());
    }

    #[test]
    fn test_same_name_replaces() {
        let mut set = SyntaxSet::new();
        set.load_from_str(r#"language "A" filesmatch "*.a" end"#).unwrap();
        set.load_from_str(r#"language "A" filesmatch "*.b" end"#).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.find_by_filename("x.b").is_some());
        assert!(set.find_by_filename("x.a").is_none());
    }

    #[test]
    fn test_load_by_name_reports_missing_file() {
        let mut set = SyntaxSet::new();
        set.add_search_path("/nonexistent/adie");
        assert!(matches!(
            set.load_by_name("Missing.stx"),
            Err(SyntaxError::NotFound(name)) if name == "Missing.stx"
        ));
    }
}
