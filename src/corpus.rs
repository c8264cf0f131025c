use std::fs;
use std::path::Path;

use thiserror::Error;

/// Errors raised while loading a corpus from disk.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus directory {path}: {source}")]
    ReadDir {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },
}

/// Immutable mapping from document path to raw markdown text.
///
/// Populated once before any index or search call and read-only
/// thereafter. Iteration order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<(String, String)>,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a corpus from already-loaded (path, raw text) pairs.
    pub fn from_entries(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// Load every `*.md` file directly under `dir`.
    ///
    /// Entries are keyed by their path string and sorted by path, so
    /// the corpus order is deterministic across runs.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, CorpusError> {
        let dir = dir.as_ref();
        let read_dir = fs::read_dir(dir).map_err(|source| CorpusError::ReadDir {
            path: dir.display().to_string(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| CorpusError::ReadDir {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            let is_markdown = path
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("md"));
            if path.is_file() && is_markdown {
                paths.push(path);
            }
        }
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let raw = fs::read_to_string(&path).map_err(|source| CorpusError::ReadFile {
                path: path.display().to_string(),
                source,
            })?;
            let key = path.display().to_string();
            tracing::debug!(path = %key, bytes = raw.len(), "loaded corpus entry");
            entries.push((key, raw));
        }

        Ok(Self { entries })
    }

    /// Raw text for an exact path key.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == path)
            .map(|(_, raw)| raw.as_str())
    }

    /// Iterate entries in corpus order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, raw)| (path.as_str(), raw.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_entries_preserves_order() {
        let corpus = Corpus::from_entries(vec![
            ("b.md".to_string(), "second".to_string()),
            ("a.md".to_string(), "first".to_string()),
        ]);

        let paths: Vec<&str> = corpus.iter().map(|(path, _)| path).collect();
        assert_eq!(paths, vec!["b.md", "a.md"]);
        assert_eq!(corpus.get("a.md"), Some("first"));
        assert_eq!(corpus.get("missing.md"), None);
    }

    #[test]
    fn test_load_dir_sorted_markdown_only() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;

        let mut b = std::fs::File::create(dir.path().join("b.md"))?;
        b.write_all(b"# B")?;
        let mut a = std::fs::File::create(dir.path().join("a.md"))?;
        a.write_all(b"# A")?;
        let mut skip = std::fs::File::create(dir.path().join("notes.txt"))?;
        skip.write_all(b"not markdown")?;

        let corpus = Corpus::load_dir(dir.path())?;
        assert_eq!(corpus.len(), 2);

        let contents: Vec<&str> = corpus.iter().map(|(_, raw)| raw).collect();
        assert_eq!(contents, vec!["# A", "# B"]);

        Ok(())
    }

    #[test]
    fn test_load_dir_missing() {
        let result = Corpus::load_dir("no-such-directory");
        assert!(matches!(result, Err(CorpusError::ReadDir { .. })));
    }
}
