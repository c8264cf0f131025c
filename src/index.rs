use std::borrow::Cow;

use crate::corpus::Corpus;
use crate::document::{filename_of, DocumentMeta};

/// Lookup over the corpus: per-document metadata plus content
/// resolution for possibly re-encoded path variants.
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    corpus: Corpus,
}

impl DocumentIndex {
    pub fn new(corpus: Corpus) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Metadata for every corpus entry with a derivable title, in
    /// corpus order. Recomputed on each call; derivation is
    /// deterministic, so a cache would be an invisible optimization.
    pub fn list_documents(&self) -> Vec<DocumentMeta> {
        self.corpus
            .iter()
            .filter_map(|(path, raw)| DocumentMeta::derive(path, raw))
            .collect()
    }

    /// Find a document by id. Absent ids are a normal navigation case
    /// (stale links), not an error. When two filenames slug to the
    /// same id, the earliest corpus entry wins.
    pub fn get_document(&self, id: &str) -> Option<DocumentMeta> {
        self.list_documents().into_iter().find(|doc| doc.id == id)
    }

    /// Resolve raw text for a path, tolerating URL-decoded,
    /// partially-qualified or differently-escaped variants of the
    /// original corpus key.
    ///
    /// Resolution order: exact key, decoded equality, decoded
    /// containment in either direction, then containment of the
    /// trailing filename segment. An empty string means nothing
    /// resolved, which callers treat as "no content", not an error.
    pub fn get_content(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }

        if let Some(raw) = self.corpus.get(path) {
            return raw.to_string();
        }

        let decoded_path = decode(path);
        let filename = filename_of(path);

        for (key, raw) in self.corpus.iter() {
            let decoded_key = decode(key);
            if decoded_key == decoded_path
                || decoded_key.contains(decoded_path.as_ref())
                || decoded_path.contains(decoded_key.as_ref())
                || (!filename.is_empty() && key.contains(filename))
            {
                return raw.to_string();
            }
        }

        String::new()
    }
}

/// Percent-decode, keeping the raw string when it is not valid
/// percent-encoding.
fn decode(s: &str) -> Cow<'_, str> {
    urlencoding::decode(s).unwrap_or(Cow::Borrowed(s))
}
