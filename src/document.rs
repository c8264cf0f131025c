use serde::{Deserialize, Serialize};

/// Lines scanned for a title heading at the top of a document.
const TITLE_SCAN_LINES: usize = 20;

/// Maximum length of a derived document id, in characters.
const MAX_ID_CHARS: usize = 100;

/// Metadata describing one document in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub id: String,
    pub title: String,
    pub path: String,
}

impl DocumentMeta {
    /// Derive metadata for a corpus entry.
    ///
    /// The title comes from the first level-1 heading in the first 20
    /// lines, falling back to the filename (minus extension and any
    /// trailing hash suffix), then to the filename with separators
    /// spaced out. Returns `None` when no title can be derived.
    pub fn derive(path: &str, raw: &str) -> Option<Self> {
        let filename = filename_of(path);
        let stem = strip_hash_suffix(strip_extension(filename));

        let mut title = heading_title(raw).unwrap_or_default();
        if title.is_empty() {
            title = stem.to_string();
        }
        if title.is_empty() {
            title = strip_extension(filename).replace(['_', '-'], " ");
        }
        if title.is_empty() {
            return None;
        }

        // The id always comes from the filename so routes stay stable
        // no matter where the title was found.
        let mut id = derive_id(stem);
        if id.is_empty() {
            id = path.to_string();
        }

        Some(Self {
            id,
            title,
            path: path.to_string(),
        })
    }
}

/// Deterministic id slug for a filename stem: lowercase, whitespace
/// runs collapsed to `-`, everything but word characters, hyphens and
/// CJK ideographs removed, capped at 100 characters.
pub fn derive_id(stem: &str) -> String {
    let lowered = stem.to_lowercase();

    let mut hyphenated = String::with_capacity(lowered.len());
    let mut pending_ws = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            pending_ws = true;
            continue;
        }
        if pending_ws {
            hyphenated.push('-');
            pending_ws = false;
        }
        hyphenated.push(c);
    }
    if pending_ws {
        hyphenated.push('-');
    }

    hyphenated
        .chars()
        .filter(|&c| is_id_char(c))
        .take(MAX_ID_CHARS)
        .collect()
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || is_cjk(c)
}

/// CJK unified ideographs, U+4E00..=U+9FFF.
pub(crate) fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Trailing path component.
pub(crate) fn filename_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn strip_extension(filename: &str) -> &str {
    filename.strip_suffix(".md").unwrap_or(filename)
}

/// Drop a trailing whitespace-separated run of 8+ hex characters, the
/// hash suffix some export tools append to filenames.
fn strip_hash_suffix(stem: &str) -> &str {
    let chars: Vec<(usize, char)> = stem.char_indices().collect();

    let mut i = chars.len();
    let mut hex_run = 0;
    while i > 0 && chars[i - 1].1.is_ascii_hexdigit() {
        i -= 1;
        hex_run += 1;
    }
    if hex_run < 8 || i == 0 || !chars[i - 1].1.is_whitespace() {
        return stem;
    }

    while i > 0 && chars[i - 1].1.is_whitespace() {
        i -= 1;
    }
    &stem[..chars[i].0]
}

/// First `# ` heading in the opening lines, marker stripped.
fn heading_title(raw: &str) -> Option<String> {
    for line in raw.lines().take(TITLE_SCAN_LINES) {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("# ") {
            return Some(rest.trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_heading() {
        let meta = DocumentMeta::derive("docs/guide.md", "intro\n# Getting Started\nbody").unwrap();
        assert_eq!(meta.title, "Getting Started");
        assert_eq!(meta.id, "guide");
        assert_eq!(meta.path, "docs/guide.md");
    }

    #[test]
    fn test_heading_outside_window_ignored() {
        let mut raw = "filler\n".repeat(20);
        raw.push_str("# Too Late");
        let meta = DocumentMeta::derive("docs/late heading.md", &raw).unwrap();
        assert_eq!(meta.title, "late heading");
    }

    #[test]
    fn test_title_from_filename_strips_hash_suffix() {
        let meta = DocumentMeta::derive("docs/Export Guide 0a1b2c3d4e.md", "no heading").unwrap();
        assert_eq!(meta.title, "Export Guide");
        assert_eq!(meta.id, "export-guide");
    }

    #[test]
    fn test_short_hex_run_kept() {
        let meta = DocumentMeta::derive("docs/guide abc123.md", "no heading").unwrap();
        assert_eq!(meta.title, "guide abc123");
    }

    #[test]
    fn test_hex_run_without_separator_kept() {
        let meta = DocumentMeta::derive("docs/deadbeef01.md", "no heading").unwrap();
        assert_eq!(meta.title, "deadbeef01");
    }

    #[test]
    fn test_id_keeps_cjk_characters() {
        let meta = DocumentMeta::derive("docs/操作說明.md", "").unwrap();
        assert_eq!(meta.id, "操作說明");
        assert_eq!(meta.title, "操作說明");
    }

    #[test]
    fn test_id_is_deterministic() {
        let first = derive_id("User Guide (v2)");
        let second = derive_id("User Guide (v2)");
        assert_eq!(first, second);
        assert_eq!(first, "user-guide-v2");
    }

    #[test]
    fn test_id_truncated_to_limit() {
        let stem = "a".repeat(150);
        assert_eq!(derive_id(&stem).chars().count(), 100);
    }

    #[test]
    fn test_id_falls_back_to_path_when_slug_empty() {
        let meta = DocumentMeta::derive("docs/!!!.md", "# Punctuation Only").unwrap();
        assert_eq!(meta.id, "docs/!!!.md");
        assert_eq!(meta.title, "Punctuation Only");
    }

    #[test]
    fn test_separator_spacing_fallback() {
        // The separator fallback only fires when the hash-stripped
        // stem is empty, so the unstripped filename is the title and
        // the corpus path stands in for the empty slug.
        let meta = DocumentMeta::derive("docs/ 0123456789.md", "no heading").unwrap();
        assert_eq!(meta.title, " 0123456789");
        assert_eq!(meta.id, "docs/ 0123456789.md");
    }
}
