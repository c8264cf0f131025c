use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Lines scanned for frontmatter markers.
const FRONTMATTER_SCAN_LINES: usize = 10;

/// Excerpt length cap, in characters.
const EXCERPT_MAX_CHARS: usize = 200;

// Fixed localized frontmatter labels used by the help-center corpus.
const AUTHOR_MARKER: &str = "撰寫人:";
const DATE_MARKER: &str = "撰寫時間:";
const CATEGORY_MARKER: &str = "種類:";
const READ_TIME_MARKER: &str = "閱讀時間（分鐘）:";

lazy_static::lazy_static! {
    static ref IMAGE_EXTENSIONS: HashSet<&'static str> =
        ["png", "jpg", "jpeg", "gif", "webp", "svg"]
            .iter()
            .copied()
            .collect();
}

/// Metadata block recognized at the top of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time_minutes: Option<u32>,
}

/// Result of rendering one markdown document.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedMarkdown {
    pub frontmatter: Frontmatter,
    pub html_content: String,
    pub excerpt: String,
}

/// Render a markdown document: extract the frontmatter block, drop a
/// leading level-1 heading (the caller renders the title itself), and
/// produce HTML plus a plain-text excerpt.
pub fn parse(raw: &str) -> ParsedMarkdown {
    let lines: Vec<&str> = raw.split('\n').collect();

    let mut frontmatter = Frontmatter::default();
    let mut has_frontmatter = false;
    let mut frontmatter_end = 0;

    for (i, line) in lines.iter().take(FRONTMATTER_SCAN_LINES).enumerate() {
        if let Some(value) = value_after(line, AUTHOR_MARKER) {
            frontmatter.author = Some(value);
            has_frontmatter = true;
        } else if let Some(value) = value_after(line, DATE_MARKER) {
            frontmatter.date = Some(value);
            has_frontmatter = true;
        } else if let Some(value) = value_after(line, CATEGORY_MARKER) {
            frontmatter.category = Some(value);
            has_frontmatter = true;
        } else if let Some(value) = value_after(line, READ_TIME_MARKER) {
            frontmatter.read_time_minutes = Some(value.parse().unwrap_or(0));
            has_frontmatter = true;
        } else if line.starts_with('#') && has_frontmatter {
            // First heading after the frontmatter block opens the
            // content, heading included.
            frontmatter_end = i;
            break;
        }
    }

    let mut content: &[&str] = if has_frontmatter && frontmatter_end > 0 {
        &lines[frontmatter_end..]
    } else {
        &lines
    };

    // The title is rendered separately by the caller.
    if let Some(first) = content.first() {
        if first.trim().starts_with("# ") {
            content = &content[1..];
        }
    }

    let body = content.join("\n");

    ParsedMarkdown {
        frontmatter,
        html_content: markdown_to_html(&body),
        excerpt: generate_excerpt(&body),
    }
}

/// Substring after the first occurrence of `marker`, trimmed.
fn value_after(line: &str, marker: &str) -> Option<String> {
    line.find(marker)
        .map(|at| line[at + marker.len()..].trim().to_string())
}

// ========== Excerpt ==========

/// Plain-text excerpt: markdown markers stripped, first paragraph,
/// capped at 200 characters.
fn generate_excerpt(markdown: &str) -> String {
    let text = markdown
        .split('\n')
        .map(|line| strip_bold_markers(strip_heading_marker(line)))
        .collect::<Vec<_>>()
        .join("\n");

    let text = rewrite_links(&text, |link_text, _| link_text.to_string());

    let text = text
        .split('\n')
        .map(|line| {
            let line = strip_leading_marker(line, &['-', '*', '+']);
            strip_leading_marker(line, &['>'])
        })
        .collect::<Vec<_>>()
        .join("\n");

    let text = text.trim();
    let first_paragraph = text.split("\n\n").next().unwrap_or(text);
    truncate_with_ellipsis(first_paragraph, EXCERPT_MAX_CHARS)
}

/// Strip a leading `#`-run heading marker and its trailing whitespace.
fn strip_heading_marker(line: &str) -> &str {
    let after_hashes = line.trim_start_matches('#');
    if after_hashes.len() == line.len() {
        return line;
    }
    let rest = after_hashes.trim_start();
    if rest.len() == after_hashes.len() {
        return line; // a '#' run without whitespace is not a marker
    }
    rest
}

/// Drop `**` pairs on a line, keeping the inner text.
fn strip_bold_markers(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find("**") {
        match rest[start + 2..].find("**") {
            Some(inner) => {
                out.push_str(&rest[..start]);
                out.push_str(&rest[start + 2..start + 2 + inner]);
                rest = &rest[start + 2 + inner + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Strip one leading marker character followed by whitespace.
fn strip_leading_marker<'a>(line: &'a str, markers: &[char]) -> &'a str {
    let Some(after) = line.strip_prefix(markers) else {
        return line;
    };
    let rest = after.trim_start();
    if rest.len() == after.len() {
        return line;
    }
    rest
}

fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let mut count = 0;
    for (at, _) in text.char_indices() {
        if count == max_chars {
            return format!("{}...", &text[..at]);
        }
        count += 1;
    }
    text.to_string()
}

// ========== HTML conversion ==========

/// Staged line-oriented conversion. Each stage runs once over the
/// whole text and must not corrupt markers produced by prior stages;
/// nested and multi-line constructs are out of scope.
fn markdown_to_html(markdown: &str) -> String {
    // Images before links, so image references never turn into anchors.
    let html = convert_images(markdown);
    let html = convert_headings(&html);
    let html = convert_inline_pairs(&html, "**", "strong");
    let html = convert_inline_pairs(&html, "*", "em");
    let html = convert_links(&html);
    let html = convert_block_markers(&html);
    let html = group_lists(&html);
    let html = wrap_paragraphs(&html);
    cleanup(&html)
}

/// Stage 1: `![alt](src)` becomes an image element carrying the
/// resolved asset filename in a data attribute, so the page layer can
/// map it back to a bundled asset. Unresolvable references stay as
/// written.
fn convert_images(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(bang) = rest.find("![") {
        let after = &rest[bang + 2..];
        match parse_bracket_pair(after, true) {
            Some((alt, src, consumed)) => {
                out.push_str(&rest[..bang]);
                match resolve_image_filename(src) {
                    Some(filename) => {
                        out.push_str(&format!(
                            "<img data-article-image=\"{filename}\" alt=\"{alt}\" \
                             style=\"max-width: 100%; height: auto;\" />"
                        ));
                    }
                    None => out.push_str(&rest[bang..bang + 2 + consumed]),
                }
                rest = &after[consumed..];
            }
            None => {
                out.push_str(&rest[..bang + 2]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse `text](target)` at the start of `s`. Empty text is only
/// allowed for image alt text.
fn parse_bracket_pair(s: &str, allow_empty_text: bool) -> Option<(&str, &str, usize)> {
    let close = s.find(']')?;
    if close == 0 && !allow_empty_text {
        return None;
    }
    let text = &s[..close];
    let inner = s[close + 1..].strip_prefix('(')?;
    let end = inner.find(')')?;
    if end == 0 {
        return None;
    }
    Some((text, &inner[..end], close + end + 3))
}

/// Asset filename for an image source: percent-decoded trailing path
/// component, query and fragment stripped, a trailing ` <number>`
/// duplicate suffix before the extension removed. `None` when the
/// result does not carry a recognized image extension.
fn resolve_image_filename(src: &str) -> Option<String> {
    let decoded = match urlencoding::decode(src) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => src.to_string(),
    };

    let segment = decoded.rsplit('/').next().unwrap_or("");
    let segment = if segment.is_empty() {
        decoded.rsplit('\\').next().unwrap_or("")
    } else {
        segment
    };

    let name = segment.split('?').next().unwrap_or(segment);
    let name = name.split('#').next().unwrap_or(name);
    let name = strip_duplicate_ordinal(name);

    if has_image_extension(&name) {
        Some(name)
    } else {
        None
    }
}

/// `場次邀請表單 1.png` -> `場次邀請表單.png`: duplicate-asset naming
/// appends an ordinal before the extension.
fn strip_duplicate_ordinal(name: &str) -> String {
    let Some(dot) = name.rfind('.') else {
        return name.to_string();
    };
    let ext = &name[dot + 1..];
    if !IMAGE_EXTENSIONS.contains(ext.to_ascii_lowercase().as_str()) {
        return name.to_string();
    }

    let stem = &name[..dot];
    let without_digits = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() == stem.len() {
        return name.to_string();
    }
    let without_ws = without_digits.trim_end();
    if without_ws.len() == without_digits.len() {
        return name.to_string(); // digits belong to the name itself
    }

    format!("{without_ws}.{ext}")
}

fn has_image_extension(name: &str) -> bool {
    name.rfind('.').is_some_and(|dot| {
        IMAGE_EXTENSIONS.contains(name[dot + 1..].to_ascii_lowercase().as_str())
    })
}

/// Stage 2: `#`/`##`/`###` headings with a generated anchor carried
/// both as `id` and as `data-anchor`, for navigation and scroll-spy.
fn convert_headings(input: &str) -> String {
    input
        .split('\n')
        .map(convert_heading_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn convert_heading_line(line: &str) -> String {
    for (marker, tag) in [("### ", "h3"), ("## ", "h2"), ("# ", "h1")] {
        if let Some(text) = line.strip_prefix(marker) {
            let anchor = anchor_slug(text);
            return format!("<{tag} id=\"{anchor}\" data-anchor=\"{anchor}\">{text}</{tag}>");
        }
    }
    line.to_string()
}

/// Anchor id for a heading: lowercase, whitespace runs to `-`, only
/// word characters, hyphens and CJK ideographs kept, common CJK and
/// Latin punctuation dropped.
fn anchor_slug(text: &str) -> String {
    const PUNCTUATION: &[char] = &['？', '?', '！', '!', '。', '，', ','];

    let lowered = text.to_lowercase();
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
        .filter(|&c| is_anchor_char(c) && !PUNCTUATION.contains(&c))
        .collect()
}

fn is_anchor_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || is_cjk(c)
}

/// CJK unified ideographs, U+4E00..=U+9FFF.
fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Stage 3: lazy same-line `marker…marker` pairs. An unmatched opener
/// is emitted literally one character at a time, so a stray `**` can
/// still pair up as two italic markers later.
fn convert_inline_pairs(input: &str, marker: &str, tag: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find(marker) {
        let after = &rest[start + marker.len()..];
        let line_end = after.find('\n').unwrap_or(after.len());
        match after[..line_end].find(marker) {
            Some(close) => {
                out.push_str(&rest[..start]);
                out.push_str(&format!("<{tag}>{}</{tag}>", &after[..close]));
                rest = &after[close + marker.len()..];
            }
            None => {
                let step = rest[start..].chars().next().map_or(1, char::len_utf8);
                out.push_str(&rest[..start + step]);
                rest = &rest[start + step..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Stage 4: links open in a new context with no opener back-reference.
fn convert_links(input: &str) -> String {
    rewrite_links(input, |text, href| {
        format!("<a href=\"{href}\" target=\"_blank\" rel=\"noopener noreferrer\">{text}</a>")
    })
}

/// Replace every `[text](href)` (non-empty text and href) with the
/// rendered form. Shared between link conversion and excerpt
/// stripping.
fn rewrite_links(input: &str, render: impl Fn(&str, &str) -> String) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        match parse_bracket_pair(after, false) {
            Some((text, href, consumed)) => {
                out.push_str(&rest[..open]);
                out.push_str(&render(text, href));
                rest = &after[consumed..];
            }
            None => {
                out.push_str(&rest[..open + 1]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Stage 5: horizontal rules and blockquotes.
fn convert_block_markers(input: &str) -> String {
    input
        .split('\n')
        .map(|line| {
            if line == "---" {
                "<hr/>".to_string()
            } else if let Some(quoted) = strip_quote_prefix(line) {
                format!("<blockquote>{quoted}</blockquote>")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_quote_prefix(line: &str) -> Option<&str> {
    let after = line.strip_prefix('>')?;
    let rest = after.trim_start();
    if rest.len() == after.len() {
        return None; // no whitespace after the marker
    }
    Some(rest)
}

/// Stage 6: group consecutive list lines, one pass with open-list
/// state. Switching marker style closes the previous list; end of
/// input closes any open one.
fn group_lists(input: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_unordered = false;
    let mut in_ordered = false;

    for line in input.split('\n') {
        let trimmed = line.trim();

        if let Some(item) = unordered_item(trimmed) {
            if !in_unordered {
                if in_ordered {
                    out.push("</ol>".to_string());
                    in_ordered = false;
                }
                out.push("<ul>".to_string());
                in_unordered = true;
            }
            out.push(format!("<li>{item}</li>"));
            continue;
        }

        if let Some(item) = ordered_item(trimmed) {
            if !in_ordered {
                if in_unordered {
                    out.push("</ul>".to_string());
                    in_unordered = false;
                }
                out.push("<ol>".to_string());
                in_ordered = true;
            }
            out.push(format!("<li>{item}</li>"));
            continue;
        }

        if in_unordered {
            out.push("</ul>".to_string());
            in_unordered = false;
        }
        if in_ordered {
            out.push("</ol>".to_string());
            in_ordered = false;
        }
        out.push(line.to_string());
    }

    if in_unordered {
        out.push("</ul>".to_string());
    }
    if in_ordered {
        out.push("</ol>".to_string());
    }

    out.join("\n")
}

fn unordered_item(trimmed: &str) -> Option<&str> {
    let after = trimmed.strip_prefix(['-', '*', '+'])?;
    let item = after.trim_start();
    if item.len() == after.len() || item.is_empty() {
        return None;
    }
    Some(item)
}

fn ordered_item(trimmed: &str) -> Option<&str> {
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let after = trimmed[digits..].strip_prefix('.')?;
    let item = after.trim_start();
    if item.len() == after.len() || item.is_empty() {
        return None;
    }
    Some(item)
}

/// Stage 7: wrap leftover text lines in paragraphs.
fn wrap_paragraphs(input: &str) -> String {
    input
        .split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                String::new()
            } else if trimmed.starts_with('<') {
                trimmed.to_string()
            } else {
                format!("<p>{trimmed}</p>")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stage 8: drop empty paragraphs, merge the list wrappers the
/// line-by-line pass split apart, and keep images out of paragraphs.
fn cleanup(input: &str) -> String {
    let html = drop_empty_paragraphs(input);
    let html = merge_adjacent_wrappers(&html, "</ul>", "<ul>");
    let html = merge_adjacent_wrappers(&html, "</ol>", "<ol>");
    unwrap_image_paragraphs(&html)
}

fn drop_empty_paragraphs(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("<p>") {
        let after = &rest[start + 3..];
        let ws = after.len() - after.trim_start().len();
        if after[ws..].starts_with("</p>") {
            out.push_str(&rest[..start]);
            rest = &after[ws + 4..];
        } else {
            out.push_str(&rest[..start + 3]);
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

fn merge_adjacent_wrappers(input: &str, close: &str, open: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find(close) {
        let after = &rest[start + close.len()..];
        let ws = after.len() - after.trim_start().len();
        if after[ws..].starts_with(open) {
            out.push_str(&rest[..start]);
            rest = &after[ws + open.len()..];
        } else {
            out.push_str(&rest[..start + close.len()]);
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

fn unwrap_image_paragraphs(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("<p><img") {
        let after = &rest[start + 3..];
        match after.find('>') {
            Some(gt) if after[gt + 1..].starts_with("</p>") => {
                out.push_str(&rest[..start]);
                out.push_str(&after[..gt + 1]);
                rest = &after[gt + 1 + 4..];
            }
            _ => {
                out.push_str(&rest[..start + 3]);
                rest = &rest[start + 3..];
            }
        }
    }
    out.push_str(rest);
    out
}
