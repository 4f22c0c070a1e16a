//! Text normalization applied before chunking.

use once_cell::sync::Lazy;
use regex::Regex;

static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{00A0}\u{2000}-\u{200A}\u{202F}\u{205F}\u{3000}]+").expect("valid regex"));
static TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").expect("valid regex"));
// Three or more blank lines in a row.
static EXCESS_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").expect("valid regex"));
static MARKDOWN_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s+\S").expect("valid regex"));

/// Normalize line endings, quotes, dashes and whitespace. With
/// `preserve_structure`, heading lines become standalone paragraphs so the
/// chunker sees them as paragraph breaks.
pub fn preprocess(text: &str, preserve_structure: bool) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = normalize_punctuation(&text);
    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = TRAILING_WS.replace_all(&text, "");
    let text = if preserve_structure { reflow_headings(&text) } else { text.into_owned() };
    EXCESS_BLANK_LINES.replace_all(&text, "\n\n").trim().to_string()
}

fn normalize_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
            '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}' => '-',
            '\u{2026}' => '.',
            other => other,
        })
        .collect()
}

/// Heading heuristics: markdown `#` lines, short ALL-CAPS lines, short lines
/// ending with a colon.
pub fn is_heading(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.chars().count() > 80 {
        return false;
    }
    if MARKDOWN_HEADING.is_match(line) {
        return true;
    }
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    let all_caps = letters.len() >= 3 && letters.iter().all(|c| c.is_uppercase());
    let colon_label = line.ends_with(':') && line.split_whitespace().count() <= 8;
    all_caps || colon_label
}

fn reflow_headings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut after_heading = false;
    for line in text.split('\n') {
        if is_heading(line) {
            if !out.is_empty() && !out.ends_with("\n\n") {
                out.push_str(if out.ends_with('\n') { "\n" } else { "\n\n" });
            }
            out.push_str(line.trim());
            out.push_str("\n\n");
            after_heading = true;
        } else if after_heading && line.is_empty() {
            // The heading already ends its paragraph.
        } else {
            after_heading = false;
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
