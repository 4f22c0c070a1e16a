//! Text preparation applied before every provider call.
//!
//! 1. Unicode NFC normalization
//! 2. Control / non-printable characters dropped (newlines and tabs become spaces)
//! 3. Whitespace runs collapsed, ends trimmed
//! 4. Truncation to `max_chars` characters, preferring a word boundary

use unicode_normalization::UnicodeNormalization;

pub fn prepare_text(text: &str, max_chars: usize) -> String {
    let normalized: String = text
        .nfc()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| !c.is_control() && !is_invisible(*c))
        .collect();
    let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, max_chars)
}

fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200F}' | '\u{FEFF}' | '\u{2060}')
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    // Back off to the last space when it keeps most of the budget.
    match cut.rfind(' ') {
        Some(pos) if cut[..pos].chars().count() >= max_chars * 4 / 5 => cut[..pos].to_string(),
        _ => cut,
    }
}
