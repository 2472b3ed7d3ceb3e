//! Utility helpers for grapheme-aware editing and width-bounded output.

use unicode_segmentation::UnicodeSegmentation;

use super::width::{escape_len, visible_width};

const ANSI_RESET: &str = "\x1b[0m";

pub fn grapheme_segments(text: &str) -> unicode_segmentation::Graphemes<'_> {
    UnicodeSegmentation::graphemes(text, true)
}

pub fn is_whitespace_char(ch: char) -> bool {
    ch.is_whitespace()
}

pub fn is_punctuation_char(ch: char) -> bool {
    ch.is_ascii_punctuation() && ch != '_'
}

/// Truncates `text` to `max_width` columns, appending `ellipsis` when anything was cut.
///
/// Escape sequences are copied through untouched and a reset is emitted before the
/// ellipsis so styling doesn't bleed into it.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if max_width == 0 {
        return String::new();
    }
    if visible_width(text) <= max_width {
        return text.to_string();
    }

    let target_width = max_width.saturating_sub(visible_width(ellipsis));
    if target_width == 0 {
        return ellipsis.chars().take(max_width).collect();
    }

    let mut truncated = String::with_capacity(text.len());
    let mut current_width = 0;
    let mut idx = 0;
    'outer: while idx < text.len() {
        if let Some(len) = escape_len(text, idx) {
            truncated.push_str(&text[idx..idx + len]);
            idx += len;
            continue;
        }
        let run_end = next_escape_or_end(text, idx);
        for grapheme in grapheme_segments(&text[idx..run_end]) {
            let width = visible_width(grapheme);
            if current_width + width > target_width {
                break 'outer;
            }
            truncated.push_str(grapheme);
            current_width += width;
        }
        idx = run_end;
    }

    truncated.push_str(ANSI_RESET);
    truncated.push_str(ellipsis);
    truncated
}

fn next_escape_or_end(input: &str, mut idx: usize) -> usize {
    while idx < input.len() {
        if escape_len(input, idx).is_some() {
            break;
        }
        match input[idx..].chars().next() {
            Some(ch) => idx += ch.len_utf8(),
            None => break,
        }
    }
    idx
}
