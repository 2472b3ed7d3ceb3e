//! Grapheme width and visible width helpers.

use emojis::get as emoji_get;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 3;

/// Byte length of the escape sequence starting at `pos`, if any.
///
/// Recognizes CSI (`ESC [ ... final`) and string-terminated OSC/APC/DCS sequences
/// (terminated by BEL or `ESC \`). Themes only emit these, so nothing else is skipped.
pub fn escape_len(input: &str, pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&0x1b) {
        return None;
    }
    match bytes.get(pos + 1)? {
        b'[' => bytes
            .iter()
            .enumerate()
            .skip(pos + 2)
            .find(|(_, b)| (0x40..=0x7e).contains(*b))
            .map(|(idx, _)| idx + 1 - pos),
        b']' | b'_' | b'P' => {
            let mut idx = pos + 2;
            while idx < bytes.len() {
                if bytes[idx] == 0x07 {
                    return Some(idx + 1 - pos);
                }
                if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
                    return Some(idx + 2 - pos);
                }
                idx += 1;
            }
            None
        }
        _ => None,
    }
}

/// Removes escape sequences, keeping only printable text.
pub fn strip_escapes(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(len) = escape_len(input, idx) {
            idx += len;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        clean.push(ch);
        idx += ch.len_utf8();
    }
    clean
}

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_empty() {
        return 0;
    }
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    if emoji_get(grapheme).is_some() {
        return 2;
    }
    grapheme
        .chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

/// Terminal columns occupied by `input`, ignoring escape sequences.
pub fn visible_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }
    strip_escapes(input).graphemes(true).map(grapheme_width).sum()
}

/// Number of user-perceived characters; tag length limits are measured with this.
pub fn grapheme_count(input: &str) -> usize {
    input.graphemes(true).count()
}
