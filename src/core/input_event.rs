//! Structured input events delivered to the tag editor.

use crate::core::input::parse_key;
use crate::core::text::width::escape_len;

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

/// Input event delivered to components.
///
/// `raw` is the exact chunk received from the terminal. Text and paste events carry
/// decoded text so the editor never has to look at escape sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key { raw: String, key_id: String },
    Text { raw: String, text: String },
    Paste { raw: String, text: String },
    UnknownRaw { raw: String },
}

impl InputEvent {
    pub fn key(key_id: impl Into<String>) -> Self {
        let key_id = key_id.into();
        InputEvent::Key {
            raw: String::new(),
            key_id,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        InputEvent::Text {
            raw: text.clone(),
            text,
        }
    }

    pub fn paste(text: impl Into<String>) -> Self {
        let text = text.into();
        InputEvent::Paste {
            raw: format!("{PASTE_START}{text}{PASTE_END}"),
            text,
        }
    }
}

fn is_printable(data: &str) -> bool {
    !data.is_empty() && data.chars().all(|ch| !ch.is_control())
}

/// Byte length of the key sequence at the start of `data`, which begins with ESC.
///
/// CSI runs to its final byte, SS3 takes one more character, any other follower is
/// an alt-modified key. An unterminated CSI swallows the rest of the chunk.
fn escape_sequence_len(data: &str) -> usize {
    if let Some(len) = escape_len(data, 0) {
        return len;
    }
    let mut chars = data[1..].chars();
    match chars.next() {
        None => 1,
        Some('[') => data.len(),
        Some('O') => 2 + chars.next().map_or(0, char::len_utf8),
        Some(follower) => 1 + follower.len_utf8(),
    }
}

/// Splits a chunk into runs of printable text and single key sequences, in order.
fn split_sequences(data: &str) -> Vec<&str> {
    let mut sequences = Vec::new();
    let mut text_start = None;
    let mut pos = 0;

    while let Some(ch) = data[pos..].chars().next() {
        if !ch.is_control() {
            if text_start.is_none() {
                text_start = Some(pos);
            }
            pos += ch.len_utf8();
            continue;
        }
        if let Some(start) = text_start.take() {
            sequences.push(&data[start..pos]);
        }
        let len = if ch == '\x1b' {
            escape_sequence_len(&data[pos..])
        } else {
            ch.len_utf8()
        };
        sequences.push(&data[pos..pos + len]);
        pos += len;
    }

    if let Some(start) = text_start {
        sequences.push(&data[start..]);
    }
    sequences
}

fn parse_sequence(sequence: &str) -> InputEvent {
    if is_printable(sequence) {
        return InputEvent::Text {
            raw: sequence.to_string(),
            text: sequence.to_string(),
        };
    }

    match parse_key(sequence) {
        Some(key_id) => InputEvent::Key {
            raw: sequence.to_string(),
            key_id,
        },
        None => InputEvent::UnknownRaw {
            raw: sequence.to_string(),
        },
    }
}

fn parse_non_paste(data: &str) -> Vec<InputEvent> {
    split_sequences(data).into_iter().map(parse_sequence).collect()
}

/// Splits one read chunk into events; bracketed paste regions become `Paste`.
pub fn parse_input_events(data: &str) -> Vec<InputEvent> {
    let mut events = Vec::new();
    let mut remaining = data;
    while !remaining.is_empty() {
        let Some(start) = remaining.find(PASTE_START) else {
            events.extend(parse_non_paste(remaining));
            break;
        };

        events.extend(parse_non_paste(&remaining[..start]));

        let after_start = &remaining[start + PASTE_START.len()..];
        let Some(end_rel) = after_start.find(PASTE_END) else {
            events.push(InputEvent::UnknownRaw {
                raw: remaining[start..].to_string(),
            });
            break;
        };

        let raw_end = start + PASTE_START.len() + end_rel + PASTE_END.len();
        events.push(InputEvent::Paste {
            raw: remaining[start..raw_end].to_string(),
            text: after_start[..end_rel].to_string(),
        });
        remaining = &after_start[end_rel + PASTE_END.len()..];
    }
    events
}
