//! Key parsing for raw terminal input.
//!
//! Only the legacy (xterm/VT) encodings are recognized. Key ids use the same
//! vocabulary as keybinding configs: `enter`, `escape`, `backspace`, `up`,
//! `ctrl+w`, `alt+backspace`, plain printable characters, and so on.

const LEGACY_UP: [&str; 2] = ["\x1b[A", "\x1bOA"];
const LEGACY_DOWN: [&str; 2] = ["\x1b[B", "\x1bOB"];
const LEGACY_RIGHT: [&str; 2] = ["\x1b[C", "\x1bOC"];
const LEGACY_LEFT: [&str; 2] = ["\x1b[D", "\x1bOD"];
const LEGACY_HOME: [&str; 4] = ["\x1b[H", "\x1bOH", "\x1b[1~", "\x1b[7~"];
const LEGACY_END: [&str; 4] = ["\x1b[F", "\x1bOF", "\x1b[4~", "\x1b[8~"];
const LEGACY_DELETE: [&str; 1] = ["\x1b[3~"];
const LEGACY_PAGE_UP: [&str; 1] = ["\x1b[5~"];
const LEGACY_PAGE_DOWN: [&str; 1] = ["\x1b[6~"];

fn legacy_sequence_key_id(data: &str) -> Option<&'static str> {
    let table: [(&[&str], &'static str); 9] = [
        (&LEGACY_UP, "up"),
        (&LEGACY_DOWN, "down"),
        (&LEGACY_RIGHT, "right"),
        (&LEGACY_LEFT, "left"),
        (&LEGACY_HOME, "home"),
        (&LEGACY_END, "end"),
        (&LEGACY_DELETE, "delete"),
        (&LEGACY_PAGE_UP, "pageUp"),
        (&LEGACY_PAGE_DOWN, "pageDown"),
    ];
    table
        .iter()
        .find(|(sequences, _)| sequences.contains(&data))
        .map(|(_, key_id)| *key_id)
}

/// Parses a single raw key chunk into a key id.
pub fn parse_key(data: &str) -> Option<String> {
    if let Some(key_id) = legacy_sequence_key_id(data) {
        return Some(key_id.to_string());
    }

    match data {
        "\x1b" => return Some("escape".to_string()),
        "\t" => return Some("tab".to_string()),
        "\x1b[Z" => return Some("shift+tab".to_string()),
        "\r" | "\n" | "\x1bOM" => return Some("enter".to_string()),
        "\x1b\r" => return Some("alt+enter".to_string()),
        " " => return Some("space".to_string()),
        "\x00" => return Some("ctrl+space".to_string()),
        "\x7f" | "\x08" => return Some("backspace".to_string()),
        "\x1b\x7f" | "\x1b\x08" => return Some("alt+backspace".to_string()),
        "\x1bb" | "\x1bB" => return Some("alt+left".to_string()),
        "\x1bf" | "\x1bF" => return Some("alt+right".to_string()),
        _ => {}
    }

    let bytes = data.as_bytes();
    match bytes {
        [code] if (1..=26).contains(code) => Some(format!("ctrl+{}", (code + 96) as char)),
        [code] if (32..=126).contains(code) => Some(data.to_string()),
        [0x1b, code] if code.is_ascii_lowercase() => Some(format!("alt+{}", *code as char)),
        _ => None,
    }
}

/// Normalizes a configured key id (`Ctrl+W`, `esc`, `return`) to the parser's spelling.
pub fn normalize_key_id(key_id: &str) -> String {
    let lowered = key_id.to_ascii_lowercase();
    let mut parts: Vec<&str> = lowered.split('+').collect();
    let key = match parts.pop() {
        Some("esc") => "escape",
        Some("return") => "enter",
        Some("pageup") => "pageUp",
        Some("pagedown") => "pageDown",
        Some(other) => other,
        None => return String::new(),
    };
    parts.sort_by_key(|modifier| match *modifier {
        "shift" => 0,
        "ctrl" => 1,
        "alt" => 2,
        _ => 3,
    });
    parts.push(key);
    parts.join("+")
}

/// Returns whether the raw chunk `data` is the key named by `key_id`.
pub fn matches_key(data: &str, key_id: &str) -> bool {
    parse_key(data).is_some_and(|parsed| parsed == normalize_key_id(key_id))
}

#[cfg(test)]
mod tests {
    use super::{matches_key, normalize_key_id, parse_key};

    #[test]
    fn control_bytes_map_to_named_keys() {
        assert_eq!(parse_key("\r").as_deref(), Some("enter"));
        assert_eq!(parse_key("\x7f").as_deref(), Some("backspace"));
        assert_eq!(parse_key("\x1b").as_deref(), Some("escape"));
        assert_eq!(parse_key("\x17").as_deref(), Some("ctrl+w"));
        assert_eq!(parse_key("\x1b\x7f").as_deref(), Some("alt+backspace"));
    }

    #[test]
    fn arrows_parse_in_both_cursor_modes() {
        assert_eq!(parse_key("\x1b[A").as_deref(), Some("up"));
        assert_eq!(parse_key("\x1bOB").as_deref(), Some("down"));
        assert_eq!(parse_key("\x1b[3~").as_deref(), Some("delete"));
    }

    #[test]
    fn unknown_sequences_are_none() {
        assert_eq!(parse_key("\x1b[999z"), None);
        assert_eq!(parse_key("ab"), None);
    }

    #[test]
    fn key_ids_are_normalized_before_matching() {
        assert_eq!(normalize_key_id("Alt+Ctrl+W"), "ctrl+alt+w");
        assert!(matches_key("\x1b", "esc"));
        assert!(matches_key("\r", "Return"));
        assert!(!matches_key("\r", "escape"));
    }
}
