//! Tag editor keybindings.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::core::input::normalize_key_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagsAction {
    /// Commit the highlighted suggestion, or the buffer when none is highlighted.
    Commit,
    /// Delete the grapheme before the cursor; removes the last tag when the buffer is empty.
    DeleteCharBackward,
    DeleteCharForward,
    DeleteWordBackward,
    DeleteToLineStart,
    CursorLeft,
    CursorRight,
    CursorLineStart,
    CursorLineEnd,
    SuggestionUp,
    SuggestionDown,
    DismissSuggestions,
}

pub type KeyId = String;

#[derive(Debug, Clone)]
pub enum KeyBinding {
    Single(KeyId),
    Multiple(Vec<KeyId>),
}

impl From<&str> for KeyBinding {
    fn from(value: &str) -> Self {
        KeyBinding::Single(value.to_string())
    }
}

impl From<Vec<&str>> for KeyBinding {
    fn from(value: Vec<&str>) -> Self {
        KeyBinding::Multiple(value.into_iter().map(str::to_string).collect())
    }
}

/// Per-action overrides layered over [`DEFAULT_TAGS_KEYBINDINGS`].
#[derive(Debug, Clone, Default)]
pub struct TagsKeybindingsConfig {
    entries: HashMap<TagsAction, KeyBinding>,
}

impl TagsKeybindingsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K: Into<KeyBinding>>(&mut self, action: TagsAction, keys: K) {
        self.entries.insert(action, keys.into());
    }
}

pub static DEFAULT_TAGS_KEYBINDINGS: Lazy<HashMap<TagsAction, Vec<KeyId>>> = Lazy::new(|| {
    use TagsAction::*;

    let defaults: [(TagsAction, &[&str]); 12] = [
        (Commit, &["enter"]),
        (DeleteCharBackward, &["backspace"]),
        (DeleteCharForward, &["delete", "ctrl+d"]),
        (DeleteWordBackward, &["ctrl+w", "alt+backspace"]),
        (DeleteToLineStart, &["ctrl+u"]),
        (CursorLeft, &["left", "ctrl+b"]),
        (CursorRight, &["right", "ctrl+f"]),
        (CursorLineStart, &["home", "ctrl+a"]),
        (CursorLineEnd, &["end", "ctrl+e"]),
        (SuggestionUp, &["up"]),
        (SuggestionDown, &["down"]),
        (DismissSuggestions, &["escape"]),
    ];
    defaults
        .into_iter()
        .map(|(action, keys)| (action, keys.iter().map(|key| key.to_string()).collect()))
        .collect()
});

#[derive(Debug, Clone)]
pub struct TagsKeybindings {
    action_to_keys: HashMap<TagsAction, Vec<KeyId>>,
}

impl Default for TagsKeybindings {
    fn default() -> Self {
        Self::new(&TagsKeybindingsConfig::default())
    }
}

impl TagsKeybindings {
    pub fn new(config: &TagsKeybindingsConfig) -> Self {
        let mut action_to_keys: HashMap<TagsAction, Vec<KeyId>> = DEFAULT_TAGS_KEYBINDINGS
            .iter()
            .map(|(action, keys)| (*action, keys.iter().map(|key| normalize_key_id(key)).collect()))
            .collect();

        for (action, binding) in &config.entries {
            let keys = match binding {
                KeyBinding::Single(key) => vec![normalize_key_id(key)],
                KeyBinding::Multiple(keys) => keys.iter().map(|key| normalize_key_id(key)).collect(),
            };
            action_to_keys.insert(*action, keys);
        }

        Self { action_to_keys }
    }

    /// Returns whether the parsed key id triggers `action`.
    pub fn matches(&self, key_id: &str, action: TagsAction) -> bool {
        self.action_to_keys
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|key| key == key_id))
    }

    /// First action bound to `key_id`, in declaration order of [`TagsAction`].
    pub fn action_for(&self, key_id: &str) -> Option<TagsAction> {
        use TagsAction::*;

        [
            Commit,
            DeleteCharBackward,
            DeleteCharForward,
            DeleteWordBackward,
            DeleteToLineStart,
            CursorLeft,
            CursorRight,
            CursorLineStart,
            CursorLineEnd,
            SuggestionUp,
            SuggestionDown,
            DismissSuggestions,
        ]
        .into_iter()
        .find(|action| self.matches(key_id, *action))
    }

    pub fn get_keys(&self, action: TagsAction) -> Vec<KeyId> {
        self.action_to_keys.get(&action).cloned().unwrap_or_default()
    }
}
