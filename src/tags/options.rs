//! Editor configuration.

use std::fmt;

use crate::core::keybindings::TagsKeybindingsConfig;

/// Outcome of a custom validator.
///
/// A reason string is never shown as an error message; it only ends up in debug logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
    RejectWith(String),
}

impl From<bool> for Verdict {
    fn from(value: bool) -> Self {
        if value {
            Verdict::Accept
        } else {
            Verdict::Reject
        }
    }
}

impl From<Result<(), String>> for Verdict {
    fn from(value: Result<(), String>) -> Self {
        match value {
            Ok(()) => Verdict::Accept,
            Err(reason) => Verdict::RejectWith(reason),
        }
    }
}

pub type ValidateFn = Box<dyn Fn(&str) -> Verdict>;
pub type TransformFn = Box<dyn Fn(&str) -> String>;

pub const DEFAULT_SEPARATOR: char = ',';
pub const DEFAULT_SUGGESTIONS_LIMIT: usize = 6;

/// Construction-time configuration. Fixed once the editor is attached.
pub struct TagsInputOptions {
    /// Tags added at construction and restored by `reset()`.
    pub initial_tags: Vec<String>,
    /// Characters that commit the preceding text when typed or pasted.
    pub separators: Vec<char>,
    /// `None` means unbounded.
    pub max_tags: Option<usize>,
    pub min_length: usize,
    /// `None` means unbounded.
    pub max_length: Option<usize>,
    pub allow_duplicates: bool,
    pub case_sensitive: bool,
    pub validate: Option<ValidateFn>,
    /// Normalizer applied before validation; trimming is used when unset.
    pub transform: Option<TransformFn>,
    pub suggestions: Vec<String>,
    pub suggestions_limit: usize,
    /// Falls back to the host field's placeholder.
    pub placeholder: Option<String>,
    pub readonly: bool,
    pub disabled: bool,
    pub keybindings: TagsKeybindingsConfig,
}

impl Default for TagsInputOptions {
    fn default() -> Self {
        Self {
            initial_tags: Vec::new(),
            separators: vec![DEFAULT_SEPARATOR],
            max_tags: None,
            min_length: 1,
            max_length: None,
            allow_duplicates: false,
            case_sensitive: true,
            validate: None,
            transform: None,
            suggestions: Vec::new(),
            suggestions_limit: DEFAULT_SUGGESTIONS_LIMIT,
            placeholder: None,
            readonly: false,
            disabled: false,
            keybindings: TagsKeybindingsConfig::default(),
        }
    }
}

impl TagsInputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.separators = separators.into_iter().collect();
        self
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_validate<F, V>(mut self, validate: F) -> Self
    where
        F: Fn(&str) -> V + 'static,
        V: Into<Verdict>,
    {
        self.validate = Some(Box::new(move |value| validate(value).into()));
        self
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + 'static,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    pub fn is_separator(&self, ch: char) -> bool {
        self.separators.contains(&ch)
    }
}

impl fmt::Debug for TagsInputOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagsInputOptions")
            .field("initial_tags", &self.initial_tags)
            .field("separators", &self.separators)
            .field("max_tags", &self.max_tags)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("allow_duplicates", &self.allow_duplicates)
            .field("case_sensitive", &self.case_sensitive)
            .field("validate", &self.validate.is_some())
            .field("transform", &self.transform.is_some())
            .field("suggestions", &self.suggestions.len())
            .field("suggestions_limit", &self.suggestions_limit)
            .field("placeholder", &self.placeholder)
            .field("readonly", &self.readonly)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{TagsInputOptions, Verdict};

    #[test]
    fn defaults_follow_documented_values() {
        let options = TagsInputOptions::default();
        assert_eq!(options.separators, vec![',']);
        assert_eq!(options.max_tags, None);
        assert_eq!(options.min_length, 1);
        assert_eq!(options.max_length, None);
        assert!(!options.allow_duplicates);
        assert!(options.case_sensitive);
        assert_eq!(options.suggestions_limit, 6);
        assert!(options.transform.is_none());
    }

    #[test]
    fn validators_accept_bool_or_reason() {
        let options = TagsInputOptions::new().with_validate(|value: &str| value != "nope");
        let validate = options.validate.as_ref().map(|f| f("nope"));
        assert_eq!(validate, Some(Verdict::Reject));

        let options = TagsInputOptions::new().with_validate(|value: &str| {
            if value.starts_with('#') {
                Ok(())
            } else {
                Err(format!("{value} must start with #"))
            }
        });
        let verdict = options.validate.as_ref().map(|f| f("rust"));
        assert_eq!(verdict, Some(Verdict::RejectWith("rust must start with #".to_string())));
    }
}
