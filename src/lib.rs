//! Chip-style tag editor for a single-line form field.
//!
//! A [`TagsInput`] attaches to a host text field, hides it, and keeps its value in
//! sync with the serialized tag list so form submission still carries the tags.
//!
//! # Public API Overview
//! - Attach an editor with [`TagsInput::attach`] or [`TagsInput::attach_selector`].
//! - Configure separators, limits, validation and suggestions via [`TagsInputOptions`].
//! - Observe mutations with [`TagsInput::subscribe`] and [`TagEventKind`].
//! - Feed terminal input through [`Component::handle_event`] (see [`parse_input_events`])
//!   and draw with [`Component::render`].
//! - Drive deferred work (blur hide, rejection flash, removal animation) with
//!   [`TagsInput::tick`].

pub mod config;
pub mod error;
pub mod host;
pub mod logging;

pub mod core;
pub mod tags;
pub mod widgets;

/// The editor widget and its theme.
pub use crate::widgets::{TagsInput, TagsInputTheme};

/// Configuration and validation types.
pub use crate::tags::options::{TagsInputOptions, Verdict, DEFAULT_SEPARATOR, DEFAULT_SUGGESTIONS_LIMIT};
pub use crate::tags::validate::Rejection;

/// Event types.
pub use crate::tags::events::{SubscriptionId, TagEvent, TagEventKind};

/// Suggestion dropdown state as seen by renderers.
pub use crate::tags::suggest::SuggestionView;

/// Host collaborators and render hooks.
pub use crate::host::{
    ElementKind, FormDocument, FormField, HostDocument, HostInput, NullRenderer, RemovalToken,
    Renderer,
};

/// Construction errors.
pub use crate::error::TagsInputError;

/// Runtime component traits.
pub use crate::core::component::{Component, Focusable};

/// Keyboard input parsing and keybinding configuration.
pub use crate::core::input::{matches_key, parse_key};
pub use crate::core::input_event::{parse_input_events, InputEvent};
pub use crate::core::keybindings::{
    KeyBinding, KeyId, TagsAction, TagsKeybindings, TagsKeybindingsConfig,
    DEFAULT_TAGS_KEYBINDINGS,
};

/// Environment-driven configuration.
pub use crate::config::EnvConfig;

/// Returns whether a component exposes focus behavior via [`Focusable`].
pub fn is_focusable(component: &mut dyn Component) -> bool {
    component.as_focusable().is_some()
}

/// ANSI-aware truncation helper.
pub use crate::core::text::utils::truncate_to_width;
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
