//! Widgets built on the tag engine.

pub mod tags_input;

pub use tags_input::{TagsInput, TagsInputTheme};
