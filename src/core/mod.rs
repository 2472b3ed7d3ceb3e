//! Terminal plumbing shared by widgets: key parsing, events, keybindings and text width.

pub mod component;
pub mod deferred;
pub mod input;
pub mod input_event;
pub mod keybindings;
pub mod text;
