//! Tag-state engine: configuration, validation, storage, suggestions and events.
//!
//! Nothing in here knows about terminals or hosts; `widgets::tags_input` wires these
//! pieces to input events and render hooks.

pub mod events;
pub mod options;
pub mod store;
pub mod suggest;
pub mod validate;
