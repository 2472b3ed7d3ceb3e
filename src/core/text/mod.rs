//! Text helpers (grapheme segmentation, visible width, truncation).
//!
//! These helpers are pure (string in/string out) so both the tag engine and the
//! terminal widget can use them.

pub mod utils;
pub mod width;
