//! Ordered tag storage.
//!
//! The store owns the collection and applies the add pipeline (normalize, capacity,
//! validate). It does not emit events; callers sequence render hooks, host sync and
//! notifications around its results.

use crate::tags::options::TagsInputOptions;
use crate::tags::validate::{self, Rejection};

/// Delimiter used for the serialized, form-submittable value.
pub const SERIALIZED_DELIMITER: &str = ",";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(String),
    /// Nothing left after normalization. Not reported to anyone.
    Empty,
    Rejected { value: String, reason: Rejection },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagStore {
    tags: Vec<String>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes `raw` and appends it if capacity and validation allow.
    pub fn try_add(&mut self, raw: &str, options: &TagsInputOptions) -> AddOutcome {
        let value = validate::normalize(options, raw);
        if value.is_empty() {
            return AddOutcome::Empty;
        }

        if let Some(max) = options.max_tags {
            if self.tags.len() >= max {
                return AddOutcome::Rejected {
                    value,
                    reason: Rejection::CapacityReached { max },
                };
            }
        }

        if let Err(reason) = validate::validate(options, &value, &self.tags) {
            return AddOutcome::Rejected { value, reason };
        }

        self.tags.push(value.clone());
        AddOutcome::Added(value)
    }

    /// First index holding exactly `value` (no case folding).
    pub fn position(&self, value: &str) -> Option<usize> {
        self.tags.iter().position(|tag| tag == value)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        if index >= self.tags.len() {
            return None;
        }
        Some(self.tags.remove(index))
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn has(&self, value: &str) -> bool {
        self.position(value).is_some()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.tags.clone()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.tags.len().checked_sub(1)
    }

    pub fn serialize(&self) -> String {
        self.tags.join(SERIALIZED_DELIMITER)
    }
}
