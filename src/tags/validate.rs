//! Normalization and the validation pipeline.

use thiserror::Error;

use crate::core::text::width::grapheme_count;
use crate::tags::events::TagEventKind;
use crate::tags::options::{TagsInputOptions, Verdict};

/// Why a candidate tag was not added.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("tag has {len} characters, at least {min} required")]
    TooShort { len: usize, min: usize },

    #[error("tag has {len} characters, at most {max} allowed")]
    TooLong { len: usize, max: usize },

    #[error("tag is already present")]
    Duplicate,

    #[error("tag rejected by custom validator")]
    CustomValidation,

    #[error("tag limit of {max} reached")]
    CapacityReached { max: usize },
}

impl Rejection {
    /// Capacity rejections are reported as `max`, everything else as `invalid`.
    pub fn event_kind(&self) -> TagEventKind {
        match self {
            Rejection::CapacityReached { .. } => TagEventKind::Max,
            _ => TagEventKind::Invalid,
        }
    }
}

/// Applies the configured transform, or trims when none is configured.
pub fn normalize(options: &TagsInputOptions, raw: &str) -> String {
    match options.transform.as_ref() {
        Some(transform) => transform(raw),
        None => raw.trim().to_string(),
    }
}

/// Equality under the duplicate policy.
pub fn same_tag(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a == b || a.to_lowercase() == b.to_lowercase()
    }
}

/// Runs length, duplicate and custom checks on an already normalized value.
///
/// The first failing check wins.
pub fn validate(
    options: &TagsInputOptions,
    value: &str,
    existing: &[String],
) -> Result<(), Rejection> {
    let len = grapheme_count(value);
    if len < options.min_length {
        return Err(Rejection::TooShort {
            len,
            min: options.min_length,
        });
    }
    if let Some(max) = options.max_length {
        if len > max {
            return Err(Rejection::TooLong { len, max });
        }
    }

    if !options.allow_duplicates
        && existing
            .iter()
            .any(|tag| same_tag(tag, value, options.case_sensitive))
    {
        return Err(Rejection::Duplicate);
    }

    if let Some(custom) = options.validate.as_ref() {
        match custom(value) {
            Verdict::Accept => {}
            Verdict::Reject => return Err(Rejection::CustomValidation),
            Verdict::RejectWith(reason) => {
                log::debug!(target: crate::logging::LOG_TARGET, "custom validator rejected {value:?}: {reason}");
                return Err(Rejection::CustomValidation);
            }
        }
    }

    Ok(())
}
