//! Construction errors.

use thiserror::Error;

use crate::host::ElementKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagsInputError {
    #[error("no element matches selector {selector:?}")]
    MissingTarget { selector: String },

    #[error("target element must be a single-line text input, found {found}")]
    NotAnInput { found: ElementKind },
}
