//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent a society tree that does not fit the expected shape.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("structural violation in {context}: {message}")]
    StructuralViolation { context: String, message: String },

    #[error("component {classname} has no argument at index {index} ({count} present)")]
    MissingArgument {
        classname: String,
        index: usize,
        count: usize,
    },
}

impl DomainError {
    pub fn structural(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StructuralViolation {
            context: context.into(),
            message: message.into(),
        }
    }
}
