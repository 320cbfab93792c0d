//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while building or checking domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A variable name is blank or contains characters outside the allowed set.
    #[error("invalid variable name: {0:?}")]
    InvalidVariableName(String),

    /// The same variable was declared more than once in one schema.
    #[error("duplicate variable declaration: {0}")]
    DuplicateVariable(String),

    /// A string could not be converted into the declared variable type.
    #[error("cannot convert {value:?} to {expected}")]
    Coercion {
        /// The declared type name.
        expected: String,
        /// The raw value that failed to convert.
        value: String,
    },

    /// Several schema declarations were invalid at once.
    #[error("invalid schema: {}", join_errors(.0))]
    InvalidSchema(Vec<DomainError>),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

fn join_errors(errors: &[DomainError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
