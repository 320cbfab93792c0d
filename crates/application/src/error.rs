//! Application error types

use strata_domain::{DomainError, VariableType};
use thiserror::Error;

/// Failures while parsing or evaluating a template expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExpressionError {
    /// The expression inside `${...}` could not be parsed.
    #[error("syntax error in {expression:?}: {reason}")]
    Syntax {
        /// The offending expression text.
        expression: String,
        /// What went wrong.
        reason: String,
    },

    /// A `${` was never closed.
    #[error("unterminated expression starting at byte {0}")]
    Unterminated(usize),

    /// A bare reference named a variable that is not (yet) resolved.
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    /// The called function does not exist.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// A function was called with the wrong number of arguments.
    #[error("{function} expects {expected} argument(s), got {actual}")]
    Arity {
        /// Function name.
        function: String,
        /// Declared arity.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },

    /// A function argument has the wrong type.
    #[error("{function}: argument {position} {reason}")]
    ArgumentType {
        /// Function name.
        function: String,
        /// 1-based argument position.
        position: usize,
        /// What was expected.
        reason: String,
    },

    /// A regular expression argument failed to compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The pattern text.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// `assert` evaluated a false condition.
    #[error("assertion failed: {0}")]
    AssertionFailed(String),
}

/// The way a single field broke its declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Required and not supplied.
    Missing,
    /// Supplied with a value of the wrong type.
    TypeMismatch {
        /// Declared type.
        expected: VariableType,
    },
    /// Supplied but otherwise unacceptable.
    Invalid(String),
}

/// One offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Field path, e.g. `instances` or `plans[1].name`.
    pub field: String,
    /// What is wrong with it.
    pub kind: ViolationKind,
}

impl FieldViolation {
    /// A required field is missing.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ViolationKind::Missing,
        }
    }

    /// A field has the wrong type.
    #[must_use]
    pub fn type_mismatch(field: impl Into<String>, expected: VariableType) -> Self {
        Self {
            field: field.into(),
            kind: ViolationKind::TypeMismatch { expected },
        }
    }

    /// A field is otherwise invalid.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ViolationKind::Invalid(reason.into()),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ViolationKind::Missing => write!(f, "{}: required field is missing", self.field),
            ViolationKind::TypeMismatch { expected } => {
                write!(f, "{}: expected a value of type {expected}", self.field)
            }
            ViolationKind::Invalid(reason) => write!(f, "{}: {reason}", self.field),
        }
    }
}

/// Every structural violation found while checking one unit (a request, a plan list).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", .violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct SchemaError {
    /// The violations, in discovery order.
    pub violations: Vec<FieldViolation>,
}

impl SchemaError {
    /// Returns `Err` if any violations were collected.
    ///
    /// # Errors
    /// Returns the aggregated `SchemaError` when `violations` is non-empty.
    pub fn check(violations: Vec<FieldViolation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }

    /// Returns the names of the offending fields.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A JSON document handed in by a collaborator was malformed.
    #[error("Error parsing {what}: {source}")]
    Decode {
        /// What was being decoded.
        what: String,
        /// The decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// Template evaluation failed.
    #[error("expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// Required fields were missing or mistyped.
    #[error("validation error: {0}")]
    Schema(#[from] SchemaError),

    /// A domain invariant was violated.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A lookup found no match.
    #[error("{0}")]
    NotFound(String),
}

impl ApplicationError {
    /// Wraps a decoder error with a description of the document.
    #[must_use]
    pub fn decode(what: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            what: what.into(),
            source,
        }
    }

    /// Returns true for malformed input documents.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Returns true for template evaluation failures.
    #[must_use]
    pub fn is_expression(&self) -> bool {
        matches!(self, Self::Expression(_))
    }

    /// Returns true for aggregated validation failures.
    #[must_use]
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Returns true for failed lookups.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
