//! Error types for UQL.

use thiserror::Error;

/// The main error type for UQL operations.
#[derive(Debug, Error)]
pub enum UqlError {
    /// A query or filter failed a structural check.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A field or relation name does not match the qualified-identifier grammar.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// The value does not have the shape the operator requires.
    #[error("Invalid value for operator '{operator}': {reason}")]
    InvalidValue { operator: String, reason: String },

    /// An AND / OR node was built without children.
    #[error("{0} expression requires at least one child")]
    EmptyExpression(&'static str),

    /// The normalizer could not recognize the input shape.
    #[error("Cannot normalize filter: {0}")]
    Normalize(String),

    /// Unknown operator key.
    #[error("Unknown operator: '{0}'")]
    UnknownOperator(String),

    /// A membership operator was given an empty list.
    #[error("Operator '{operator}' on field '{field}' requires a non-empty list")]
    EmptyList { operator: String, field: String },

    /// The target cannot express the requested operator or query feature.
    #[error("{target} does not support {feature}")]
    Unsupported { target: &'static str, feature: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UqlError {
    /// Create an unsupported-feature error for a target.
    pub fn unsupported(target: &'static str, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            target,
            feature: feature.into(),
        }
    }

    /// Create an invalid-value error for an operator.
    pub fn invalid_value(operator: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            operator: operator.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised because a target cannot express something.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Result type alias for UQL operations.
pub type UqlResult<T> = Result<T, UqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UqlError::unsupported("SQL Server", "operator 'regex'");
        assert_eq!(err.to_string(), "SQL Server does not support operator 'regex'");
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_empty_list_names_field_and_operator() {
        let err = UqlError::EmptyList {
            operator: "in".to_string(),
            field: "status".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Operator 'in' on field 'status' requires a non-empty list"
        );
    }
}
