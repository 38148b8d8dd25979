#![forbid(unsafe_code)]

//! Query validation errors.

use thiserror::Error;

/// Convenience alias for results produced while building queries.
pub type Result<T> = std::result::Result<T, PqlError>;

/// Query validation errors raised while constructing query nodes.
///
/// Every failure is detected synchronously at construction time; rendering an
/// already-built node cannot fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PqlError {
    /// A composite query received more inputs than it accepts.
    #[error("number of inputs ({count}) exceeds input limit ({limit}) for {query} query")]
    InputLimitExceeded {
        /// Query variant name.
        query: &'static str,
        /// Number of inputs supplied.
        count: usize,
        /// Maximum number of inputs the variant accepts.
        limit: usize,
    },
    /// An attribute mutation was built without any attribute.
    #[error("no attribute provided for {query} query")]
    NoAttributes {
        /// Query variant name.
        query: &'static str,
    },
    /// An attribute name is not an identifier (`[A-Za-z_][A-Za-z0-9_]*`).
    #[error("attribute name '{name}' for {query} query is not an identifier")]
    InvalidAttributeName {
        /// Query variant name.
        query: &'static str,
        /// Rejected attribute name.
        name: String,
    },
    /// TopN filter values were given without the field they apply to.
    #[error("filter values for {query} query require a filter field")]
    MissingFilterField {
        /// Query variant name.
        query: &'static str,
    },
    /// An integer field received a value that cannot be read as an integer.
    #[error("{field} for {query} query must be an integer (got {value})")]
    NotAnInteger {
        /// Query variant name.
        query: &'static str,
        /// Offending field.
        field: &'static str,
        /// Textual form of the rejected value.
        value: String,
    },
    /// A non-composite kind was passed where child queries are expected.
    #[error("{query} query does not take query inputs")]
    NotComposite {
        /// Query variant name.
        query: &'static str,
    },
}

impl PqlError {
    /// Returns a machine-readable code for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            PqlError::InputLimitExceeded { .. } => "InputLimitExceeded",
            PqlError::NoAttributes { .. } => "NoAttributes",
            PqlError::InvalidAttributeName { .. } => "InvalidAttributeName",
            PqlError::MissingFilterField { .. } => "MissingFilterField",
            PqlError::NotAnInteger { .. } => "NotAnInteger",
            PqlError::NotComposite { .. } => "NotComposite",
        }
    }

    /// Name of the query variant that rejected its input.
    pub fn query(&self) -> &'static str {
        match self {
            PqlError::InputLimitExceeded { query, .. }
            | PqlError::NoAttributes { query }
            | PqlError::InvalidAttributeName { query, .. }
            | PqlError::MissingFilterField { query }
            | PqlError::NotAnInteger { query, .. }
            | PqlError::NotComposite { query } => query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_limit_message_names_count_limit_and_query() {
        let err = PqlError::InputLimitExceeded {
            query: "Difference",
            count: 3,
            limit: 2,
        };
        assert_eq!(
            err.to_string(),
            "number of inputs (3) exceeds input limit (2) for Difference query"
        );
        assert_eq!(err.code(), "InputLimitExceeded");
        assert_eq!(err.query(), "Difference");
    }

    #[test]
    fn not_an_integer_message_quotes_value() {
        let err = PqlError::NotAnInteger {
            query: "SetBit",
            field: "profile_id",
            value: "\"abc\"".into(),
        };
        assert_eq!(
            err.to_string(),
            "profile_id for SetBit query must be an integer (got \"abc\")"
        );
    }

    #[test]
    fn invalid_attribute_name_quotes_the_name() {
        let err = PqlError::InvalidAttributeName {
            query: "SetProfileAttrs",
            name: "x=1, y".into(),
        };
        assert_eq!(
            err.to_string(),
            "attribute name 'x=1, y' for SetProfileAttrs query is not an identifier"
        );
        assert_eq!(err.code(), "InvalidAttributeName");
        assert_eq!(err.query(), "SetProfileAttrs");
    }
}
