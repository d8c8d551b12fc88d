use thiserror::Error;

/// Convenience alias used across the analyst crates
pub type Result<T> = std::result::Result<T, AnalystError>;

/// Errors raised while building the corpus or answering a query.
///
/// None of these are retried internally; callers decide how to present them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalystError {
    #[error("Empty corpus: the dataset has no rows to index")]
    EmptyCorpus,

    #[error("Formatting error in row {row}, field '{field}': {reason}")]
    Formatting {
        row: usize,
        field: String,
        reason: String,
    },

    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("Embedding dimension mismatch: corpus has {expected}, query has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalystError {
    /// Build a formatting error for a row/field pair
    pub fn formatting(row: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalystError::Formatting {
            row,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalystError::formatting(2, "Sales (INR)", "missing column");
        assert_eq!(
            err.to_string(),
            "Formatting error in row 2, field 'Sales (INR)': missing column"
        );

        let err = AnalystError::DimensionMismatch {
            expected: 512,
            actual: 384,
        };
        assert!(err.to_string().contains("512"));
        assert!(err.to_string().contains("384"));
    }
}
