use thiserror::Error;

/// Every way a filter, order or select compilation can fail.
///
/// Errors abort the whole compile call; nothing is downgraded or skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Operator {0:?} is not supported")]
    UnsupportedOperator(String),

    #[error("No filter metadata registered for model {0:?}")]
    MissingModelMetadata(String),

    #[error("Field {0:?} is not filterable")]
    MissingFieldInfo(String),

    #[error("Operator {operator:?} is not supported by field {field:?}")]
    UnsupportedFieldOperator { field: String, operator: String },

    #[error("Invalid order direction {direction} for field {field:?}")]
    InvalidOrderDirection { field: String, direction: String },

    #[error("Malformed filter document: {0}")]
    MalformedDocument(String),

    #[error("Custom compiler for field {field:?} was registered for another backend")]
    BackendMismatch { field: String },
}

impl FilterError {
    /// True for errors caused by the incoming document rather than by how
    /// models were registered. Request handlers map these to a client error.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FilterError::UnsupportedOperator(_)
                | FilterError::MissingFieldInfo(_)
                | FilterError::InvalidOrderDirection { .. }
                | FilterError::MalformedDocument(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(FilterError::UnsupportedOperator("$foo".into()).is_client_error());
        assert!(FilterError::MissingFieldInfo("x".into()).is_client_error());
        assert!(!FilterError::MissingModelMetadata("users".into()).is_client_error());
        assert!(
            !FilterError::UnsupportedFieldOperator {
                field: "tag".into(),
                operator: "gt".into()
            }
            .is_client_error()
        );
    }

    #[test]
    fn test_messages_name_the_culprit() {
        let err = FilterError::UnsupportedFieldOperator {
            field: "score".into(),
            operator: "like".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"Operator "like" is not supported by field "score""#
        );
        assert_eq!(
            FilterError::UnsupportedOperator("$between".into()).to_string(),
            r#"Operator "$between" is not supported"#
        );
    }
}
