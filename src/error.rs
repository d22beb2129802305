use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

/// Failure of a single chart request.
///
/// The `Display` form starts with the error-kind tag so that callers receiving
/// only the message text can still tell the kinds apart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("DataFormatError: {0}")]
    DataFormat(String),

    #[error(
        "ColumnNotFoundError: column '{column}' not found (available columns: {})",
        .available.join(", ")
    )]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("InvalidValueError: {0}")]
    InvalidValue(String),

    #[error("EncodingError: {0}")]
    Encoding(String),
}

impl ChartError {
    pub fn data_format(msg: impl Into<String>) -> Self {
        Self::DataFormat(msg.into())
    }

    pub fn column_not_found(column: impl Into<String>, available: Vec<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
            available,
        }
    }

    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// The error-kind tag, e.g. `"DataFormatError"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataFormat(_) => "DataFormatError",
            Self::ColumnNotFound { .. } => "ColumnNotFoundError",
            Self::InvalidValue(_) => "InvalidValueError",
            Self::Encoding(_) => "EncodingError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_starts_with_kind_tag() {
        let errors = [
            ChartError::data_format("x"),
            ChartError::column_not_found("x", vec![]),
            ChartError::invalid_value("x"),
            ChartError::encoding("x"),
        ];
        for err in errors {
            assert!(err.to_string().starts_with(&format!("{}: ", err.kind())));
        }
    }

    #[test]
    fn test_column_not_found_lists_available_columns() {
        let err = ChartError::column_not_found("missing", vec!["a".into(), "b".into()]);
        let msg = err.to_string();
        assert!(msg.contains("'missing'"));
        assert!(msg.contains("a, b"));
    }
}
