use thiserror::Error;

/// A value in the source table that cannot be coerced into a [`Record`].
///
/// Always fatal: a table with a malformed field is never partially loaded.
///
/// [`Record`]: super::model::Record
#[derive(Debug, Error, PartialEq)]
pub enum DataFormatError {
    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("row {row}, column '{column}': '{value}' is not {expected}")]
    InvalidValue {
        /// 1-based data row, not counting the header line.
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },
}

impl DataFormatError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub fn invalid(
        row: usize,
        column: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidValue {
            row,
            column: column.into(),
            value: value.into(),
            expected,
        }
    }
}
