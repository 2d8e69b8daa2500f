//! Range and consistency checks on configuration and effect definitions.

use core::fmt;

use crate::common::ErrorSeverity;

/// A rejected configuration value or effect parameter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: String,
        /// Rendered with `Debug`, so floats keep their fraction
        value: String,
        min: String,
        max: String,
    },

    #[error("Required field '{0}' is missing")]
    Required(String),

    /// Two effects share a name; names key the catalog
    #[error("Duplicate {field} '{value}'")]
    Duplicate { field: String, value: String },

    #[error("Duration bounds are inverted or empty: min {min_ms} ms, max {max_ms} ms")]
    DurationBounds { min_ms: u32, max_ms: u32 },
}

impl ValidationError {
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    /// Name of the offending field, when there is a single one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::Duplicate { field, .. } => Some(field),
            ValidationError::Required(field) => Some(field),
            ValidationError::DurationBounds { .. } => None,
        }
    }

    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required(field.into())
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }
}
