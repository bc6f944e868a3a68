use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the derivation engine.
///
/// Only `DataUnavailable` is fatal for a whole dashboard; the other variants are
/// localized to the one derivation that hit them.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Data unavailable at {}: {reason}", .path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    #[error("Column not found: {field}")]
    ColumnNotFound { field: String },

    #[error("Cannot pick a dominant key from an empty aggregation")]
    EmptyAggregation,

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl EngineError {
    pub(crate) fn column_not_found(field: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            field: field.into(),
        }
    }

    /// True for the one failure after which no derivation may run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. })
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
