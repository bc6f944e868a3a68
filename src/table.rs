//! The loaded dataset: an immutable polars `DataFrame` plus the CSV load contract.

use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

/// Label used for null categorical values so grouped sums still add up to the table total.
pub const MISSING_KEY: &str = "(missing)";

pub(crate) const SUM_ALIAS: &str = "__sum";

pub(crate) fn key_alias(position: usize) -> String {
    format!("__key{}", position)
}

/// Categorical view of a column: cast to string, nulls folded into `MISSING_KEY`.
pub(crate) fn key_expr(column: &str) -> Expr {
    col(column)
        .cast(DataType::String)
        .fill_null(lit(MISSING_KEY))
}

/// Numeric view of a measure column. The cast is non-strict, so unparseable values become
/// null; those and the non-finite parses (`"NaN"`, `"inf"`) contribute 0.
pub(crate) fn measure_expr(column: &str) -> Expr {
    let value = col(column).cast(DataType::Float64);
    when(value.clone().is_finite())
        .then(value)
        .otherwise(lit(0.0))
}

pub(crate) fn string_column(df: &DataFrame, name: &str) -> EngineResult<Vec<String>> {
    let values = df.column(name)?.str()?;
    Ok(values
        .into_iter()
        .map(|v| v.unwrap_or(MISSING_KEY).to_string())
        .collect())
}

pub(crate) fn float_column(df: &DataFrame, name: &str) -> EngineResult<Vec<f64>> {
    let values = df.column(name)?.f64()?;
    Ok(values.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}

/// CSV loading knobs shared by the CLI and the config file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    pub infer_schema_length: Option<usize>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = Some(has_header);
        self
    }

    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }
}

/// Immutable in-memory table. Cloning is cheap (columns are reference counted) and filtering
/// always produces a new, independent `Table`.
#[derive(Clone, Debug)]
pub struct Table {
    df: DataFrame,
}

impl Table {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    /// Load a delimited text file. Any failure (absent file, unreadable or malformed content,
    /// no columns) is reported as `DataUnavailable`.
    pub fn from_csv(path: &Path, options: &LoadOptions) -> EngineResult<Self> {
        let unavailable = |reason: String| EngineError::DataUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(unavailable("file not found".to_string()));
        }

        let pl_path = PlPath::Local(Arc::from(path));
        let mut reader = LazyCsvReader::new(pl_path);
        if let Some(delimiter) = options.delimiter {
            reader = reader.with_separator(delimiter);
        }
        if let Some(has_header) = options.has_header {
            reader = reader.with_has_header(has_header);
        }
        if let Some(rows) = options.infer_schema_length {
            reader = reader.with_infer_schema_length(Some(rows));
        }

        let df = reader
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| unavailable(e.to_string()))?;
        if df.width() == 0 {
            return Err(unavailable("no columns".to_string()));
        }

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded table"
        );
        Ok(Self::new(df))
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    pub(crate) fn require_column(&self, name: &str) -> EngineResult<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(EngineError::column_not_found(name))
        }
    }

    pub(crate) fn lazy(&self) -> LazyFrame {
        self.df.clone().lazy()
    }

    pub(crate) fn filtered(&self, predicate: Expr) -> EngineResult<Table> {
        let df = self.lazy().filter(predicate).collect()?;
        debug!(rows_in = self.height(), rows_out = df.height(), "filtered table");
        Ok(Table::new(df))
    }

    /// Same columns, zero rows.
    pub(crate) fn empty_like(&self) -> Table {
        Table::new(self.df.head(Some(0)))
    }

    /// Sorted distinct values of `column` in this table.
    pub fn domain(&self, column: &str) -> EngineResult<Vec<String>> {
        self.require_column(column)?;
        let alias = key_alias(0);
        let out = self
            .lazy()
            .select([key_expr(column).alias(alias.as_str())])
            .collect()?;
        let distinct: BTreeSet<String> = string_column(&out, &alias)?.into_iter().collect();
        Ok(distinct.into_iter().collect())
    }

    pub fn n_unique(&self, column: &str) -> EngineResult<usize> {
        Ok(self.domain(column)?.len())
    }

    /// Sum of a measure column; null and non-numeric values contribute 0.
    pub fn measure_total(&self, column: &str) -> EngineResult<f64> {
        self.require_column(column)?;
        let out = self
            .lazy()
            .select([measure_expr(column).sum().alias(SUM_ALIAS)])
            .collect()?;
        Ok(float_column(&out, SUM_ALIAS)?.first().copied().unwrap_or(0.0))
    }
}

impl From<DataFrame> for Table {
    fn from(df: DataFrame) -> Self {
        Self::new(df)
    }
}
