//! The active filter state as an explicit, immutable value.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::EngineResult;
use crate::table::Table;

/// What one categorical dimension is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "values", rename_all = "snake_case")]
pub enum DimensionSelection {
    /// The full domain of the column in whatever table is being filtered.
    All,
    /// An explicit value set. Empty means nothing matches.
    Values(BTreeSet<String>),
}

impl DimensionSelection {
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Values(values.into_iter().map(Into::into).collect())
    }

    pub fn is_empty_selection(&self) -> bool {
        matches!(self, Self::Values(v) if v.is_empty())
    }
}

/// Column name → dimension selection. Built by the caller on every recompute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    dimensions: BTreeMap<String, DimensionSelection>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, selection: DimensionSelection) -> Self {
        self.dimensions.insert(column.into(), selection);
        self
    }

    pub fn with_all(self, column: impl Into<String>) -> Self {
        self.with(column, DimensionSelection::All)
    }

    pub fn with_values<I, S>(self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(column, DimensionSelection::values(values))
    }

    /// Narrow `column` to a single value. On a dimension that is already restricted this
    /// intersects, so a drill-down can never widen the view.
    pub fn with_drill_down(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        let column = column.into();
        let value = value.into();
        let narrowed = match self.dimensions.remove(&column) {
            Some(DimensionSelection::Values(existing)) => {
                DimensionSelection::Values(existing.into_iter().filter(|v| *v == value).collect())
            }
            Some(DimensionSelection::All) | None => DimensionSelection::values([value]),
        };
        self.dimensions.insert(column, narrowed);
        self
    }

    pub fn dimension(&self, column: &str) -> Option<&DimensionSelection> {
        self.dimensions.get(column)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = (&str, &DimensionSelection)> {
        self.dimensions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// True when some dimension deselects everything.
    pub fn is_empty_selection(&self) -> bool {
        self.dimensions
            .values()
            .any(DimensionSelection::is_empty_selection)
    }

    /// The concrete value set `column` stands for against `table`. `All` is expanded from the
    /// table's current domain on every call. `None` when the column is unconstrained.
    pub fn effective_values(
        &self,
        table: &Table,
        column: &str,
    ) -> EngineResult<Option<BTreeSet<String>>> {
        match self.dimensions.get(column) {
            None => Ok(None),
            Some(DimensionSelection::All) => {
                Ok(Some(table.domain(column)?.into_iter().collect()))
            }
            Some(DimensionSelection::Values(values)) => Ok(Some(values.clone())),
        }
    }
}
