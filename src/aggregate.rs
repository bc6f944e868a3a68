//! Group-by-sum over one or two categorical columns.

use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::EngineResult;
use crate::table::{float_column, key_alias, key_expr, measure_expr, string_column, Table, SUM_ALIAS};

/// Key of a two-column grouping: (first column value, second column value).
pub type KeyPair = (String, String);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateEntry<K> {
    pub key: K,
    pub sum: f64,
}

/// Ordered `(key, sum)` entries with unique keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult<K> {
    entries: Vec<AggregateEntry<K>>,
}

impl<K> Default for AggregationResult<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K> AggregationResult<K> {
    /// Callers guarantee key uniqueness.
    pub fn from_entries(entries: Vec<AggregateEntry<K>>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AggregateEntry<K>] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<AggregateEntry<K>> {
        self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AggregateEntry<K>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|e| &e.key)
    }

    /// Sum over all entries; equals the measure total of the aggregated table.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.sum).sum()
    }
}

impl<K: PartialEq> AggregationResult<K> {
    pub fn get(&self, key: &K) -> Option<f64> {
        self.entries.iter().find(|e| &e.key == key).map(|e| e.sum)
    }
}

impl<'a, K> IntoIterator for &'a AggregationResult<K> {
    type Item = &'a AggregateEntry<K>;
    type IntoIter = std::slice::Iter<'a, AggregateEntry<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Collected frame with columns `__key0..__keyN` (sorted ascending) and `__sum`.
fn grouped_frame(table: &Table, keys: &[&str], measure: &str) -> EngineResult<DataFrame> {
    for key in keys {
        table.require_column(key)?;
    }
    table.require_column(measure)?;

    let aliases: Vec<String> = (0..keys.len()).map(key_alias).collect();
    let group_exprs: Vec<Expr> = keys
        .iter()
        .zip(&aliases)
        .map(|(key, alias)| key_expr(key).alias(alias.as_str()))
        .collect();
    let sort_exprs: Vec<Expr> = aliases.iter().map(|a| col(a.as_str())).collect();

    let df = table
        .lazy()
        .group_by(group_exprs)
        .agg([measure_expr(measure).sum().alias(SUM_ALIAS)])
        .sort_by_exprs(sort_exprs, SortMultipleOptions::default())
        .collect()?;
    debug!(keys = ?keys, measure, groups = df.height(), "grouped sum");
    Ok(df)
}

/// Sum `measure` per distinct value of `key`, keys ascending.
pub fn group_sum(table: &Table, key: &str, measure: &str) -> EngineResult<AggregationResult<String>> {
    let df = grouped_frame(table, &[key], measure)?;
    let keys = string_column(&df, &key_alias(0))?;
    let sums = float_column(&df, SUM_ALIAS)?;
    Ok(AggregationResult::from_entries(
        keys.into_iter()
            .zip(sums)
            .map(|(key, sum)| AggregateEntry { key, sum })
            .collect(),
    ))
}

/// Sum `measure` per observed `(first, second)` combination, ascending by first then second.
pub fn group_sum_pair(
    table: &Table,
    first: &str,
    second: &str,
    measure: &str,
) -> EngineResult<AggregationResult<KeyPair>> {
    let df = grouped_frame(table, &[first, second], measure)?;
    let firsts = string_column(&df, &key_alias(0))?;
    let seconds = string_column(&df, &key_alias(1))?;
    let sums = float_column(&df, SUM_ALIAS)?;
    Ok(AggregationResult::from_entries(
        firsts
            .into_iter()
            .zip(seconds)
            .zip(sums)
            .map(|(key, sum)| AggregateEntry { key, sum })
            .collect(),
    ))
}
