//! Row subset matching a [`Selection`].

use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::EngineResult;
use crate::selection::{DimensionSelection, Selection};
use crate::table::{key_expr, Table};

/// A single `is_in` over the whole value set. `None` for an empty set.
fn membership_expr(column: &str, values: &BTreeSet<String>) -> Option<Expr> {
    if values.is_empty() {
        return None;
    }
    let values: Vec<&str> = values.iter().map(String::as_str).collect();
    let set = Series::new(PlSmallStr::EMPTY, values);
    Some(key_expr(column).is_in(lit(set).implode(), false))
}

/// Keep row `r` iff `r[d]` is in the selected values of every dimension `d`.
///
/// `All` adds no predicate. An empty value set yields an empty table with the same columns.
/// Every selected column must exist in `table`.
pub fn apply(table: &Table, selection: &Selection) -> EngineResult<Table> {
    let mut predicate: Option<Expr> = None;
    let mut empty = false;

    for (column, dimension) in selection.dimensions() {
        table.require_column(column)?;
        let values = match dimension {
            DimensionSelection::All => continue,
            DimensionSelection::Values(values) => values,
        };
        match membership_expr(column, values) {
            Some(expr) => {
                predicate = Some(match predicate {
                    Some(current) => current.and(expr),
                    None => expr,
                });
            }
            None => empty = true,
        }
    }

    if empty {
        debug!("empty selection, no rows kept");
        return Ok(table.empty_like());
    }
    match predicate {
        Some(predicate) => table.filtered(predicate),
        None => Ok(table.clone()),
    }
}
