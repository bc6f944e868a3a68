//! Dense two-dimensional cross-tabulation of a summed measure.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::aggregate::{group_sum_pair, AggregationResult, KeyPair};
use crate::error::EngineResult;
use crate::table::Table;

/// Rows × columns grid. Keys are the sorted values observed in the source table; every
/// combination without a backing record holds 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotMatrix {
    row_column: String,
    column_column: String,
    row_keys: Vec<String>,
    column_keys: Vec<String>,
    cells: Vec<Vec<f64>>,
}

/// Build the matrix of `measure` summed over (`row_column`, `col_column`).
pub fn pivot(
    table: &Table,
    row_column: &str,
    col_column: &str,
    measure: &str,
) -> EngineResult<PivotMatrix> {
    let pairs = group_sum_pair(table, row_column, col_column, measure)?;
    Ok(PivotMatrix::from_pairs(row_column, col_column, &pairs))
}

impl PivotMatrix {
    pub fn from_pairs(
        row_column: &str,
        column_column: &str,
        pairs: &AggregationResult<KeyPair>,
    ) -> Self {
        let row_keys: Vec<String> = pairs
            .keys()
            .map(|(r, _)| r.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let column_keys: Vec<String> = pairs
            .keys()
            .map(|(_, c)| c.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let row_index: HashMap<&str, usize> = row_keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i))
            .collect();
        let column_index: HashMap<&str, usize> = column_keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i))
            .collect();

        let mut cells = vec![vec![0.0; column_keys.len()]; row_keys.len()];
        for entry in pairs {
            let (r, c) = &entry.key;
            cells[row_index[r.as_str()]][column_index[c.as_str()]] += entry.sum;
        }

        Self {
            row_column: row_column.to_string(),
            column_column: column_column.to_string(),
            row_keys,
            column_keys,
            cells,
        }
    }

    pub fn row_column(&self) -> &str {
        &self.row_column
    }

    pub fn column_column(&self) -> &str {
        &self.column_column
    }

    pub fn row_keys(&self) -> &[String] {
        &self.row_keys
    }

    pub fn column_keys(&self) -> &[String] {
        &self.column_keys
    }

    /// Row-major cell values, `cells()[row][column]`.
    pub fn cells(&self) -> &[Vec<f64>] {
        &self.cells
    }

    /// `None` only when either key is outside the matrix.
    pub fn cell(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.row_keys.iter().position(|k| k == row)?;
        let c = self.column_keys.iter().position(|k| k == column)?;
        Some(self.cells[r][c])
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_keys.len(), self.column_keys.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty()
    }

    pub fn row_totals(&self) -> Vec<f64> {
        self.cells.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn column_totals(&self) -> Vec<f64> {
        (0..self.column_keys.len())
            .map(|c| self.cells.iter().map(|row| row[c]).sum())
            .collect()
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }
}
