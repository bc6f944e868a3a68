//! Composition of every derived view the dashboard shows.
//!
//! Filtering is the only shared step; after it each view is derived on its own and a
//! failure (unresolved column, empty aggregation) turns that one view into
//! [`View::Unavailable`] without touching its siblings.

use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregate::{group_sum, AggregateEntry, AggregationResult};
use crate::columns::{LogicalField, ResolvedColumns};
use crate::error::EngineResult;
use crate::filter;
use crate::flow::{build_flow, FlowGraph};
use crate::pivot::{pivot, PivotMatrix};
use crate::rank::{ascending_by_sum, dominant, rank_descending, shares, top_n, ShareEntry};
use crate::selection::{DimensionSelection, Selection};
use crate::table::Table;

pub const DEFAULT_TOP_N: usize = 15;

/// A derived view, or the reason it could not be derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum View<T> {
    Ready { data: T },
    Unavailable { reason: String },
}

impl<T> View<T> {
    pub fn ready(data: T) -> Self {
        View::Ready { data }
    }

    fn from_result(name: &str, result: EngineResult<T>) -> Self {
        match result {
            Ok(data) => View::Ready { data },
            Err(e) => {
                warn!(view = name, error = %e, "view unavailable");
                View::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, View::Ready { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            View::Ready { data } => Some(data),
            View::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            View::Ready { .. } => None,
            View::Unavailable { reason } => Some(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    /// Entries in the top support-type view.
    pub top_n: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// What the interaction layer chose: districts and an optional pillar drill-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSelection {
    pub districts: DimensionSelection,
    pub pillar: Option<String>,
}

impl Default for DashboardSelection {
    fn default() -> Self {
        Self {
            districts: DimensionSelection::All,
            pillar: None,
        }
    }
}

impl DashboardSelection {
    /// Translate into a column-level [`Selection`]. A pillar drill-down needs the pillar
    /// column to be resolved.
    pub fn to_selection(&self, columns: &ResolvedColumns) -> EngineResult<Selection> {
        let mut selection = Selection::new().with(
            columns.get(LogicalField::District)?,
            self.districts.clone(),
        );
        if let Some(pillar) = &self.pillar {
            selection = selection.with_drill_down(columns.get(LogicalField::Pillar)?, pillar);
        }
        Ok(selection)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    pub total_beneficiaries: View<f64>,
    pub top_district: View<AggregateEntry<String>>,
    pub active_blocks: View<usize>,
    pub support_categories: View<usize>,
}

/// Fine-grained category totals, labelled with the column they were read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub column: String,
    pub totals: AggregationResult<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub rows: usize,
    pub selection: Selection,
    pub metrics: HeadlineMetrics,
    /// Top support types, low to high.
    pub support_type_top: View<AggregationResult<String>>,
    pub broad_category_share: View<Vec<ShareEntry<String>>>,
    /// Districts, high to low.
    pub district_demand: View<AggregationResult<String>>,
    pub category_breakdown: View<CategoryBreakdown>,
    pub district_category_pivot: View<PivotMatrix>,
    pub pillar_flow: View<FlowGraph>,
}

pub struct Dashboard<'a> {
    columns: &'a ResolvedColumns,
    options: DashboardOptions,
}

impl<'a> Dashboard<'a> {
    pub fn new(columns: &'a ResolvedColumns, options: DashboardOptions) -> Self {
        Self { columns, options }
    }

    fn column(&self, field: LogicalField) -> EngineResult<&'a str> {
        self.columns.get(field)
    }

    fn measure(&self) -> EngineResult<&'a str> {
        self.column(LogicalField::Beneficiaries)
    }

    fn totals_by(&self, table: &Table, field: LogicalField) -> EngineResult<AggregationResult<String>> {
        group_sum(table, self.column(field)?, self.measure()?)
    }

    /// Filter `table` by `selection` and derive every view over the result.
    /// Only the filter step can fail the whole call.
    pub fn compute(&self, table: &Table, selection: &Selection) -> EngineResult<DashboardReport> {
        let filtered = filter::apply(table, selection)?;
        debug!(rows = filtered.height(), "computing dashboard");

        let metrics = HeadlineMetrics {
            total_beneficiaries: View::from_result(
                "total_beneficiaries",
                self.measure().and_then(|m| filtered.measure_total(m)),
            ),
            top_district: View::from_result(
                "top_district",
                self.totals_by(&filtered, LogicalField::District)
                    .and_then(|agg| dominant(&agg).cloned()),
            ),
            active_blocks: View::from_result(
                "active_blocks",
                self.column(LogicalField::Block)
                    .and_then(|c| filtered.n_unique(c)),
            ),
            support_categories: View::from_result(
                "support_categories",
                self.column(LogicalField::BroadCategory)
                    .and_then(|c| filtered.n_unique(c)),
            ),
        };

        let support_type_top = View::from_result(
            "support_type_top",
            self.totals_by(&filtered, LogicalField::SupportType)
                .map(|agg| ascending_by_sum(&top_n(&agg, self.options.top_n))),
        );

        let broad_category_share = View::from_result(
            "broad_category_share",
            self.totals_by(&filtered, LogicalField::BroadCategory)
                .map(|agg| shares(&agg)),
        );

        let district_demand = View::from_result(
            "district_demand",
            self.totals_by(&filtered, LogicalField::District)
                .map(|agg| rank_descending(&agg)),
        );

        let category_breakdown = View::from_result(
            "category_breakdown",
            self.column(LogicalField::SupportCategory).and_then(|column| {
                let totals = group_sum(&filtered, column, self.measure()?)?;
                Ok(CategoryBreakdown {
                    column: column.to_string(),
                    totals: rank_descending(&totals),
                })
            }),
        );

        let district_category_pivot = View::from_result(
            "district_category_pivot",
            self.column(LogicalField::District).and_then(|rows| {
                pivot(
                    &filtered,
                    rows,
                    self.column(LogicalField::BroadCategory)?,
                    self.measure()?,
                )
            }),
        );

        let pillar_flow = View::from_result(
            "pillar_flow",
            self.column(LogicalField::InputCategory).and_then(|source| {
                build_flow(
                    &filtered,
                    source,
                    self.column(LogicalField::Pillar)?,
                    self.measure()?,
                )
            }),
        );

        Ok(DashboardReport {
            rows: filtered.height(),
            selection: selection.clone(),
            metrics,
            support_type_top,
            broad_category_share,
            district_demand,
            category_breakdown,
            district_category_pivot,
            pillar_flow,
        })
    }
}
