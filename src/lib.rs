//! Aggregation, pivot and flow-graph engine behind the district intervention dashboard.
//!
//! ```text
//! Table ──filter(Selection)──▶ Table ──┬─ group_sum / top_n / dominant / shares
//!                                      ├─ pivot
//!                                      └─ build_flow
//! ```
//!
//! Every derivation is a pure function of the filtered table and its parameters.

pub mod aggregate;
pub mod columns;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod flow;
pub mod pivot;
pub mod rank;
pub mod render;
pub mod selection;
pub mod table;

pub use aggregate::{group_sum, group_sum_pair, AggregateEntry, AggregationResult, KeyPair};
pub use columns::{resolve, LogicalField, ResolvedColumns};
pub use config::{AppConfig, ConfigManager};
pub use dashboard::{
    Dashboard, DashboardOptions, DashboardReport, DashboardSelection, View, DEFAULT_TOP_N,
};
pub use distdash_cli::{Args, FileFormat, OutputFormat};
pub use error::{EngineError, EngineResult};
pub use flow::{build_flow, FlowEdge, FlowGraph, FlowNode, Partition};
pub use pivot::{pivot, PivotMatrix};
pub use rank::{ascending_by_sum, dominant, rank_descending, shares, top_n, Share, ShareEntry};
pub use selection::{DimensionSelection, Selection};
pub use table::{LoadOptions, Table, MISSING_KEY};

/// Application name used for the config directory
pub const APP_NAME: &str = "distdash";

/// Data file looked up when neither the command line nor the config names one
pub const DEFAULT_DATA_FILE: &str = "dashboard_data.csv";
