//! Two-level bipartite flow graph (Sankey structure).
//!
//! Node indices are load-bearing: every source node comes first, in ascending label order,
//! followed by every target node in ascending label order. A label present in both columns
//! gets one node per partition.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::aggregate::{group_sum_pair, AggregationResult, KeyPair};
use crate::error::EngineResult;
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Source,
    Target,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowNode {
    pub index: usize,
    pub partition: Partition,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowGraph {
    source_column: String,
    target_column: String,
    source_count: usize,
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
}

/// Flow of `measure` from values of `source_column` to values of `target_column`.
pub fn build_flow(
    table: &Table,
    source_column: &str,
    target_column: &str,
    measure: &str,
) -> EngineResult<FlowGraph> {
    let pairs = group_sum_pair(table, source_column, target_column, measure)?;
    Ok(FlowGraph::from_pairs(source_column, target_column, &pairs))
}

fn partition_nodes(labels: BTreeSet<&str>, partition: Partition, offset: usize) -> Vec<FlowNode> {
    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| FlowNode {
            index: offset + i,
            partition,
            label: label.to_string(),
        })
        .collect()
}

impl FlowGraph {
    pub fn from_pairs(
        source_column: &str,
        target_column: &str,
        pairs: &AggregationResult<KeyPair>,
    ) -> Self {
        let sources: BTreeSet<&str> = pairs.keys().map(|(s, _)| s.as_str()).collect();
        let targets: BTreeSet<&str> = pairs.keys().map(|(_, t)| t.as_str()).collect();
        let source_count = sources.len();

        let mut nodes = partition_nodes(sources, Partition::Source, 0);
        nodes.extend(partition_nodes(targets, Partition::Target, source_count));

        let (source_nodes, target_nodes) = nodes.split_at(source_count);
        let source_index: HashMap<&str, usize> = source_nodes
            .iter()
            .map(|n| (n.label.as_str(), n.index))
            .collect();
        let target_index: HashMap<&str, usize> = target_nodes
            .iter()
            .map(|n| (n.label.as_str(), n.index))
            .collect();

        let edges = pairs
            .iter()
            .map(|entry| FlowEdge {
                source: source_index[entry.key.0.as_str()],
                target: target_index[entry.key.1.as_str()],
                weight: entry.sum,
            })
            .collect();

        Self {
            source_column: source_column.to_string(),
            target_column: target_column.to_string(),
            source_count,
            nodes,
            edges,
        }
    }

    pub fn source_column(&self) -> &str {
        &self.source_column
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn source_nodes(&self) -> &[FlowNode] {
        &self.nodes[..self.source_count]
    }

    pub fn target_nodes(&self) -> &[FlowNode] {
        &self.nodes[self.source_count..]
    }

    pub fn node(&self, index: usize) -> Option<&FlowNode> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, partition: Partition, label: &str) -> Option<usize> {
        let side = match partition {
            Partition::Source => self.source_nodes(),
            Partition::Target => self.target_nodes(),
        };
        side.iter().find(|n| n.label == label).map(|n| n.index)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    pub fn outgoing_weight(&self, index: usize) -> f64 {
        self.edges
            .iter()
            .filter(|e| e.source == index)
            .map(|e| e.weight)
            .sum()
    }

    pub fn incoming_weight(&self, index: usize) -> f64 {
        self.edges
            .iter()
            .filter(|e| e.target == index)
            .map(|e| e.weight)
            .sum()
    }

    /// Node labels in index order, as a Sankey widget expects them.
    pub fn labels(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.label.as_str()).collect()
    }

    pub fn link_sources(&self) -> Vec<usize> {
        self.edges.iter().map(|e| e.source).collect()
    }

    pub fn link_targets(&self) -> Vec<usize> {
        self.edges.iter().map(|e| e.target).collect()
    }

    pub fn link_values(&self) -> Vec<f64> {
        self.edges.iter().map(|e| e.weight).collect()
    }
}
