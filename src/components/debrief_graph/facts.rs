//! Per-operation fact display cap.
//!
//! Fact graphs grow fast: one noisy operation can bury the view. Each
//! operation keeps its first [`FACT_DISPLAY_LIMIT`] fact nodes (payload
//! order); the rest are hidden together with every relationship edge
//! touching them, and a single readability warning is raised. Runs on
//! every rebuild, so selection changes recompute the cap from scratch.

use std::collections::{HashMap, HashSet};

use super::types::{EdgeKind, GraphNode, NodeId, NodeKind};

/// Maximum fact nodes displayed per operation.
pub const FACT_DISPLAY_LIMIT: usize = 15;

/// The readability warning, identical every time the cap is exceeded.
pub fn fact_limit_warning() -> String {
	format!(
		"More than {FACT_DISPLAY_LIMIT} facts found in the operation(s) selected. \
		 For readability, only the first {FACT_DISPLAY_LIMIT} facts of each operation are displayed."
	)
}

/// Which nodes and edges the cap removed, plus the warning when any
/// operation exceeded the limit (None clears a previous warning).
#[derive(Debug, Default)]
pub struct FactLimitOutcome {
	/// Hidden fact node indices.
	pub hidden_nodes: HashSet<usize>,
	/// Hidden relationship edge indices.
	pub hidden_edges: HashSet<usize>,
	/// Readability warning, if any operation was truncated.
	pub warning: Option<String>,
}

/// Apply the cap to a node set and its resolved edges
/// (`(source index, target index, kind)`).
pub fn limit_facts(nodes: &[GraphNode], edges: &[(usize, usize, EdgeKind)]) -> FactLimitOutcome {
	let mut per_operation: HashMap<&NodeId, Vec<usize>> = HashMap::new();
	let mut operation_order: Vec<&NodeId> = Vec::new();
	for (index, node) in nodes.iter().enumerate() {
		if node.kind != NodeKind::Fact {
			continue;
		}
		let Some(op) = &node.operation else {
			continue;
		};
		let bucket = per_operation.entry(op).or_insert_with(|| {
			operation_order.push(op);
			Vec::new()
		});
		bucket.push(index);
	}

	let mut outcome = FactLimitOutcome::default();
	for op in operation_order {
		let indices = &per_operation[op];
		if indices.len() <= FACT_DISPLAY_LIMIT {
			continue;
		}
		outcome.hidden_nodes.extend(&indices[FACT_DISPLAY_LIMIT..]);
	}

	if outcome.hidden_nodes.is_empty() {
		return outcome;
	}

	outcome.warning = Some(fact_limit_warning());
	for (index, &(source, target, kind)) in edges.iter().enumerate() {
		if kind == EdgeKind::Relationship
			&& (outcome.hidden_nodes.contains(&source) || outcome.hidden_nodes.contains(&target))
		{
			outcome.hidden_edges.insert(index);
		}
	}
	outcome
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fact(id: i64, op: &str) -> GraphNode {
		GraphNode {
			id: NodeId::Int(id),
			name: format!("fact{id}"),
			kind: NodeKind::Fact,
			img: "star".into(),
			status: None,
			timestamp: None,
			operation: Some(NodeId::Text(op.into())),
			attrs: Default::default(),
		}
	}

	#[test]
	fn caps_each_operation_at_the_limit() {
		let nodes: Vec<GraphNode> = (0..20).map(|i| fact(i, "op-1")).collect();
		let outcome = limit_facts(&nodes, &[]);

		assert_eq!(outcome.hidden_nodes.len(), 5);
		let visible = nodes.len() - outcome.hidden_nodes.len();
		assert_eq!(visible, FACT_DISPLAY_LIMIT);
		// Payload order decides survivors: the first 15 stay.
		for i in 0..15 {
			assert!(!outcome.hidden_nodes.contains(&i));
		}
		assert!(outcome.warning.is_some());
	}

	#[test]
	fn operations_are_capped_independently() {
		let mut nodes: Vec<GraphNode> = (0..20).map(|i| fact(i, "op-1")).collect();
		nodes.extend((20..24).map(|i| fact(i, "op-2")));
		let outcome = limit_facts(&nodes, &[]);

		assert_eq!(outcome.hidden_nodes.len(), 5);
		assert!((20..24).all(|i| !outcome.hidden_nodes.contains(&i)));
	}

	#[test]
	fn relationship_edges_touching_hidden_facts_are_pruned() {
		let nodes: Vec<GraphNode> = (0..17).map(|i| fact(i, "op-1")).collect();
		let edges = vec![
			(0, 16, EdgeKind::Relationship),  // target hidden
			(15, 3, EdgeKind::Relationship),  // source hidden
			(0, 1, EdgeKind::Relationship),   // both visible
			(2, 16, EdgeKind::NextLink),      // wrong kind, kept
		];
		let outcome = limit_facts(&nodes, &edges);

		assert_eq!(outcome.hidden_nodes, HashSet::from([15, 16]));
		assert_eq!(outcome.hidden_edges, HashSet::from([0, 1]));
	}

	#[test]
	fn under_limit_clears_the_warning() {
		let nodes: Vec<GraphNode> = (0..15).map(|i| fact(i, "op-1")).collect();
		let outcome = limit_facts(&nodes, &[]);
		assert!(outcome.hidden_nodes.is_empty());
		assert!(outcome.warning.is_none());
	}

	#[test]
	fn warning_text_is_identical_between_runs() {
		let nodes: Vec<GraphNode> = (0..16).map(|i| fact(i, "op-1")).collect();
		let first = limit_facts(&nodes, &[]).warning.unwrap();
		let second = limit_facts(&nodes, &[]).warning.unwrap();
		assert_eq!(first, second);
	}
}
