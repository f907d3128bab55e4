//! Legend construction for the graph views.
//!
//! Legend entries are derived from the node set on every rebuild, never
//! stored. An entry's key is the node's `img` hint when it is a single
//! token, otherwise the node category; the first node to introduce a key
//! fixes the entry's position.

use super::icons::{UNKNOWN_ICON, icon_path};
use super::types::{GraphKind, GraphNode, NodeKind};

/// One legend row: icon plus label key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendEntry {
	/// Dedup and label key, rendered capitalized.
	pub key: String,
	/// Icon asset path.
	pub icon: &'static str,
}

/// One row of the fact graph's occurrence table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FactCount {
	/// Fact display name (its trait).
	pub name: String,
	/// Number of fact nodes sharing that name.
	pub count: usize,
}

fn legend_key(node: &GraphNode) -> String {
	if !node.img.is_empty() && !node.img.contains(' ') {
		node.img.clone()
	} else {
		node.kind.token().to_string()
	}
}

/// Deduplicated legend entries in first-encountered order. The steps view
/// always carries a synthetic `link` entry, since link nodes render an
/// icon swap rather than a distinct category icon of their own.
pub fn build_legend(nodes: &[GraphNode], view: GraphKind) -> Vec<LegendEntry> {
	let mut entries: Vec<LegendEntry> = Vec::new();
	for node in nodes {
		let key = legend_key(node);
		if entries.iter().any(|e| e.key == key) {
			continue;
		}
		let icon = icon_path(&key)
			.or_else(|| icon_path(node.kind.token()))
			.unwrap_or(UNKNOWN_ICON);
		entries.push(LegendEntry { key, icon });
	}

	if view == GraphKind::Steps {
		entries.push(LegendEntry {
			key: "link".to_string(),
			icon: icon_path("link").unwrap_or(UNKNOWN_ICON),
		});
	}
	entries
}

/// Occurrence counts of fact node names, sorted by name.
pub fn fact_counts(nodes: &[GraphNode]) -> Vec<FactCount> {
	let mut counts: Vec<FactCount> = Vec::new();
	for node in nodes.iter().filter(|n| n.kind == NodeKind::Fact) {
		match counts.iter_mut().find(|c| c.name == node.name) {
			Some(entry) => entry.count += 1,
			None => counts.push(FactCount {
				name: node.name.clone(),
				count: 1,
			}),
		}
	}
	counts.sort_by(|a, b| a.name.cmp(&b.name));
	counts
}
