//! Per-view graph session state.
//!
//! One [`GraphView`] exists per visible graph (steps, attack path, tactic,
//! technique, fact). It owns the materialized node/edge collections, the
//! physics simulation, drag and pan/zoom interaction state, playback, and
//! the fact-display cap. A selection change replaces the whole session:
//! nothing carries over between payloads.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use log::warn;

use super::facts::{self, FactLimitOutcome};
use super::legend::{self, FactCount, LegendEntry};
use super::playback::Playback;
use super::simulation::{ForceSimulation, SimEdge, SimNode};
use super::types::{EdgeKind, GraphData, GraphKind, GraphNode};

/// Node circle radius in world units.
pub const NODE_RADIUS: f64 = 16.0;
/// Pointer hit-test radius in world units.
pub const HIT_RADIUS: f64 = 20.0;
// The legend column occupies the right edge, so the simulation centers on
// the remaining canvas.
const LEGEND_COLUMN: f64 = 200.0;

/// Pan and zoom transform applied to the whole view.
#[derive(Clone, Debug)]
pub struct ViewTransform {
	/// X translation in screen pixels.
	pub x: f64,
	/// Y translation in screen pixels.
	pub y: f64,
	/// Zoom factor, clamped to 0.5..5.0.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// Tracks an in-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// A drag is underway.
	pub active: bool,
	/// Index of the dragged node.
	pub node_index: Option<usize>,
}

/// Tracks an in-progress canvas pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// A pan is underway.
	pub active: bool,
	/// Pointer position at pan start.
	pub start_x: f64,
	/// Pointer position at pan start.
	pub start_y: f64,
	/// Transform translation at pan start.
	pub transform_start_x: f64,
	/// Transform translation at pan start.
	pub transform_start_y: f64,
}

/// An edge resolved to node indices.
#[derive(Clone, Debug)]
pub struct GraphEdge {
	/// Source node index.
	pub source: usize,
	/// Target node index.
	pub target: usize,
	/// Edge category.
	pub kind: EdgeKind,
}

/// Session state for one graph view.
pub struct GraphView {
	/// Which of the five views this is.
	pub kind: GraphKind,
	/// Materialized nodes, deduplicated by id, payload order preserved.
	pub nodes: Vec<GraphNode>,
	/// Resolved edges; edges referencing unknown ids were dropped.
	pub edges: Vec<GraphEdge>,
	/// The physics simulation owning node positions.
	pub sim: ForceSimulation,
	/// Chronological playback cursor for this view.
	pub playback: Playback,
	/// Deduplicated legend entries.
	pub legend: Vec<LegendEntry>,
	/// Fact occurrence table (fact view only, empty elsewhere).
	pub fact_counts: Vec<FactCount>,
	/// Readability warning when the fact cap kicked in.
	pub fact_warning: Option<String>,
	/// Pan/zoom transform.
	pub transform: ViewTransform,
	/// Drag interaction state.
	pub drag: DragState,
	/// Pan interaction state.
	pub pan: PanState,
	/// Currently hovered node.
	pub hovered: Option<usize>,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	hidden_nodes: HashSet<usize>,
	hidden_edges: HashSet<usize>,
}

impl GraphView {
	/// Materialize a fresh session from a graph payload. Prior state for
	/// the view is simply dropped by the caller; the new simulation starts
	/// at full temperature.
	pub fn new(kind: GraphKind, data: &GraphData, width: f64, height: f64) -> Self {
		let mut nodes: Vec<GraphNode> = Vec::with_capacity(data.nodes.len());
		let mut index_of = HashMap::new();
		for node in &data.nodes {
			if index_of.contains_key(&node.id) {
				warn!("duplicate node id {} in {} payload, dropping", node.id, kind.query_key());
				continue;
			}
			index_of.insert(node.id.clone(), nodes.len());
			nodes.push(node.clone());
		}

		let mut edges: Vec<GraphEdge> = Vec::with_capacity(data.links.len());
		for link in &data.links {
			match (index_of.get(&link.source), index_of.get(&link.target)) {
				(Some(&source), Some(&target)) => edges.push(GraphEdge {
					source,
					target,
					kind: link.kind,
				}),
				_ => warn!(
					"edge {} -> {} references a missing node in {} payload, dropping",
					link.source,
					link.target,
					kind.query_key()
				),
			}
		}

		let center = ((width - LEGEND_COLUMN) / 2.0, height / 2.0);
		let sim_nodes = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				// Seed on a circle around the center; the simulation takes
				// it from there.
				let angle = (i as f64) * 2.0 * PI / nodes.len().max(1) as f64;
				SimNode::new(
					center.0 + 100.0 * angle.cos(),
					center.1 + 100.0 * angle.sin(),
					node.kind.charge(),
				)
			})
			.collect();
		let sim_edges = edges
			.iter()
			.map(|e| SimEdge {
				source: e.source,
				target: e.target,
				rest_length: e.kind.rest_length(),
			})
			.collect();
		let sim = ForceSimulation::new(sim_nodes, sim_edges, center);

		let FactLimitOutcome {
			hidden_nodes,
			hidden_edges,
			warning,
		} = if kind == GraphKind::Fact {
			let triplets: Vec<_> = edges.iter().map(|e| (e.source, e.target, e.kind)).collect();
			facts::limit_facts(&nodes, &triplets)
		} else {
			FactLimitOutcome::default()
		};

		let legend = legend::build_legend(&nodes, kind);
		let fact_counts = if kind == GraphKind::Fact {
			legend::fact_counts(&nodes)
		} else {
			Vec::new()
		};
		let playback = Playback::new(&nodes);

		Self {
			kind,
			playback,
			legend,
			fact_counts,
			fact_warning: warning,
			sim,
			nodes,
			edges,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hovered: None,
			width,
			height,
			hidden_nodes,
			hidden_edges,
		}
	}

	/// Screen pixels to world coordinates under the current transform.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Whether a node is currently drawn.
	pub fn node_visible(&self, index: usize) -> bool {
		!self.hidden_nodes.contains(&index) && self.playback.is_revealed(index)
	}

	/// Whether an edge is currently drawn: not pruned by the fact cap,
	/// and both endpoints visible.
	pub fn edge_visible(&self, index: usize) -> bool {
		if self.hidden_edges.contains(&index) {
			return false;
		}
		let Some(edge) = self.edges.get(index) else {
			return false;
		};
		self.node_visible(edge.source) && self.node_visible(edge.target)
	}

	/// Topmost visible node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		for (i, node) in self.sim.nodes().iter().enumerate() {
			if !self.node_visible(i) {
				continue;
			}
			let (dx, dy) = (node.x - gx, node.y - gy);
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(i);
			}
		}
		found
	}

	/// Begin dragging a node: pin it to the pointer and reheat the
	/// simulation toward 0.3 so neighbors follow smoothly.
	pub fn begin_drag(&mut self, index: usize, wx: f64, wy: f64) {
		self.drag.active = true;
		self.drag.node_index = Some(index);
		self.sim.set_alpha_target(0.3);
		self.sim.pin(index, wx, wy);
	}

	/// Track the pointer during a drag.
	pub fn drag_to(&mut self, wx: f64, wy: f64) {
		if let Some(index) = self.drag.node_index.filter(|_| self.drag.active) {
			self.sim.pin(index, wx, wy);
		}
	}

	/// End a drag. The node stays pinned where it was dropped; the
	/// temperature decays back toward rest.
	pub fn end_drag(&mut self) {
		self.drag.active = false;
		self.drag.node_index = None;
		self.sim.set_alpha_target(0.0);
	}

	/// Advance the simulation if it is still warm.
	pub fn tick(&mut self) {
		if self.sim.active() {
			self.sim.tick();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::debrief_graph::facts::FACT_DISPLAY_LIMIT;
	use crate::components::debrief_graph::types::NodeKind;
	use serde_json::json;

	fn fact_payload(count: usize) -> GraphData {
		let mut nodes = vec![json!({"id": 0, "name": "C2", "type": "c2", "img": "server"})];
		let mut links = Vec::new();
		for i in 1..=count {
			nodes.push(json!({
				"id": i, "name": format!("fact{i}"), "type": "fact",
				"img": "star", "operation": "op-1"
			}));
			if i > 1 {
				links.push(json!({"source": i - 1, "target": i, "type": "relationship"}));
			}
		}
		serde_json::from_value(json!({"nodes": nodes, "links": links})).unwrap()
	}

	#[test]
	fn build_drops_edges_referencing_missing_nodes() {
		let data: GraphData = serde_json::from_value(json!({
			"nodes": [
				{"id": 0, "name": "C2", "type": "c2", "img": "server"},
				{"id": 1, "name": "agent", "type": "agent", "img": "linux"}
			],
			"links": [
				{"source": 0, "target": 1, "type": "agent_contact"},
				{"source": 0, "target": 99, "type": "agent_contact"}
			]
		}))
		.unwrap();

		let view = GraphView::new(GraphKind::Steps, &data, 800.0, 400.0);
		assert_eq!(view.nodes.len(), 2);
		assert_eq!(view.edges.len(), 1);
	}

	#[test]
	fn build_drops_duplicate_node_ids() {
		let data: GraphData = serde_json::from_value(json!({
			"nodes": [
				{"id": 1, "name": "first", "type": "agent"},
				{"id": 1, "name": "second", "type": "agent"}
			],
			"links": []
		}))
		.unwrap();

		let view = GraphView::new(GraphKind::Steps, &data, 800.0, 400.0);
		assert_eq!(view.nodes.len(), 1);
		assert_eq!(view.nodes[0].name, "first");
	}

	#[test]
	fn fact_view_caps_facts_and_prunes_their_edges() {
		let view = GraphView::new(GraphKind::Fact, &fact_payload(20), 800.0, 600.0);

		let visible_facts = (0..view.nodes.len())
			.filter(|&i| view.nodes[i].kind == NodeKind::Fact)
			.filter(|&i| view.node_visible(i))
			.count();
		assert_eq!(visible_facts, FACT_DISPLAY_LIMIT);
		assert!(view.fact_warning.is_some());

		// No visible relationship edge may touch a hidden fact.
		for (i, edge) in view.edges.iter().enumerate() {
			if view.edge_visible(i) {
				assert!(view.node_visible(edge.source));
				assert!(view.node_visible(edge.target));
			}
		}
	}

	#[test]
	fn under_limit_fact_view_has_no_warning() {
		let view = GraphView::new(GraphKind::Fact, &fact_payload(5), 800.0, 600.0);
		assert!(view.fact_warning.is_none());
	}

	#[test]
	fn playback_seek_round_trip_matches_single_seek_end() {
		let data: GraphData = serde_json::from_value(json!({
			"nodes": [
				{"id": 0, "name": "C2", "type": "c2", "img": "server"},
				{"id": 1, "name": "a", "type": "link", "timestamp": "2024-03-01 10:00:00"},
				{"id": 2, "name": "b", "type": "link", "timestamp": "2024-03-01 10:00:05"}
			],
			"links": [{"source": 1, "target": 2, "type": "next_link"}]
		}))
		.unwrap();
		let mut view = GraphView::new(GraphKind::Steps, &data, 800.0, 400.0);

		view.playback.seek_end();
		let once: Vec<bool> = (0..3).map(|i| view.node_visible(i)).collect();
		view.playback.seek_start();
		view.playback.seek_end();
		let round_trip: Vec<bool> = (0..3).map(|i| view.node_visible(i)).collect();
		assert_eq!(once, round_trip);
	}

	#[test]
	fn dragged_node_stays_where_it_was_dropped() {
		let data: GraphData = serde_json::from_value(json!({
			"nodes": [
				{"id": 0, "name": "C2", "type": "c2", "img": "server"},
				{"id": 1, "name": "agent", "type": "agent", "img": "linux"}
			],
			"links": [{"source": 0, "target": 1, "type": "agent_contact"}]
		}))
		.unwrap();
		let mut view = GraphView::new(GraphKind::Steps, &data, 800.0, 400.0);

		view.begin_drag(1, 100.0, 200.0);
		view.drag_to(100.0, 200.0);
		view.end_drag();
		for _ in 0..50 {
			view.tick();
		}

		let node = &view.sim.nodes()[1];
		assert_eq!((node.x, node.y), (100.0, 200.0));
	}
}
